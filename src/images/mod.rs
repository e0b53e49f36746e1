//! Image catalog.
//!
//! Tutorial documents carry a logical image name; the shell registers the
//! handles it actually bundles. An unknown name resolves to the catalog's
//! fallback handle at render time, so a typo in the database degrades to a
//! stock image instead of a broken screen.

use std::collections::HashMap;

/// Opaque reference to a renderable image resource owned by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle(pub String);

pub trait ImageCatalog: Send + Sync {
    /// Looks up a logical name; `None` when the shell bundles no such image.
    fn resolve(&self, logical_name: &str) -> Option<ImageHandle>;

    /// The handle substituted for unresolved names.
    fn fallback(&self) -> ImageHandle;
}

/// Catalog backed by a fixed map, built once at startup.
pub struct StaticImageCatalog {
    entries: HashMap<String, ImageHandle>,
    fallback: ImageHandle,
}

impl StaticImageCatalog {
    pub fn new(fallback: ImageHandle) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    pub fn with(mut self, logical_name: impl Into<String>, handle: ImageHandle) -> Self {
        self.entries.insert(logical_name.into(), handle);
        self
    }
}

impl ImageCatalog for StaticImageCatalog {
    fn resolve(&self, logical_name: &str) -> Option<ImageHandle> {
        self.entries.get(logical_name).cloned()
    }

    fn fallback(&self) -> ImageHandle {
        self.fallback.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_names_and_falls_back_otherwise() {
        let catalog = StaticImageCatalog::new(ImageHandle("ic_ftp".into()))
            .with("ic_login", ImageHandle("ic_login".into()));

        assert_eq!(catalog.resolve("ic_login"), Some(ImageHandle("ic_login".into())));
        assert_eq!(catalog.resolve("nope"), None);
        assert_eq!(catalog.fallback(), ImageHandle("ic_ftp".into()));
    }
}
