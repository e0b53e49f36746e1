//! Display-language selection.
//!
//! The app shows every string in one of two languages. The selection lives
//! only in memory (a restart comes back in Spanish) and toggling it never
//! touches the store subscriptions; screens re-render the snapshots they
//! already hold.

use tokio::sync::broadcast;

/// A supported display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// Spanish, the startup default.
    #[default]
    Es,
    /// English.
    En,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Self::Es => Self::En,
            Self::En => Self::Es,
        }
    }

    /// The two-letter code used on the wire and on the toggle button.
    pub fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

/// Holds the active language for one screen shell. Single writer: only the
/// user-facing toggle action mutates it.
#[derive(Debug, Default)]
pub struct LanguageSelector {
    current: Language,
}

impl LanguageSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Language {
        self.current
    }

    /// Flips es↔en and returns the new value.
    pub fn toggle(&mut self) -> Language {
        self.current = self.current.toggled();
        self.current
    }
}

/// Best-effort same-process fanout of language changes, so sibling screens
/// re-render without re-fetching.
#[derive(Clone)]
pub struct LanguageEvents {
    tx: broadcast::Sender<Language>,
}

impl LanguageEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(8);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Language> {
        self.tx.subscribe()
    }

    /// Publishes a change. Having no listeners is not an error.
    pub fn publish(&self, language: Language) {
        let _ = self.tx.send(language);
    }
}

impl Default for LanguageEvents {
    fn default() -> Self {
        Self::new()
    }
}
