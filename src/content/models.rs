use crate::firestore::models::Document;
use crate::language::Language;
use thiserror::Error;

/// A document failed the explicit shape check for its entity type.
///
/// Remote data is operator-edited, so a malformed document is a modeled
/// outcome here rather than a hidden deserialization panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed document {doc_id}: {reason}")]
pub struct ParseError {
    pub doc_id: String,
    pub reason: String,
}

/// A bilingual UI string keyed by its document id (e.g. "nav_login",
/// "logout"). Missing language values render as empty rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    pub key: String,
    pub es: String,
    pub en: String,
}

impl LabelEntry {
    /// Validated parse from a `traducciones` document. The key comes from
    /// the document id, never from a stored field.
    pub fn from_document(doc: &Document) -> Result<Self, ParseError> {
        let key = doc.id().to_string();
        if key.is_empty() {
            return Err(ParseError {
                doc_id: doc.name.clone(),
                reason: "empty document id".into(),
            });
        }

        Ok(Self {
            es: optional_text(doc, &key, "es")?,
            en: optional_text(doc, &key, "en")?,
            key,
        })
    }

    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::Es => &self.es,
            Language::En => &self.en,
        }
    }
}

/// One ordered step of a tutorial: bilingual text plus a logical image name
/// resolved against the local catalog at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub order: i64,
    pub text_es: String,
    pub text_en: String,
    pub image_ref: String,
}

impl ContentItem {
    /// Validated parse from a tutorial document. `order` is required since
    /// it is the sort contract; texts and the image reference fall back to
    /// empty.
    pub fn from_document(doc: &Document) -> Result<Self, ParseError> {
        let id = doc.id().to_string();
        let order = doc.integer_field("order").ok_or_else(|| ParseError {
            doc_id: id.clone(),
            reason: "missing or non-integer field `order`".into(),
        })?;

        Ok(Self {
            order,
            text_es: optional_text(doc, &id, "textEs")?,
            text_en: optional_text(doc, &id, "textEn")?,
            image_ref: optional_text(doc, &id, "imageRef")?,
        })
    }

    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::Es => &self.text_es,
            Language::En => &self.text_en,
        }
    }
}

/// Reads a string field that may be absent, but must be a string when
/// present.
fn optional_text(doc: &Document, doc_id: &str, field: &str) -> Result<String, ParseError> {
    match doc.fields.get(field) {
        None => Ok(String::new()),
        Some(_) => doc
            .string_field(field)
            .map(str::to_string)
            .ok_or_else(|| ParseError {
                doc_id: doc_id.to_string(),
                reason: format!("field `{field}` is not a string"),
            }),
    }
}

/// The tutorial sections reachable from the side drawer, each backed by its
/// own Firestore collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Login,
    Database,
    Ftp,
    Email,
    Mailbox,
    Admin,
    Logs,
}

impl Section {
    /// The backing collection name. These match the deployed database.
    pub fn collection_name(self) -> &'static str {
        match self {
            Self::Login => "tutoriales_login",
            Self::Database => "tutoriales_database",
            Self::Ftp => "tutoriales_ftp",
            Self::Email => "tutoriales_email",
            Self::Mailbox => "tutoriales_buzon",
            Self::Admin => "tutoriales_admin",
            Self::Logs => "tutoriales_logs",
        }
    }

    pub const ALL: [Section; 7] = [
        Section::Login,
        Section::Database,
        Section::Ftp,
        Section::Email,
        Section::Mailbox,
        Section::Admin,
        Section::Logs,
    ];
}
