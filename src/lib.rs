//! Client library for the Amason tutorial app.
//!
//! The app shows bilingual (Spanish/English) tutorial content and UI labels
//! streamed live from Cloud Firestore, behind a Google sign-in. This crate
//! holds everything below the widgets: the session exchange, the real-time
//! content stores, the connectivity monitor, the language selection and the
//! per-screen presentation state machine. A platform shell wires its widgets
//! and lifecycle callbacks to these pieces.

pub mod auth;
pub mod connectivity;
pub mod content;
pub mod core;
pub mod firestore;
pub mod images;
pub mod language;
pub mod presenter;

use auth::AmasonAuth;
use content::models::Section;
use content::{LabelStore, TutorialStore};
use crate::core::SessionToken;
use firestore::FirestoreClient;

/// Backend coordinates of one deployment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Firebase project id.
    pub project_id: String,
    /// Web API key used for the identity exchange.
    pub api_key: String,
}

/// Entry point tying the components to one backend and one session.
///
/// All accessors hand out components sharing the same session slot, so a
/// sign-in through [`AmasonApp::auth`] authenticates the stores too.
pub struct AmasonApp {
    config: AppConfig,
    session: SessionToken,
}

impl AmasonApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: SessionToken::new(),
        }
    }

    pub fn auth(&self) -> AmasonAuth {
        AmasonAuth::new(self.config.api_key.clone(), self.session.clone())
    }

    pub fn firestore(&self) -> FirestoreClient {
        FirestoreClient::new(&self.config.project_id, self.session.clone())
    }

    /// The store behind the drawer titles and button labels.
    pub fn labels(&self) -> LabelStore {
        LabelStore::new(self.firestore())
    }

    /// A store for one tutorial section, bound to it for the store's life.
    pub fn tutorials(&self, section: Section) -> TutorialStore {
        TutorialStore::new(self.firestore(), section)
    }
}
