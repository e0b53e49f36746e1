//! Cloud Firestore client, reduced to what the tutorial app consumes: live
//! collection listens.
//!
//! The app never writes back and never reads point-in-time; every screen is
//! fed by a long-lived listen on one collection, so this client exposes
//! exactly that. Content stores in [`crate::content`] sit on top and turn the
//! raw change stream into full typed snapshots.

pub mod listen;
pub mod models;

#[cfg(test)]
mod tests;

use self::listen::{listen_request, EventStream};
use self::models::{
    CollectionSelector, Direction, FieldReference, ListenRequest, Order, QueryTarget,
    StructuredQuery, Target,
};
use crate::core::middleware::SessionMiddleware;
use crate::core::SessionToken;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;

const FIRESTORE_V1_API: &str =
    "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents";

/// Errors that can occur while talking to Firestore.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
    /// Errors returned by the Firestore API.
    #[error("API error: {0}")]
    Api(String),
    /// Wrapper for `serde_json::Error`.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Client for the Firestore v1 REST surface.
#[derive(Clone)]
pub struct FirestoreClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirestoreClient {
    /// Creates a client for the given project, authenticating every request
    /// with the shared session token.
    ///
    /// This is typically called via `AmasonApp::firestore()`.
    pub fn new(project_id: &str, token: SessionToken) -> Self {
        let base_url = FIRESTORE_V1_API.replace("{project_id}", project_id);
        Self::new_with_url(token, base_url)
    }

    /// Creates a client against a custom base URL (useful for testing).
    pub fn new_with_url(token: SessionToken, base_url: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(SessionMiddleware::new(token))
            .build();

        Self { client, base_url }
    }

    /// Opens a live listen on one collection, optionally server-sorted
    /// ascending by `order_by`.
    ///
    /// The returned stream yields raw listen events until the server closes
    /// the connection or an error occurs. No reconnection is attempted.
    pub async fn listen_collection(
        &self,
        collection_id: &str,
        order_by: Option<&str>,
    ) -> Result<EventStream, FirestoreError> {
        let order = order_by.map(|field| {
            vec![Order {
                field: FieldReference {
                    field_path: field.to_string(),
                },
                direction: Direction::Ascending,
            }]
        });

        let request = ListenRequest {
            database: database_path(&self.base_url),
            add_target: Some(Target {
                target_id: Some(1),
                query: QueryTarget {
                    parent: self.base_url.clone(),
                    structured_query: StructuredQuery {
                        from: vec![CollectionSelector {
                            collection_id: collection_id.to_string(),
                        }],
                        order_by: order,
                    },
                },
            }),
        };

        listen_request(&self.client, &self.base_url, &request).await
    }
}

/// Derives the `projects/{p}/databases/{d}` resource name from a documents
/// base URL.
fn database_path(base_url: &str) -> String {
    let path = base_url
        .find("/projects/")
        .map(|i| &base_url[i + 1..])
        .unwrap_or(base_url);
    path.strip_suffix("/documents").unwrap_or(path).to_string()
}

#[cfg(test)]
mod database_path_tests {
    use super::database_path;

    #[test]
    fn strips_origin_and_documents_suffix() {
        let url = "https://firestore.googleapis.com/v1/projects/p/databases/(default)/documents";
        assert_eq!(database_path(url), "projects/p/databases/(default)");
    }

    #[test]
    fn handles_mock_server_urls() {
        let url = "http://127.0.0.1:4545/v1/projects/p/databases/(default)/documents";
        assert_eq!(database_path(url), "projects/p/databases/(default)");
    }
}
