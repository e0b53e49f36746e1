//! Sign-in and session management.
//!
//! The interactive sign-in flow itself lives outside this crate behind
//! [`IdentityProvider`] (in production a Google Sign-In shim). What this
//! module owns is the exchange of the resulting identity token for a session
//! credential at the federated-auth backend, and the shared session slot the
//! Firestore middleware reads.
//!
//! Auth failures are surfaced to the caller as a transient notice; they
//! never drive presenter state.

pub mod models;


use self::models::{SessionUser, SignInWithIdpRequest, SignInWithIdpResponse};
use crate::core::{parse_error_response, SessionToken};
use log::debug;
use thiserror::Error;

const IDENTITY_TOOLKIT_V1: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Error, Debug)]
pub enum AuthError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Errors returned by the identity backend.
    #[error("API error: {0}")]
    Api(String),
    /// Wrapper for `serde_json::Error`.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The external sign-in flow failed or was cancelled.
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// The external OAuth/OIDC sign-in flow. Implementations run whatever
/// interaction the platform needs and come back with an identity token.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self) -> Result<String, AuthError>;
}

/// Client for the federated-auth backend.
#[derive(Clone)]
pub struct AmasonAuth {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    session: SessionToken,
}

impl AmasonAuth {
    /// This is typically called via `AmasonApp::auth()`.
    pub fn new(api_key: String, session: SessionToken) -> Self {
        Self::new_with_url(api_key, session, IDENTITY_TOOLKIT_V1.to_string())
    }

    /// Creates a client against a custom base URL (useful for testing).
    pub fn new_with_url(api_key: String, session: SessionToken, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            session,
        }
    }

    /// Runs the external sign-in flow and exchanges its token for a session.
    pub async fn sign_in_with(
        &self,
        provider: &dyn IdentityProvider,
    ) -> Result<SessionUser, AuthError> {
        let identity_token = provider.sign_in().await?;
        self.exchange_for_session(&identity_token).await
    }

    /// Exchanges an identity token for a session credential. On success the
    /// credential lands in the shared session slot, so Firestore requests
    /// are authenticated from here on.
    pub async fn exchange_for_session(
        &self,
        identity_token: &str,
    ) -> Result<SessionUser, AuthError> {
        let url = format!(
            "{}/accounts:signInWithIdp?key={}",
            self.base_url, self.api_key
        );
        let request = SignInWithIdpRequest {
            post_body: format!("id_token={identity_token}&providerId=google.com"),
            request_uri: "http://localhost".to_string(),
            return_secure_token: true,
            return_idp_credential: true,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(AuthError::Api(
                parse_error_response(response, "Credential exchange failed").await,
            ));
        }

        let result: SignInWithIdpResponse = response.json().await?;
        self.session.set(result.id_token);
        debug!("session established for uid {}", result.local_id);

        Ok(SessionUser {
            uid: result.local_id,
            email: result.email,
            display_name: result.display_name,
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.get().is_some()
    }

    /// Drops the session credential. Infallible; subsequent Firestore
    /// requests go out unauthenticated.
    pub fn sign_out(&self) {
        self.session.clear();
        debug!("session cleared");
    }
}
