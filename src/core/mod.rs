pub mod middleware;

use serde::Deserialize;
use std::sync::{Arc, RwLock};

/// Shared slot for the session credential obtained from the identity
/// exchange. The Firestore middleware reads it on every request; `sign_out`
/// clears it. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct SessionToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, token: String) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(token),
            Err(poisoned) => *poisoned.into_inner() = Some(token),
        }
    }

    pub fn clear(&self) {
        match self.inner.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetails {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
}

impl ApiErrorResponse {
    pub fn display_message(&self) -> String {
        format!("{} (code: {})", self.error.message, self.error.code)
    }
}

/// Renders a Google API error body into a one-line message, falling back to
/// the HTTP status when the body is not the standard error shape.
pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    match response.json::<ApiErrorResponse>().await {
        Ok(error_resp) => error_resp.display_message(),
        Err(_) => format!("{default_msg}: {status}"),
    }
}
