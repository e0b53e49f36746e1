use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpRequest {
    /// URL-encoded credential, e.g. `id_token=...&providerId=google.com`.
    pub post_body: String,
    pub request_uri: String,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpResponse {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<String>,
}

/// The signed-in user, as far as this app cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl SessionUser {
    /// Greeting shown in the header: the local part of the email, truncated
    /// to 20 characters with an ellipsis; "Usuario" when there is no email.
    pub fn display_alias(&self) -> String {
        let Some(email) = self.email.as_deref() else {
            return "Usuario".to_string();
        };
        let alias = email.split('@').next().unwrap_or(email);
        if alias.chars().count() > 20 {
            let truncated: String = alias.chars().take(20).collect();
            format!("{truncated}...")
        } else {
            alias.to_string()
        }
    }
}
