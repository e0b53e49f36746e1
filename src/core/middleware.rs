use super::SessionToken;
use http::Extensions;
use reqwest::{header, Request, Response};
use reqwest_middleware::{Middleware, Next};

/// Attaches the current session credential as a bearer token.
///
/// Requests go out unauthenticated while no user is signed in; whether that
/// is acceptable is decided by the backend's security rules, not here.
#[derive(Clone)]
pub struct SessionMiddleware {
    token: SessionToken,
}

impl SessionMiddleware {
    pub fn new(token: SessionToken) -> Self {
        Self { token }
    }
}

#[async_trait::async_trait]
impl Middleware for SessionMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if let Some(token) = self.token.get() {
            let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| reqwest_middleware::Error::middleware(e))?;
            req.headers_mut().insert(header::AUTHORIZATION, value);
        }

        next.run(req, extensions).await
    }
}
