//! Handler-side extractor for authenticated credentials.

use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};
use wicket_auth::Credentials;

/// Extracts the [`Credentials`] the auth middleware stored for this request.
///
/// Rejects with 401 when the route is not behind `require_auth` (or the
/// middleware did not run for some other reason).
#[derive(Debug, Clone)]
pub struct AuthCredentials(pub Credentials);

impl<S> FromRequestParts<S> for AuthCredentials
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Credentials>()
            .cloned()
            .map(AuthCredentials)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
