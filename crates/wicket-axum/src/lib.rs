//! Axum integration for the wicket cookie-token scheme.
//!
//! The host side of the contract: [`require_auth`] guards a router with a
//! [`CookieTokenAuthenticator`], translates every denial into the matching
//! HTTP response, and stores accepted credentials in request extensions
//! where the [`AuthCredentials`] extractor picks them up.
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::{Json, Router, routing::get};
//! use wicket_auth::{AuthOptions, CookieTokenAuthenticator};
//! use wicket_axum::{AuthCredentials, require_auth};
//!
//! async fn whoami(AuthCredentials(credentials): AuthCredentials) -> Json<wicket_auth::Credentials> {
//!     Json(credentials)
//! }
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let scheme = Arc::new(CookieTokenAuthenticator::new(AuthOptions::with_key("shhh"))?);
//! let app: Router = require_auth(Router::new().route("/whoami", get(whoami)), scheme);
//! # let _ = app; Ok(()) }
//! ```

#![forbid(unsafe_code)]

mod extract;
mod response;

pub use extract::AuthCredentials;
pub use response::{ErrorBody, ErrorResponse};

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
};
use wicket_auth::{AuthDecision, CookieTokenAuthenticator};

/// Guard every route of `router` with the cookie-token scheme.
pub fn require_auth<S>(router: Router<S>, scheme: Arc<CookieTokenAuthenticator>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        scheme,
        authenticate_request,
    ))
}

async fn authenticate_request(
    State(scheme): State<Arc<CookieTokenAuthenticator>>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());

    match scheme.authenticate(cookie_header).await {
        AuthDecision::Authenticated(credentials) => {
            req.extensions_mut().insert(credentials);
            next.run(req).await
        }
        AuthDecision::Unauthenticated {
            reason,
            credentials,
        } => response::unauthorized(reason, credentials.as_ref()),
        AuthDecision::MalformedRequest { message } => response::bad_request(message),
        AuthDecision::InternalError { cause, credentials } => {
            response::internal_error(&cause, credentials.as_ref())
        }
    }
}
