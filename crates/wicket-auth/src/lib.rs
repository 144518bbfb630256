//! wicket-auth
//!
//! Cookie-carried token authentication for HTTP services. The crate answers
//! one question per request — is the caller authenticated? — and focuses on
//! the pieces every host framework needs for that:
//!
//! - **Extracting the access token** from the request's `Cookie` header
//! - **Verifying it** (compact three-segment shape, signature, expiry)
//! - **Resolving an identity** through a caller-supplied lookup
//! - **Classifying the outcome** into a fixed set of terminal decisions
//!
//! The core API is [`CookieTokenAuthenticator`]: configured once with an
//! [`AuthOptions`], invoked once per request, safe to share across
//! concurrent requests. Every outcome is an [`AuthDecision`] value — denied
//! requests are data, not errors; only registration-time misconfiguration
//! returns `Err`.
//!
//! ## Quick start
//! ```no_run
//! use wicket_auth::{AuthOptions, CookieTokenAuthenticator};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let scheme = CookieTokenAuthenticator::new(AuthOptions::with_key("YourApplicationPrivateKey"))?;
//!
//! let decision = scheme.authenticate(Some("access_token=eyJ...")).await;
//! println!("status={}", decision.status_code());
//! # Ok(()) }
//! ```
//!
//! Routing, scope enforcement, and response delivery stay with the host;
//! `wicket-axum` wires this crate into an axum router.

#![forbid(unsafe_code)]

mod cookie;
mod decision;
mod error;
mod resolver;
mod scheme;
mod token;

pub use cookie::{
    ACCESS_TOKEN_COOKIE, CookieOptions, SameSite, build_clear_cookie, build_set_cookie,
    token_from_cookie_header,
};
pub use decision::{AuthDecision, Claims, Credentials, DenyReason};
pub use error::{Error, Result};
pub use jsonwebtoken::Algorithm;
pub use resolver::{BoxError, IdentityResolver, Resolution, ResolverFn};
pub use scheme::{AuthOptions, CookieTokenAuthenticator};
