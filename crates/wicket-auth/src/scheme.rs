//! The cookie-token authentication scheme.

use std::sync::Arc;

use jsonwebtoken::Algorithm;

use crate::cookie::{ACCESS_TOKEN_COOKIE, token_from_cookie_header};
use crate::decision::{AuthDecision, Credentials, DenyReason};
use crate::error::{Error, Result};
use crate::resolver::{IdentityResolver, Resolution};
use crate::token::{TokenVerifier, VerifyError, has_token_shape};

const BAD_FORMAT_MESSAGE: &str = "Bad HTTP authentication header format";
const BAD_CREDENTIALS_CAUSE: &str = "Bad credentials object received for jwt auth validation";

/// Options accepted when the scheme is registered.
///
/// `key` is required; everything else defaults to the scheme's standard
/// behavior: the `access_token` cookie, the HMAC algorithm family, and no
/// verification leeway.
#[derive(Clone)]
pub struct AuthOptions {
    /// Secret the tokens are signed with. Required.
    pub key: String,

    /// Optional identity lookup. Without one, decoded claims become the
    /// credentials as-is.
    pub resolver: Option<Arc<dyn IdentityResolver>>,

    /// Name of the cookie carrying the token.
    pub cookie_name: String,

    /// Algorithms accepted during verification.
    pub algorithms: Vec<Algorithm>,

    /// Clock skew tolerated by the expiry check, in seconds.
    pub leeway_seconds: u64,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            key: String::new(),
            resolver: None,
            cookie_name: ACCESS_TOKEN_COOKIE.to_string(),
            algorithms: vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512],
            leeway_seconds: 0,
        }
    }
}

impl AuthOptions {
    /// Options with the given signing key and defaults for the rest.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Attach an identity resolver.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn IdentityResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Decides, per request, whether the caller is authenticated.
///
/// Configured once, then shared read-only across requests: `authenticate`
/// takes `&self`, holds no per-request state, and is safe to call
/// concurrently. Within one attempt the checks run strictly in order with
/// early exits; the only awaited step with a configured resolver is the
/// resolver call itself, so dropping the future abandons the attempt without
/// side effects.
pub struct CookieTokenAuthenticator {
    verifier: TokenVerifier,
    resolver: Option<Arc<dyn IdentityResolver>>,
    cookie_name: String,
}

impl std::fmt::Debug for CookieTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material.
        f.debug_struct("CookieTokenAuthenticator")
            .field("cookie_name", &self.cookie_name)
            .field("has_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl CookieTokenAuthenticator {
    /// Validate the options and build the scheme.
    ///
    /// This is the registration-time assertion: a missing key, an empty
    /// cookie name, or an empty algorithm list fails here, once, and never
    /// per request.
    pub fn new(options: AuthOptions) -> Result<Self> {
        if options.key.is_empty() {
            return Err(Error::MissingKey);
        }
        if options.cookie_name.is_empty() {
            return Err(Error::InvalidOptions(
                "cookie name must not be empty".to_string(),
            ));
        }
        if options.algorithms.is_empty() {
            return Err(Error::InvalidOptions(
                "algorithm allow-list must not be empty".to_string(),
            ));
        }

        Ok(Self {
            verifier: TokenVerifier::new(
                options.key.as_bytes(),
                &options.algorithms,
                options.leeway_seconds,
            ),
            resolver: options.resolver,
            cookie_name: options.cookie_name,
        })
    }

    /// Name of the cookie this scheme reads.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Run one authentication attempt against the raw `Cookie` header.
    ///
    /// Never returns an error: every outcome, including server-side faults,
    /// is classified into a terminal [`AuthDecision`].
    pub async fn authenticate(&self, cookie_header: Option<&str>) -> AuthDecision {
        let token = cookie_header
            .and_then(|header| token_from_cookie_header(header, &self.cookie_name))
            .unwrap_or_default();

        if token.is_empty() {
            return AuthDecision::Unauthenticated {
                reason: DenyReason::MissingToken,
                credentials: None,
            };
        }

        // Reject values that are not token-shaped at all before touching any
        // cryptography: "not a token" is a 400, "a token that failed
        // verification" is a 401.
        if !has_token_shape(token) {
            return AuthDecision::MalformedRequest {
                message: BAD_FORMAT_MESSAGE,
            };
        }

        let claims = match self.verifier.verify(token) {
            Ok(claims) => claims,
            Err(VerifyError::Expired) => {
                return AuthDecision::Unauthenticated {
                    reason: DenyReason::TokenExpired,
                    credentials: None,
                };
            }
            Err(VerifyError::Invalid(_)) => {
                return AuthDecision::Unauthenticated {
                    reason: DenyReason::InvalidSignature,
                    credentials: None,
                };
            }
        };

        let Some(resolver) = &self.resolver else {
            return AuthDecision::Authenticated(Credentials::from_claims(claims));
        };

        match resolver.resolve(claims).await {
            Resolution::Failed { cause, credentials } => AuthDecision::InternalError {
                cause: cause.to_string(),
                credentials,
            },
            Resolution::Rejected { credentials } => AuthDecision::Unauthenticated {
                reason: DenyReason::TokenRejected,
                credentials,
            },
            Resolution::Accepted(value) => match Credentials::from_value(value) {
                Some(credentials) => AuthDecision::Authenticated(credentials),
                None => AuthDecision::InternalError {
                    cause: BAD_CREDENTIALS_CAUSE.to_string(),
                    credentials: None,
                },
            },
        }
    }
}
