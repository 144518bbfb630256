//! The identity-resolution seam.
//!
//! A resolver maps verified token claims to an application-level identity —
//! typically a user-store lookup. The scheme invokes it exactly once per
//! authentication attempt and never retries.

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::decision::Claims;

/// Error type collaborators may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of one identity lookup.
#[derive(Debug)]
pub enum Resolution {
    /// The identity is known. The value becomes the request's credentials
    /// once the scheme has checked it is a JSON object.
    Accepted(Value),

    /// The identity is unknown or no longer valid. Partial credentials, if
    /// supplied, are carried for diagnostics only.
    Rejected {
        /// Whatever identity data the lookup produced before rejecting.
        credentials: Option<Value>,
    },

    /// The lookup itself failed (identity store unreachable, ...). Treated
    /// as a server fault, not a client authentication failure.
    Failed {
        /// The underlying error.
        cause: BoxError,
        /// Whatever identity data the lookup produced before failing.
        credentials: Option<Value>,
    },
}

impl Resolution {
    /// Accept with the given credentials value.
    pub fn accept(credentials: impl Into<Value>) -> Self {
        Resolution::Accepted(credentials.into())
    }

    /// Reject without partial credentials.
    pub fn reject() -> Self {
        Resolution::Rejected { credentials: None }
    }

    /// Fail without partial credentials.
    pub fn fail(cause: impl Into<BoxError>) -> Self {
        Resolution::Failed {
            cause: cause.into(),
            credentials: None,
        }
    }
}

/// Maps verified claims to an application identity.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve the decoded claims of a verified token.
    ///
    /// Invoked once per authentication attempt, only after signature and
    /// expiry checks passed.
    async fn resolve(&self, claims: Claims) -> Resolution;
}

/// Adapter for resolvers written as plain async functions.
///
/// ```
/// use wicket_auth::{Resolution, ResolverFn};
///
/// let resolver = ResolverFn::new(|claims: wicket_auth::Claims| async move {
///     match claims.get("username").and_then(|v| v.as_str()) {
///         Some("johndoe") => Resolution::accept(serde_json::json!({"user": "johndoe"})),
///         _ => Resolution::reject(),
///     }
/// });
/// # let _ = resolver;
/// ```
pub struct ResolverFn<F>(F);

impl<F> ResolverFn<F> {
    /// Wrap an async function as an [`IdentityResolver`].
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> IdentityResolver for ResolverFn<F>
where
    F: Fn(Claims) -> Fut + Send + Sync,
    Fut: Future<Output = Resolution> + Send,
{
    async fn resolve(&self, claims: Claims) -> Resolution {
        (self.0)(claims).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn function_resolvers_adapt() {
        let resolver = ResolverFn::new(|claims: Claims| async move {
            match claims.get("ok") {
                Some(Value::Bool(true)) => Resolution::accept(json!({"user": "x"})),
                _ => Resolution::reject(),
            }
        });

        let mut claims = Claims::new();
        claims.insert("ok".to_string(), json!(true));
        assert!(matches!(
            resolver.resolve(claims).await,
            Resolution::Accepted(_)
        ));
        assert!(matches!(
            resolver.resolve(Claims::new()).await,
            Resolution::Rejected { credentials: None }
        ));
    }
}
