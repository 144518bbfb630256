//! Per-request authentication outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims recovered from a verified token.
///
/// Deliberately schema-free: only convention, not this crate, assumes
/// particular keys.
pub type Claims = Map<String, Value>;

/// Attributes of an authenticated identity, handed to post-auth stages.
///
/// Always a JSON object. The constructors are the only way in, so a value of
/// this type reaching a handler is never null, a string, or another bare
/// primitive — even when the identity resolver misbehaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Claims);

impl Credentials {
    /// Use verified claims directly as credentials (the no-resolver path).
    pub fn from_claims(claims: Claims) -> Self {
        Self(claims)
    }

    /// Accept a resolver-produced value, rejecting anything but an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Look up a single attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Claims {
        &self.0
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> Claims {
        self.0
    }
}

/// Why a request was left unauthenticated.
///
/// Expiry and signature failure are distinct on purpose: clients react to an
/// expired token by refreshing it, so the distinction is part of the
/// observable contract, not logging detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No `Cookie` header, no token cookie, or an empty token cookie.
    MissingToken,
    /// The token verified against the key but its `exp` claim is in the past.
    TokenExpired,
    /// Signature, claim, or algorithm verification failed.
    InvalidSignature,
    /// The identity resolver did not recognize the verified claims.
    TokenRejected,
}

impl DenyReason {
    /// Short reason string shown to the client.
    pub fn message(self) -> &'static str {
        match self {
            DenyReason::MissingToken => "Missing access token",
            DenyReason::TokenExpired => "Expired token received for JSON Web Token validation",
            DenyReason::InvalidSignature => {
                "Invalid signature received for JSON Web Token validation"
            }
            DenyReason::TokenRejected => "Invalid token",
        }
    }
}

/// Terminal outcome of one authentication attempt.
///
/// Four client-fault/server-fault classes, each with a fixed boundary
/// status. Partial credentials carried on denials are diagnostics for the
/// host's logs; they are never authenticated.
#[derive(Debug)]
pub enum AuthDecision {
    /// The caller is authenticated; continue into the host's pipeline.
    Authenticated(Credentials),
    /// The caller is not authenticated (HTTP 401).
    Unauthenticated {
        /// Which check turned the request away.
        reason: DenyReason,
        /// Partial identity data supplied by the resolver, if any.
        credentials: Option<Value>,
    },
    /// The request does not carry a token-shaped credential (HTTP 400).
    MalformedRequest {
        /// Reason string shown to the client.
        message: &'static str,
    },
    /// A server-side fault while authenticating (HTTP 500).
    InternalError {
        /// What went wrong; for the host's logs, not the client.
        cause: String,
        /// Partial identity data supplied by the resolver, if any.
        credentials: Option<Value>,
    },
}

impl AuthDecision {
    /// The HTTP status the host boundary emits for this outcome.
    ///
    /// 200 means "continue to the handler", not a response by itself.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthDecision::Authenticated(_) => 200,
            AuthDecision::Unauthenticated { .. } => 401,
            AuthDecision::MalformedRequest { .. } => 400,
            AuthDecision::InternalError { .. } => 500,
        }
    }

    /// True for [`AuthDecision::Authenticated`].
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthDecision::Authenticated(_))
    }
}
