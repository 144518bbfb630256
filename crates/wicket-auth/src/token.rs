//! Token shape and signature/expiry verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::decision::Claims;

/// A compact signed token is exactly `header.payload.signature`.
pub(crate) fn has_token_shape(raw: &str) -> bool {
    raw.split('.').count() == 3
}

/// Verification failures the scheme distinguishes. Expiry is separate from
/// every other failure; nothing finer-grained is observable.
#[derive(Debug, Error)]
pub(crate) enum VerifyError {
    #[error("token expired")]
    Expired,
    #[error("token verification failed: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Verifies tokens against the shared signing secret.
///
/// Key material is intentionally not printable via Debug.
pub(crate) struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Callers must pass a non-empty algorithm allow-list.
    pub(crate) fn new(secret: &[u8], algorithms: &[Algorithm], leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(algorithms[0]);
        validation.algorithms = algorithms.to_vec();
        validation.leeway = leeway_seconds;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        // Expiry is checked when the claim is present; no claim is required.
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub(crate) fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(VerifyError::Expired),
                _ => Err(VerifyError::Invalid(err)),
            },
        }
    }
}
