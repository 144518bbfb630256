//! Error types.

use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Registration-time faults.
///
/// These surface once, when the scheme is constructed. Per-request outcomes
/// are [`crate::AuthDecision`] values and never appear here.
#[derive(Debug, Error)]
pub enum Error {
    /// No signing key was supplied in the scheme options.
    #[error("missing required signing key in scheme options")]
    MissingKey,

    /// An option is present but unusable.
    #[error("invalid scheme options: {0}")]
    InvalidOptions(String),
}
