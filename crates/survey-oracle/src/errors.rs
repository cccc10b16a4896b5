//! Oracle error types.

use survey_types::ContentHash;
use thiserror::Error;

/// Errors raised by the key-escrow oracle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The caller could not be proven to own the survey it presented.
    /// A hard trust violation, never a retryable condition.
    #[error("Unauthorized key request: caller is not the committed owner of the survey")]
    UnauthorizedKeyRequest,

    /// A different key is already escrowed under this content hash.
    #[error("Conflicting key registration for document {0}")]
    ConflictingRegistration(ContentHash),

    /// No key has been escrowed under this content hash.
    #[error("No key registered for document {0}")]
    KeyNotRegistered(ContentHash),

    /// The oracle's ledger view failed to answer.
    #[error("Ledger view unavailable: {0}")]
    LedgerUnavailable(String),
}
