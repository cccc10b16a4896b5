//! # Validation Engine
//!
//! The pure invariant-checking core of the survey ledger: a deterministic
//! function from a candidate transaction to accept or clause-level reject.
//!
//! Every principal runs this engine independently before signing: the
//! sequencer's acceptance is not a substitute for a counterparty's own
//! check. The engine never mutates state, holds no locks, and may be
//! invoked concurrently and repeatedly with the same result.
//!
//! Dispatch is over the closed [`Command`] sum type; each command has a
//! fixed checklist of clauses, short-circuiting on the first failure with
//! a rejection naming the violated invariant.

pub mod errors;

mod issue;
mod issue_request;
mod trade;

#[cfg(test)]
pub(crate) mod testutil;

pub use errors::ValidationError;
pub use trade::{issuer_share, owner_share};

use survey_types::{Command, PartyId, Transaction};

/// Validate a candidate transaction against the command's clause list.
///
/// Pure and side-effect free: validating the same unmodified candidate
/// twice yields the same result.
pub fn validate(tx: &Transaction) -> Result<(), ValidationError> {
    match tx.command {
        Command::IssueRequest => issue_request::check(tx),
        Command::Issue => issue::check(tx),
        Command::Trade => trade::check(tx),
    }
}

/// Clause shared by every command: each named party must appear in the
/// transaction's required signer set.
pub(crate) fn require_signers(
    tx: &Transaction,
    required: &[PartyId],
) -> Result<(), ValidationError> {
    for party in required {
        if !tx.signers.contains(party) {
            return Err(ValidationError::MissingRequiredSigner(*party));
        }
    }
    Ok(())
}
