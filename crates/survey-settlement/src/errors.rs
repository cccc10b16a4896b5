//! Settlement error taxonomy.
//!
//! Protocol failures before the commit point leave no trace on the ledger:
//! a flow that returns an error here has settled nothing, and the caller
//! may rebuild a fresh candidate and try again (except where the variant
//! says otherwise).

use crate::ports::outbound::{StoreError, TransportError};
use survey_types::{Amount, LinearId, PartyId, StateRef, TxError};
use survey_validation::ValidationError;
use thiserror::Error;

/// Errors surfaced by settlement flows.
#[derive(Debug, Error)]
pub enum SettlementError {
    // ============================================================
    // Local rejection, before anything leaves this node
    // ============================================================
    /// The candidate failed the validation engine. Raised locally by the
    /// initiator or remotely by a countersigner re-running the same checks.
    #[error("Validation rejected candidate: {0}")]
    Validation(#[from] ValidationError),

    /// No unconsumed state with the given logical id is known locally.
    #[error("No unconsumed state with id {0}")]
    NotFound(LinearId),

    /// The unconsumed cash at hand cannot be assembled into the exact
    /// amount a candidate must consume.
    #[error("Cannot assemble exact funding of {required} from unconsumed cash")]
    FundingUnavailable { required: Amount },

    /// A signature operation failed: forged, stray, or missing.
    #[error(transparent)]
    Signatures(#[from] TxError),

    // ============================================================
    // Counterparty round trips
    // ============================================================
    /// The counterparty did not answer within the configured window.
    /// All-or-nothing: the flow fails, nothing was committed.
    #[error("Counterparty {0} did not respond in time")]
    CounterpartyTimeout(PartyId),

    /// The counterparty answered with an explicit refusal.
    #[error("Counterparty {peer} refused: {reason}")]
    CounterpartyRefused { peer: PartyId, reason: String },

    /// The counterparty answered with a message the protocol does not
    /// allow at this point.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    // ============================================================
    // Commit point
    // ============================================================
    /// The sequencer refused the candidate because an input was already
    /// consumed by an earlier committed transaction. Not retried
    /// automatically: the surviving inputs must be re-resolved first.
    #[error("Input {0} was already consumed by an earlier transaction")]
    SequencerConflict(StateRef),

    // ============================================================
    // Escrow
    // ============================================================
    /// The oracle refused to release (or accept) a key. A hard trust
    /// rejection, never retryable.
    #[error("Oracle refused the key request")]
    UnauthorizedKeyRequest,

    // ============================================================
    // Infrastructure
    // ============================================================
    #[error("State store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
}
