//! Flow checkpoints.
//!
//! Each flow run persists its current stage before side effects, so an
//! operator can see where an interrupted run stopped. Stages strictly
//! advance; a flow that fails records `Aborted` and is finished. Recovery
//! is by running a fresh flow, never by resuming a half-signed candidate.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one flow run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowId(pub Uuid);

impl FlowId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlowId({})", self.0)
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The stages a flow run moves through, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
    /// Resolving inputs and assembling the candidate.
    Building,
    /// Running the validation engine locally.
    Validating,
    /// Applying the initiator's own signature.
    Signing,
    /// Gathering countersignatures from the remaining required signers.
    CollectingSignatures,
    /// Candidate handed to the sequencer.
    Submitting,
    /// Committed; distributing copies to participants.
    Finalising,
    /// Flow complete.
    Done,
    /// Flow failed before the commit point; nothing was settled.
    Aborted,
}
