//! Outbound (driven) ports.
//!
//! Flows speak to the world exclusively through these traits: the local
//! unconsumed-state store, the sequencer, the document store, the peer
//! transport, and the checkpoint store.

use crate::checkpoint::{FlowId, FlowStage};
use crate::messages::PeerMessage;
use async_trait::async_trait;
use survey_types::{
    CommitReceipt, CommittedTransaction, ContentHash, LinearId, PartyId, SignedTransaction,
    StateEntry, StateKind, StateRef,
};
use thiserror::Error;

/// A backend failure in a store adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct StoreError(pub String);

/// A transport failure: connection refused, stream closed mid-session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// This node's view of unconsumed ledger state plus its committed history.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// The current unconsumed version of the record with this logical id,
    /// if this node holds one of the given kind.
    async fn find_by_logical_id(
        &self,
        kind: StateKind,
        id: LinearId,
    ) -> Result<Option<StateEntry>, StoreError>;

    /// Every unconsumed record of the given kind this node holds.
    async fn current_unconsumed(&self, kind: StateKind) -> Result<Vec<StateEntry>, StoreError>;

    /// Record a committed transaction: consume its inputs, make its
    /// outputs available. Idempotent for a transaction already recorded.
    async fn persist(&self, committed: &CommittedTransaction) -> Result<(), StoreError>;
}

/// Why the sequencer refused a submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SequencerError {
    /// An input was consumed by an earlier committed transaction. The
    /// losing submission settles nothing.
    #[error("Input {0} already consumed")]
    Conflict(StateRef),

    /// The submission was not fully signed.
    #[error("Rejected signatures: {0}")]
    RejectedSignatures(String),

    #[error("Sequencer unavailable: {0}")]
    Unavailable(String),
}

/// The shared commit point. Acceptance totally orders the transaction and
/// atomically consumes its inputs; first submission to claim an input wins.
#[async_trait]
pub trait Sequencer: Send + Sync {
    async fn submit(&self, tx: &SignedTransaction) -> Result<CommitReceipt, SequencerError>;

    /// The identity whose attestation signature commit receipts carry.
    fn party(&self) -> PartyId;
}

/// Content-addressed storage for sealed survey documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The sealed bytes stored under this hash.
    async fn open(&self, hash: ContentHash) -> Result<Vec<u8>, StoreError>;

    /// Store sealed bytes and return their hash.
    async fn import(&self, bytes: Vec<u8>) -> Result<ContentHash, StoreError>;
}

/// One open conversation with a peer.
#[async_trait]
pub trait PeerSession: Send {
    async fn send(&mut self, msg: PeerMessage) -> Result<(), TransportError>;

    async fn receive(&mut self) -> Result<PeerMessage, TransportError>;

    async fn send_and_receive(&mut self, msg: PeerMessage) -> Result<PeerMessage, TransportError> {
        self.send(msg).await?;
        self.receive().await
    }
}

/// Point-to-point transport between identified parties.
#[async_trait]
pub trait PeerNetwork: Send + Sync {
    /// Open a fresh session with `peer`.
    async fn open(&self, peer: PartyId) -> Result<Box<dyn PeerSession>, TransportError>;
}

/// Durable record of where each flow run got to.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn save(&self, flow_id: FlowId, stage: FlowStage) -> Result<(), StoreError>;

    async fn load(&self, flow_id: FlowId) -> Result<Option<FlowStage>, StoreError>;
}
