//! Ports: the boundary traits of the settlement protocol.
//!
//! Inbound ports are what callers drive; outbound ports are what the
//! flows depend on. Adapters (in-memory or otherwise) live with the node
//! runtime, never here.

pub mod inbound;
pub mod outbound;

pub use inbound::{IssueParams, SettlementApi};
pub use outbound::{
    CheckpointStore, DocumentStore, PeerNetwork, PeerSession, Sequencer, SequencerError,
    StateStore, StoreError, TransportError,
};
