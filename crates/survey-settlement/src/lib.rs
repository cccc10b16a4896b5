//! # Settlement Protocol
//!
//! Multi-party settlement of marketplace transactions: candidate
//! construction, local validation, countersignature collection over peer
//! sessions, sequencer submission, and post-commit distribution.
//!
//! ## Structure
//!
//! - **Ports**: [`ports::inbound::SettlementApi`] is what an operator
//!   drives; [`ports::outbound`] is what flows depend on (state store,
//!   sequencer, peer transport, document store, checkpoints)
//! - **Flows**: one initiator-side flow per operation
//! - **Responder**: the counterparty side of every session
//!
//! Failure anywhere before the sequencer accepts a candidate settles
//! nothing; there is no partial state to clean up.

pub mod checkpoint;
pub mod config;
pub mod context;
pub mod errors;
pub mod flows;
pub mod messages;
pub mod ports;
pub mod responder;
pub mod service;

#[cfg(test)]
pub(crate) mod testkit;

pub use checkpoint::{FlowId, FlowStage};
pub use config::SettlementConfig;
pub use context::FlowContext;
pub use errors::SettlementError;
pub use messages::PeerMessage;
pub use responder::{verify_committed_notice, Responder};
pub use service::SettlementService;
