//! In-memory adapters behind the settlement ports.
//!
//! One process hosts every party; the adapters here give each principal
//! its own store, document vault, and checkpoint table, while the
//! sequencer and the loopback hub are shared marketplace infrastructure.

pub mod checkpoints;
pub mod documents;
pub mod loopback;
pub mod sequencer;
pub mod store;

pub use checkpoints::MemoryCheckpointStore;
pub use documents::MemoryDocumentStore;
pub use loopback::{Incoming, LoopbackHub, LoopbackNetwork};
pub use sequencer::InMemorySequencer;
pub use store::MemoryStateStore;
