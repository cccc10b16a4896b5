//! # Survey-Ledger Node Runtime
//!
//! Wires the settlement protocol, validation engine, and key-escrow
//! oracle into runnable principals.
//!
//! ## Modular Structure
//!
//! - `adapters/` - In-memory implementations of the settlement ports
//! - `node` - One marketplace principal (store, engine, responder task)
//! - `oracle_host` - The oracle principal serving escrow sessions
//! - `config` - Runtime parameters with environment overrides
//!
//! Every principal runs in one process, routed over the loopback hub;
//! the sequencer is the only shared piece of ledger infrastructure.

pub mod adapters;
pub mod config;
pub mod node;
pub mod oracle_host;

pub use config::NodeConfig;
pub use node::Node;
pub use oracle_host::OracleHost;
