//! # Integration Tests Crate
//!
//! End-to-end scenarios driving full nodes over the loopback hub: every
//! exchange here crosses the real settlement flows, the responder, the
//! sequencer, and the oracle host.
//!
//! ## Structure
//!
//! ```text
//! integration-tests/
//! └── src/
//!     ├── lib.rs        # This file
//!     ├── harness.rs    # Marketplace wiring shared by the scenarios
//!     ├── lifecycle.rs  # Request → issue → trade, with price split
//!     ├── contention.rs # Double-spend races at the sequencer
//!     ├── escrow.rs     # Key release and its refusals
//!     └── forgery.rs    # Fabricated committed notices get nowhere
//! ```

#[cfg(test)]
mod harness;

#[cfg(test)]
mod contention;
#[cfg(test)]
mod lifecycle;
