//! # Key-Escrow Oracle
//!
//! A service trusted for exactly one predicate: release the decryption key
//! for a sealed survey document only to a party the oracle can itself
//! prove, from committed ledger state, to be the survey's current owner.
//!
//! The oracle never trusts the caller's claim. `authorize` re-derives
//! ownership from the oracle's own [`ports::LedgerView`], so a stale or
//! forged survey record is rejected even if it was genuine once.
//!
//! The oracle performs no transaction mutation; it is a pure
//! read-and-attest service plus one persisted key/hash table.

pub mod errors;
pub mod ports;
pub mod service;
pub mod vault;

pub use errors::OracleError;
pub use ports::LedgerView;
pub use service::Oracle;
pub use vault::KeyVault;
