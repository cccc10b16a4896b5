//! # Survey-Ledger Core Types
//!
//! The state model and transaction container shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `PartyId`, `Keypair` (Ed25519)
//! - **State Model**: `SurveyRequestState`, `SurveyState`, `SurveyKeyState`,
//!   `CashState`, the `StateRecord` sum type
//! - **Transaction Container**: `StateRef`, `StateEntry`, `Command`,
//!   `Transaction`, `SignedTransaction`, `CommittedTransaction`
//!
//! All state records are immutable value objects: a new version of a record
//! is a new object carrying the same `LinearId`, never an in-place mutation.

pub mod identity;
pub mod states;
pub mod transaction;

pub use identity::{Keypair, PartyId};
pub use states::{
    Amount, CashState, ContentHash, LinearId, RequestStatus, StateKind, StateRecord, SurveyKeyState,
    SurveyRequestState, SurveyState,
};
pub use transaction::{
    Attachment, Command, CommitReceipt, CommittedTransaction, PartySignature, SignedTransaction,
    StateEntry, StateRef, Transaction, TxError, TxId,
};
