//! # Validation Error Taxonomy
//!
//! One variant per clause. A rejection names the exact invariant that
//! failed; callers surface it verbatim and never retry a deterministic
//! rejection.

use serde::{Deserialize, Serialize};
use survey_types::{Amount, PartyId};
use thiserror::Error;

/// A clause-level rejection from the validation engine.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    // =========================================================================
    // Shape clauses (state counts and kinds per command)
    // =========================================================================
    /// The command requires at least one input cash state.
    #[error("There should be at least one input cash state")]
    NoCashInput,

    /// The command requires at least one output cash state.
    #[error("There should be at least one output cash state")]
    NoCashOutput,

    /// Exactly one survey request must be produced.
    #[error("Exactly one survey request state should be created")]
    ExpectedSingleRequestOutput,

    /// Exactly one survey request must be consumed.
    #[error("One input state should be consumed, the survey request")]
    ExpectedSingleRequestInput,

    /// Issue must create the survey, its key and the completed request.
    #[error("Three output states should be created: the survey, the survey key and the updated survey request")]
    WrongIssueOutputs,

    /// Exactly one survey must be consumed.
    #[error("There should be one input survey state")]
    ExpectedSingleSurveyInput,

    /// Exactly one survey must be produced.
    #[error("There should be one output survey state")]
    ExpectedSingleSurveyOutput,

    /// Exactly one survey key must be consumed.
    #[error("There should be one input survey key state")]
    ExpectedSingleKeyInput,

    /// Exactly one survey key must be produced.
    #[error("There should be one output survey key state")]
    ExpectedSingleKeyOutput,

    /// Trade pays the prior owner and the issuer, nothing else.
    #[error("There should be exactly two output cash states, the owner share and the issuer share")]
    ExpectedTwoCashOutputs,

    /// A state kind foreign to this command appeared in the transaction.
    #[error("State kinds not consumed or produced by this command are present")]
    ForeignStateKind,

    /// This command does not carry a sealed document.
    #[error("No attachment is expected for this command")]
    UnexpectedAttachment,

    // =========================================================================
    // Price and conservation clauses
    // =========================================================================
    /// The survey price must be strictly positive.
    #[error("The survey price must be positive")]
    NonPositivePrice,

    /// The survey's initial price must be strictly positive.
    #[error("The survey's initial price must be positive")]
    NonPositiveInitialPrice,

    /// At issuance there is no markup: initial price equals resale price.
    #[error("The initial price must be equal to the resale price")]
    InitialResaleMismatch { initial: Amount, resale: Amount },

    /// Consumed cash must cover the survey price.
    #[error("The cash consumed ({consumed}) must cover the survey price ({price})")]
    CashBelowPrice { consumed: Amount, price: Amount },

    /// Cash totals must be conserved across the transaction.
    #[error("The input cash ({consumed}) must be equal to the output cash ({produced})")]
    CashNotConserved { consumed: Amount, produced: Amount },

    /// Cash amounts in one transaction must sum without overflowing.
    #[error("The cash amounts overflow when summed")]
    CashOverflow,

    /// Trade consumes exactly the resale price, no overpayment.
    #[error("The cash consumed ({consumed}) must equal the resale price ({price}) exactly")]
    CashNotExactPrice { consumed: Amount, price: Amount },

    /// The prior owner receives 80% of the resale price, to the unit.
    #[error("Output cash to the owner should be equal to 80% of the resale price (expected {expected}, got {got})")]
    WrongOwnerShare { expected: Amount, got: Amount },

    /// The original issuer receives 20% of the resale price, to the unit.
    #[error("Output cash to the issuer should be equal to 20% of the resale price (expected {expected}, got {got})")]
    WrongIssuerShare { expected: Amount, got: Amount },

    // =========================================================================
    // Lifecycle clauses
    // =========================================================================
    /// A freshly opened request must be pending.
    #[error("The output survey request status must be pending")]
    RequestNotPending,

    /// The consumed request must still be pending.
    #[error("The input survey request status must be pending")]
    ConsumedRequestNotPending,

    /// Issuance flips the request to complete.
    #[error("The output survey request status must be complete")]
    RequestNotComplete,

    /// The completed request must be the same record lineage, price, land
    /// and parties as the consumed one.
    #[error("The output survey request must continue the consumed request unchanged apart from its status")]
    RequestContinuityBroken,

    /// Survey versions across a trade differ only in their owner.
    #[error("The output survey must continue the consumed survey unchanged apart from its owner")]
    SurveyContinuityBroken,

    /// Key versions across a trade differ only in their owner.
    #[error("The output survey key must continue the consumed key unchanged apart from its owner")]
    KeyContinuityBroken,

    // =========================================================================
    // Binding clauses (content hash, key pairing, document)
    // =========================================================================
    /// The content hash is invariant across the survey's lifetime.
    #[error("The initial and final survey hashes must be the same")]
    ContentHashChanged,

    /// Survey and key must carry the same content hash and move together.
    #[error("The survey key must carry the survey's content hash and belong to the survey owner")]
    KeyNotInLockStep,

    /// Fatal: the sealed document is absent or its hash does not bind to
    /// the survey record. Never silently ignored.
    #[error("Attachment missing or does not match hash")]
    DocumentMissingOrHashMismatch,

    // =========================================================================
    // Ownership and signer clauses
    // =========================================================================
    /// Every consumed cash state must belong to the requester.
    #[error("The input cash owner must be the requester")]
    InputCashNotOwnedByRequester,

    /// Every produced cash state must belong to the surveyor.
    #[error("The output cash owner must be the surveyor")]
    OutputCashNotOwnedBySurveyor,

    /// The requester of the consumed request becomes the survey owner.
    #[error("The purchase requester must be the final survey owner")]
    OwnerNotRequester,

    /// The surveyor of the consumed request is the survey issuer.
    #[error("The surveyor of the request must be the survey issuer")]
    IssuerNotSurveyor,

    /// The survey must describe the land the request named.
    #[error("The survey must be for the land title named in the request")]
    LandTitleMismatch,

    /// The survey's initial price is the agreed request price.
    #[error("The survey's initial price must equal the requested price")]
    PriceMismatch { requested: Amount, initial: Amount },

    /// The buyer funds the trade with cash it owns.
    #[error("The input cash owner must be the new survey owner")]
    InputCashNotOwnedByBuyer,

    /// A survey cannot be sold to its current owner.
    #[error("Cannot sell a survey to yourself")]
    SelfTrade,

    /// A party whose authorisation this command demands is not in the
    /// transaction's signer set.
    #[error("Required signer {0} is missing from the transaction")]
    MissingRequiredSigner(PartyId),
}
