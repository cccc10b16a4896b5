//! Peer protocol messages.
//!
//! One closed enum covers every session the protocol opens: countersigning,
//! trade negotiation, post-commit distribution, and the oracle's escrow
//! sessions. Each session is a short request/response exchange; an
//! unexpected variant at any point is a protocol violation and aborts the
//! flow.

use serde::{Deserialize, Serialize};
use survey_types::{
    CommittedTransaction, ContentHash, PartySignature, SignedTransaction, StateEntry, SurveyState,
};

/// Everything one node ever says to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerMessage {
    // ============================================================
    // Countersigning
    // ============================================================
    /// Initiator → required signer: re-validate this candidate and, if it
    /// passes, countersign it. Inputs travel resolved, so the responder
    /// attests to exactly the state versions it checked.
    SignatureRequest(SignedTransaction),
    /// Signer → initiator: the requested countersignature.
    SignatureResponse(PartySignature),

    // ============================================================
    // Trade negotiation
    // ============================================================
    /// Seller → buyer: the survey and key on offer. The buyer completes
    /// the candidate with its own payment inputs.
    TradeProposal { survey: StateEntry, key: StateEntry },
    /// Buyer → seller: the completed, buyer-signed candidate.
    TradeCandidate(SignedTransaction),

    // ============================================================
    // Post-commit distribution
    // ============================================================
    /// Initiator → participant: a committed copy for the recipient's
    /// own records.
    CommittedNotice(CommittedTransaction),
    /// Receipt of a committed notice.
    Ack,

    // ============================================================
    // Key escrow
    // ============================================================
    /// Issuer → oracle: escrow this key before the issue commits.
    RegisterKey {
        content_hash: ContentHash,
        encoded_key: String,
    },
    /// Oracle → issuer: the key is escrowed.
    KeyRegistered,
    /// Owner → oracle: release the key for this survey record.
    KeyRequest { survey: SurveyState },
    /// Oracle → owner: the escrowed key.
    KeyReleased { encoded_key: String },

    // ============================================================
    // Any responder, any point
    // ============================================================
    /// Explicit refusal, with the responder's reason.
    Refused { reason: String },
}

impl PeerMessage {
    /// Short tag for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SignatureRequest(_) => "signature_request",
            Self::SignatureResponse(_) => "signature_response",
            Self::TradeProposal { .. } => "trade_proposal",
            Self::TradeCandidate(_) => "trade_candidate",
            Self::CommittedNotice(_) => "committed_notice",
            Self::Ack => "ack",
            Self::RegisterKey { .. } => "register_key",
            Self::KeyRegistered => "key_registered",
            Self::KeyRequest { .. } => "key_request",
            Self::KeyReleased { .. } => "key_released",
            Self::Refused { .. } => "refused",
        }
    }
}
