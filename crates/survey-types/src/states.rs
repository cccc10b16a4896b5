//! # State Model
//!
//! Typed immutable records representing the domain facts of the survey
//! marketplace. Successive versions of "the same" record share a `LinearId`;
//! the record contents are never mutated in place.
//!
//! The `ContentHash` carried by a `SurveyState` and its paired
//! `SurveyKeyState` binds both to one specific sealed document and is
//! invariant across every ownership transfer.

use crate::identity::PartyId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Currency amount in base units.
pub type Amount = u64;

/// Stable identifier shared by successive versions of the same record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinearId(pub Uuid);

impl LinearId {
    /// Mint a fresh logical identity for a brand-new record lineage.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for LinearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinearId({})", self.0)
    }
}

impl fmt::Display for LinearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 digest of a sealed survey document.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Hash raw document bytes.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…")
    }
}

/// Lifecycle status of a survey request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting issuance by the surveyor.
    Pending,
    /// Consumed by a successful issuance.
    Complete,
}

/// A request by `requester` for `surveyor` to survey a piece of land.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRequestState {
    pub requester: PartyId,
    pub surveyor: PartyId,
    pub land_title_id: String,
    pub price: Amount,
    pub status: RequestStatus,
    pub linear_id: LinearId,
}

/// A completed survey record. `content_hash` binds this record to the
/// sealed document produced at issuance and never changes across resales;
/// only `owner` changes from version to version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyState {
    pub issuer: PartyId,
    pub owner: PartyId,
    pub land_title_id: String,
    pub survey_date: String,
    pub property_address: String,
    pub initial_price: Amount,
    pub resale_price: Amount,
    pub content_hash: ContentHash,
    pub linear_id: LinearId,
}

/// The escrowed decryption key record paired 1:1 with a `SurveyState`
/// by `content_hash`. Transferred in lock-step with the survey on trade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyKeyState {
    pub surveyor: PartyId,
    pub owner: PartyId,
    pub content_hash: ContentHash,
    pub encoded_key: String,
    pub linear_id: LinearId,
}

/// An external cash asset state. Not defined by this system, but consumed
/// and produced by its transactions; totals are conserved unless a command
/// explicitly authorises issuance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashState {
    pub owner: PartyId,
    pub amount: Amount,
    pub linear_id: LinearId,
}

/// Tag identifying a state kind, used for store queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    SurveyRequest,
    Survey,
    SurveyKey,
    Cash,
}

/// Closed sum over every state record the ledger understands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateRecord {
    SurveyRequest(SurveyRequestState),
    Survey(SurveyState),
    SurveyKey(SurveyKeyState),
    Cash(CashState),
}

impl StateRecord {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::SurveyRequest(_) => StateKind::SurveyRequest,
            Self::Survey(_) => StateKind::Survey,
            Self::SurveyKey(_) => StateKind::SurveyKey,
            Self::Cash(_) => StateKind::Cash,
        }
    }

    pub fn linear_id(&self) -> LinearId {
        match self {
            Self::SurveyRequest(s) => s.linear_id,
            Self::Survey(s) => s.linear_id,
            Self::SurveyKey(s) => s.linear_id,
            Self::Cash(s) => s.linear_id,
        }
    }

    /// The parties that must receive a committed copy of any transaction
    /// touching this record.
    pub fn participants(&self) -> Vec<PartyId> {
        match self {
            Self::SurveyRequest(s) => vec![s.requester, s.surveyor],
            Self::Survey(s) => vec![s.issuer, s.owner],
            Self::SurveyKey(s) => vec![s.surveyor, s.owner],
            Self::Cash(s) => vec![s.owner],
        }
    }

    pub fn as_survey_request(&self) -> Option<&SurveyRequestState> {
        match self {
            Self::SurveyRequest(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_survey(&self) -> Option<&SurveyState> {
        match self {
            Self::Survey(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_survey_key(&self) -> Option<&SurveyKeyState> {
        match self {
            Self::SurveyKey(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_cash(&self) -> Option<&CashState> {
        match self {
            Self::Cash(s) => Some(s),
            _ => None,
        }
    }

    /// Feed a canonical encoding of this record into `hasher`.
    ///
    /// Used for transaction ids; field order is fixed and every variant is
    /// prefixed with a distinct tag byte so records of different kinds can
    /// never collide.
    pub(crate) fn absorb(&self, hasher: &mut Sha256) {
        match self {
            Self::SurveyRequest(s) => {
                hasher.update([0x01]);
                hasher.update(s.requester.0);
                hasher.update(s.surveyor.0);
                hasher.update(s.land_title_id.as_bytes());
                hasher.update(s.price.to_le_bytes());
                hasher.update([match s.status {
                    RequestStatus::Pending => 0u8,
                    RequestStatus::Complete => 1u8,
                }]);
                hasher.update(s.linear_id.0.as_bytes());
            }
            Self::Survey(s) => {
                hasher.update([0x02]);
                hasher.update(s.issuer.0);
                hasher.update(s.owner.0);
                hasher.update(s.land_title_id.as_bytes());
                hasher.update(s.survey_date.as_bytes());
                hasher.update(s.property_address.as_bytes());
                hasher.update(s.initial_price.to_le_bytes());
                hasher.update(s.resale_price.to_le_bytes());
                hasher.update(s.content_hash.0);
                hasher.update(s.linear_id.0.as_bytes());
            }
            Self::SurveyKey(s) => {
                hasher.update([0x03]);
                hasher.update(s.surveyor.0);
                hasher.update(s.owner.0);
                hasher.update(s.content_hash.0);
                hasher.update(s.encoded_key.as_bytes());
                hasher.update(s.linear_id.0.as_bytes());
            }
            Self::Cash(s) => {
                hasher.update([0x04]);
                hasher.update(s.owner.0);
                hasher.update(s.amount.to_le_bytes());
                hasher.update(s.linear_id.0.as_bytes());
            }
        }
    }
}

impl From<SurveyRequestState> for StateRecord {
    fn from(s: SurveyRequestState) -> Self {
        Self::SurveyRequest(s)
    }
}

impl From<SurveyState> for StateRecord {
    fn from(s: SurveyState) -> Self {
        Self::Survey(s)
    }
}

impl From<SurveyKeyState> for StateRecord {
    fn from(s: SurveyKeyState) -> Self {
        Self::SurveyKey(s)
    }
}

impl From<CashState> for StateRecord {
    fn from(s: CashState) -> Self {
        Self::Cash(s)
    }
}
