//! Inbound (driving) port: the operations a node exposes to its operator.

use crate::errors::SettlementError;
use async_trait::async_trait;
use survey_types::{Amount, LinearId, PartyId, TxId};

/// Everything the issuer supplies when fulfilling a survey request. The
/// document arrives already sealed; settlement stores it and binds its
/// hash into the transaction, but never looks inside.
#[derive(Clone, Debug)]
pub struct IssueParams {
    pub request_id: LinearId,
    pub document: Vec<u8>,
    pub encoded_key: String,
    pub survey_date: String,
    pub property_address: String,
}

/// The four marketplace operations.
#[async_trait]
pub trait SettlementApi: Send + Sync {
    /// Pay `surveyor` to survey the land behind `land_title_id`, opening a
    /// pending request. Returns the committed transaction id.
    async fn submit_request(
        &self,
        surveyor: PartyId,
        land_title_id: String,
        price: Amount,
    ) -> Result<TxId, SettlementError>;

    /// Fulfil a pending request addressed to this node: seal the document,
    /// escrow its key with the oracle, and commit the issuance.
    async fn issue(&self, params: IssueParams) -> Result<TxId, SettlementError>;

    /// Sell the survey with this logical id to `buyer` at its listed
    /// resale price.
    async fn trade(&self, survey_id: LinearId, buyer: PartyId) -> Result<TxId, SettlementError>;

    /// Ask the oracle to release the decryption key for a survey this
    /// node owns.
    async fn request_key(&self, survey_id: LinearId) -> Result<String, SettlementError>;
}
