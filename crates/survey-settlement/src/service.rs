//! The inbound API, delegating each operation to its flow.

use crate::context::FlowContext;
use crate::errors::SettlementError;
use crate::flows::{IssueSurveyFlow, RequestKeyFlow, RequestSurveyFlow, TradeFlow};
use crate::ports::inbound::{IssueParams, SettlementApi};
use async_trait::async_trait;
use survey_types::{Amount, LinearId, PartyId, TxId};

/// One node's settlement engine.
pub struct SettlementService {
    ctx: FlowContext,
}

impl SettlementService {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &FlowContext {
        &self.ctx
    }
}

#[async_trait]
impl SettlementApi for SettlementService {
    async fn submit_request(
        &self,
        surveyor: PartyId,
        land_title_id: String,
        price: Amount,
    ) -> Result<TxId, SettlementError> {
        RequestSurveyFlow::run(&self.ctx, surveyor, land_title_id, price).await
    }

    async fn issue(&self, params: IssueParams) -> Result<TxId, SettlementError> {
        IssueSurveyFlow::run(&self.ctx, params).await
    }

    async fn trade(&self, survey_id: LinearId, buyer: PartyId) -> Result<TxId, SettlementError> {
        TradeFlow::run(&self.ctx, survey_id, buyer).await
    }

    async fn request_key(&self, survey_id: LinearId) -> Result<String, SettlementError> {
        RequestKeyFlow::run(&self.ctx, survey_id).await
    }
}
