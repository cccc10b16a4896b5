//! Open a survey request: pay the surveyor up front, produce a pending
//! request record.

use crate::checkpoint::{FlowId, FlowStage};
use crate::context::FlowContext;
use crate::errors::SettlementError;
use crate::flows::support;
use survey_types::{
    Amount, CashState, Command, LinearId, PartyId, RequestStatus, SignedTransaction, StateRecord,
    SurveyRequestState, Transaction, TxId,
};
use tracing::info;

pub struct RequestSurveyFlow;

impl RequestSurveyFlow {
    /// Pay `surveyor` the quoted `price` for surveying the land behind
    /// `land_title_id`, committing a pending request both parties sign.
    pub async fn run(
        ctx: &FlowContext,
        surveyor: PartyId,
        land_title_id: String,
        price: Amount,
    ) -> Result<TxId, SettlementError> {
        let flow_id = FlowId::fresh();
        info!(flow = %flow_id, surveyor = %surveyor, land = %land_title_id, price, "requesting survey");
        match Self::execute(ctx, flow_id, surveyor, land_title_id, price).await {
            Ok(txid) => Ok(txid),
            Err(err) => Err(support::abort(ctx, flow_id, err).await),
        }
    }

    async fn execute(
        ctx: &FlowContext,
        flow_id: FlowId,
        surveyor: PartyId,
        land_title_id: String,
        price: Amount,
    ) -> Result<TxId, SettlementError> {
        ctx.checkpoint(flow_id, FlowStage::Building).await?;
        let inputs = ctx.select_exact_cash(price).await?;
        let request = SurveyRequestState {
            requester: ctx.party(),
            surveyor,
            land_title_id,
            price,
            status: RequestStatus::Pending,
            linear_id: LinearId::fresh(),
        };
        let payment = CashState {
            owner: surveyor,
            amount: price,
            linear_id: LinearId::fresh(),
        };
        let tx = Transaction {
            inputs,
            outputs: vec![request.into(), payment.into()],
            command: Command::IssueRequest,
            signers: [ctx.party(), surveyor].into_iter().collect(),
            attachment: None,
        };

        ctx.checkpoint(flow_id, FlowStage::Validating).await?;
        survey_validation::validate(&tx)?;

        ctx.checkpoint(flow_id, FlowStage::Signing).await?;
        let mut stx = SignedTransaction::unsigned(tx);
        stx.sign_with(&ctx.identity)?;

        let committed = support::collect_commit_distribute(ctx, flow_id, stx).await?;
        Ok(committed.id())
    }
}
