//! Fulfil a pending survey request: seal the document, escrow its key,
//! and commit the survey, its key record, and the completed request.

use crate::checkpoint::{FlowId, FlowStage};
use crate::context::FlowContext;
use crate::errors::SettlementError;
use crate::flows::support;
use crate::messages::PeerMessage;
use crate::ports::inbound::IssueParams;
use survey_types::{
    Attachment, Command, LinearId, RequestStatus, SignedTransaction, StateKind, SurveyKeyState,
    SurveyRequestState, SurveyState, Transaction, TxId,
};
use tracing::info;

pub struct IssueSurveyFlow;

impl IssueSurveyFlow {
    /// Issue against a pending request addressed to this node. The key is
    /// escrowed with the oracle before submission, so a committed survey
    /// always has a retrievable key.
    pub async fn run(ctx: &FlowContext, params: IssueParams) -> Result<TxId, SettlementError> {
        let flow_id = FlowId::fresh();
        info!(flow = %flow_id, request = %params.request_id, "issuing survey");
        match Self::execute(ctx, flow_id, params).await {
            Ok(txid) => Ok(txid),
            Err(err) => Err(support::abort(ctx, flow_id, err).await),
        }
    }

    async fn execute(
        ctx: &FlowContext,
        flow_id: FlowId,
        params: IssueParams,
    ) -> Result<TxId, SettlementError> {
        ctx.checkpoint(flow_id, FlowStage::Building).await?;
        let request_entry = ctx
            .store
            .find_by_logical_id(StateKind::SurveyRequest, params.request_id)
            .await?
            .ok_or(SettlementError::NotFound(params.request_id))?;
        let request = request_entry
            .record
            .as_survey_request()
            .cloned()
            .ok_or(SettlementError::NotFound(params.request_id))?;
        if request.surveyor != ctx.party() {
            return Err(SettlementError::Protocol(
                "request is addressed to a different surveyor".into(),
            ));
        }

        let content_hash = ctx.documents.import(params.document).await?;

        // Escrow before submission. If the oracle refuses, nothing has
        // touched the ledger yet.
        let mut session = ctx.network.open(ctx.oracle).await?;
        let reply = ctx
            .exchange(
                session.as_mut(),
                ctx.oracle,
                PeerMessage::RegisterKey {
                    content_hash,
                    encoded_key: params.encoded_key.clone(),
                },
                ctx.config.oracle_timeout,
            )
            .await?;
        if reply != PeerMessage::KeyRegistered {
            return Err(SettlementError::Protocol(format!(
                "expected key_registered, got {}",
                reply.tag()
            )));
        }

        let survey = SurveyState {
            issuer: ctx.party(),
            owner: request.requester,
            land_title_id: request.land_title_id.clone(),
            survey_date: params.survey_date,
            property_address: params.property_address,
            initial_price: request.price,
            resale_price: request.price,
            content_hash,
            linear_id: LinearId::fresh(),
        };
        let key = SurveyKeyState {
            surveyor: ctx.party(),
            owner: request.requester,
            content_hash,
            encoded_key: params.encoded_key,
            linear_id: LinearId::fresh(),
        };
        let completed = SurveyRequestState {
            status: RequestStatus::Complete,
            ..request.clone()
        };
        let tx = Transaction {
            inputs: vec![request_entry],
            outputs: vec![survey.into(), key.into(), completed.into()],
            command: Command::Issue,
            signers: [ctx.party(), request.requester].into_iter().collect(),
            attachment: Some(Attachment { content_hash }),
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
