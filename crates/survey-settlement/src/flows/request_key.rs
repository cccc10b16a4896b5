//! Ask the oracle to release the decryption key for an owned survey.

use crate::checkpoint::{FlowId, FlowStage};
use crate::context::FlowContext;
use crate::errors::SettlementError;
use crate::flows::support;
use crate::messages::PeerMessage;
use survey_types::{LinearId, StateKind};
use tracing::info;

pub struct RequestKeyFlow;

impl RequestKeyFlow {
    /// Present this node's committed survey record to the oracle and
    /// receive the escrowed key. The oracle re-derives ownership from its
    /// own ledger view; a refusal is a hard authorization failure.
    pub async fn run(ctx: &FlowContext, survey_id: LinearId) -> Result<String, SettlementError> {
        let flow_id = FlowId::fresh();
        info!(flow = %flow_id, survey = %survey_id, "requesting survey key");
        match Self::execute(ctx, flow_id, survey_id).await {
            Ok(key) => Ok(key),
            Err(err) => Err(support::abort(ctx, flow_id, err).await),
        }
    }

    async fn execute(
        ctx: &FlowContext,
        flow_id: FlowId,
        survey_id: LinearId,
    ) -> Result<String, SettlementError> {
        ctx.checkpoint(flow_id, FlowStage::Building).await?;
        let survey = ctx
            .store
            .find_by_logical_id(StateKind::Survey, survey_id)
            .await?
            .and_then(|e| e.record.as_survey().cloned())
            .ok_or(SettlementError::NotFound(survey_id))?;

        let mut session = ctx.network.open(ctx.oracle).await?;
        let reply = ctx
            .exchange(
                session.as_mut(),
                ctx.oracle,
                PeerMessage::KeyRequest { survey },
                ctx.config.oracle_timeout,
            )
            .await
            .map_err(|err| match err {
                // The oracle's refusal is an authorization verdict, not a
                // negotiation outcome.
                SettlementError::CounterpartyRefused { .. } => {
                    SettlementError::UnauthorizedKeyRequest
                }
                other => other,
            })?;
        match reply {
            PeerMessage::KeyReleased { encoded_key } => {
                ctx.checkpoint(flow_id, FlowStage::Done).await?;
                Ok(encoded_key)
            }
            other => Err(SettlementError::Protocol(format!(
                "expected key_released, got {}",
                other.tag()
            ))),
        }
    }
}
