//! The shared back half of every settling flow: countersignature
//! collection, sequencer submission, and distribution.

use crate::checkpoint::{FlowId, FlowStage};
use crate::context::FlowContext;
use crate::errors::SettlementError;
use crate::messages::PeerMessage;
use crate::ports::outbound::SequencerError;
use survey_types::{CommittedTransaction, SignedTransaction};
use tracing::info;

/// Drive a validated, initiator-signed candidate through countersigning,
/// the commit point, and distribution.
pub(crate) async fn collect_commit_distribute(
    ctx: &FlowContext,
    flow_id: FlowId,
    mut stx: SignedTransaction,
) -> Result<CommittedTransaction, SettlementError> {
    ctx.checkpoint(flow_id, FlowStage::CollectingSignatures)
        .await?;
    for peer in stx.missing_signers() {
        let mut session = ctx.network.open(peer).await?;
        let reply = ctx
            .exchange(
                session.as_mut(),
                peer,
                PeerMessage::SignatureRequest(stx.clone()),
                ctx.config.exchange_timeout,
            )
            .await?;
        match reply {
            PeerMessage::SignatureResponse(sig) => stx.merge(sig)?,
            other => {
                return Err(SettlementError::Protocol(format!(
                    "expected signature_response, got {}",
                    other.tag()
                )))
            }
        }
    }
    stx.require_fully_signed()?;

    ctx.checkpoint(flow_id, FlowStage::Submitting).await?;
    let receipt = ctx.sequencer.submit(&stx).await.map_err(|err| match err {
        SequencerError::Conflict(state_ref) => SettlementError::SequencerConflict(state_ref),
        SequencerError::RejectedSignatures(reason) => SettlementError::Protocol(reason),
        SequencerError::Unavailable(reason) => {
            SettlementError::Transport(crate::ports::outbound::TransportError(reason))
        }
    })?;
    let committed = CommittedTransaction { tx: stx, receipt };
    info!(
        txid = %committed.id(),
        sequence = committed.receipt.sequence,
        "transaction committed"
    );

    ctx.checkpoint(flow_id, FlowStage::Finalising).await?;
    ctx.store.persist(&committed).await?;
    ctx.distribute(&committed).await;

    ctx.checkpoint(flow_id, FlowStage::Done).await?;
    Ok(committed)
}

/// Record the aborted stage for a failed run, preserving the original
/// error even if the checkpoint store is also failing.
pub(crate) async fn abort(
    ctx: &FlowContext,
    flow_id: FlowId,
    err: SettlementError,
) -> SettlementError {
    let _ = ctx.checkpoints.save(flow_id, FlowStage::Aborted).await;
    err
}
