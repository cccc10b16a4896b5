//! Sell a survey (and its paired key record) to a buyer at the listed
//! resale price.
//!
//! The seller only proposes: the buyer completes the candidate with its
//! own payment inputs and signs first, the seller verifies the completed
//! candidate consumes exactly what was proposed, and the issuer
//! countersigns for its cut.

use crate::checkpoint::{FlowId, FlowStage};
use crate::context::FlowContext;
use crate::errors::SettlementError;
use crate::flows::support;
use crate::messages::PeerMessage;
use survey_types::{LinearId, PartyId, StateEntry, StateKind, TxId};
use tracing::info;

pub struct TradeFlow;

impl TradeFlow {
    /// Transfer the survey with this logical id to `buyer` against payment
    /// of its listed resale price, split between seller and issuer.
    pub async fn run(
        ctx: &FlowContext,
        survey_id: LinearId,
        buyer: PartyId,
    ) -> Result<TxId, SettlementError> {
        let flow_id = FlowId::fresh();
        info!(flow = %flow_id, survey = %survey_id, buyer = %buyer, "trading survey");
        match Self::execute(ctx, flow_id, survey_id, buyer).await {
            Ok(txid) => Ok(txid),
            Err(err) => Err(support::abort(ctx, flow_id, err).await),
        }
    }

    async fn execute(
        ctx: &FlowContext,
        flow_id: FlowId,
        survey_id: LinearId,
        buyer: PartyId,
    ) -> Result<TxId, SettlementError> {
        ctx.checkpoint(flow_id, FlowStage::Building).await?;
        let survey_entry = ctx
            .store
            .find_by_logical_id(StateKind::Survey, survey_id)
            .await?
            .ok_or(SettlementError::NotFound(survey_id))?;
        let survey = survey_entry
            .record
            .as_survey()
            .cloned()
            .ok_or(SettlementError::NotFound(survey_id))?;
        if survey.owner != ctx.party() {
            return Err(SettlementError::Protocol(
                "only the current owner can sell a survey".into(),
            ));
        }
        let key_entry = Self::paired_key(ctx, &survey_entry).await?;

        // The buyer funds the candidate and signs it first.
        let mut session = ctx.network.open(buyer).await?;
        let reply = ctx
            .exchange(
                session.as_mut(),
                buyer,
                PeerMessage::TradeProposal {
                    survey: survey_entry.clone(),
                    key: key_entry.clone(),
                },
                ctx.config.exchange_timeout,
            )
            .await?;
        let stx = match reply {
            PeerMessage::TradeCandidate(stx) => stx,
            other => {
                return Err(SettlementError::Protocol(format!(
                    "expected trade_candidate, got {}",
                    other.tag()
                )))
            }
        };

        // The buyer controls the candidate body, so check it settles the
        // trade that was proposed before co-signing it.
        if !stx.transaction.inputs.contains(&survey_entry)
            || !stx.transaction.inputs.contains(&key_entry)
        {
            return Err(SettlementError::Protocol(
                "trade candidate does not consume the proposed survey and key".into(),
            ));
        }
        let new_owner = stx
            .transaction
            .outputs_of(|r| r.as_survey())
            .first()
            .map(|s| s.owner);
        if new_owner != Some(buyer) {
            return Err(SettlementError::Protocol(
                "trade candidate does not transfer to the proposed buyer".into(),
            ));
        }
        stx.verify_signatures()?;

        ctx.checkpoint(flow_id, FlowStage::Validating).await?;
        survey_validation::validate(&stx.transaction)?;

        ctx.checkpoint(flow_id, FlowStage::Signing).await?;
        let mut stx = stx;
        stx.sign_with(&ctx.identity)?;

        let committed = support::collect_commit_distribute(ctx, flow_id, stx).await?;
        Ok(committed.id())
    }

    /// The key record escrowed for this survey, matched by content hash.
    async fn paired_key(
        ctx: &FlowContext,
        survey_entry: &StateEntry,
    ) -> Result<StateEntry, SettlementError> {
        let survey = survey_entry
            .record
            .as_survey()
            .ok_or_else(|| SettlementError::Protocol("not a survey entry".into()))?;
        ctx.store
            .current_unconsumed(StateKind::SurveyKey)
            .await?
            .into_iter()
            .find(|e| {
                e.record
                    .as_survey_key()
                    .is_some_and(|k| k.content_hash == survey.content_hash)
            })
            .ok_or(SettlementError::NotFound(survey.linear_id))
    }
}
