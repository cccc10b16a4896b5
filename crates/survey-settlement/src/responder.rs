//! The counterparty side of every peer session.
//!
//! A responder never trusts the initiator: countersigning re-runs the full
//! validation engine over the exact state versions the candidate resolves,
//! a trade proposal is answered with a candidate the responder built and
//! funded itself, and a committed notice must carry the sequencer's
//! attestation before it touches the store.

use crate::context::FlowContext;
use crate::errors::SettlementError;
use crate::messages::PeerMessage;
use crate::ports::outbound::{PeerSession, TransportError};
use survey_types::{
    CashState, CommittedTransaction, LinearId, PartyId, PartySignature, SignedTransaction,
    StateEntry, Transaction,
};
use survey_validation::{issuer_share, owner_share};
use tracing::{debug, info, warn};

/// Check a committed notice before it touches any store.
///
/// Anyone can assemble a [`CommittedTransaction`] value; commitment is only
/// believable when the receipt carries the sequencer's signature over this
/// exact transaction. On top of the attestation, every required signer must
/// have signed and the transaction must pass the validation engine, so a
/// notice can never smuggle in states the rules would have rejected.
pub fn verify_committed_notice(
    committed: &CommittedTransaction,
    sequencer: PartyId,
) -> Result<(), SettlementError> {
    committed.verify_attested(sequencer)?;
    survey_validation::validate(&committed.tx.transaction)?;
    Ok(())
}

pub struct Responder {
    ctx: FlowContext,
}

impl Responder {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    /// Serve one session: receive the request, send the reply.
    pub async fn handle(&self, session: &mut dyn PeerSession) -> Result<(), TransportError> {
        let msg = session.receive().await?;
        debug!(request = msg.tag(), "handling peer request");
        let reply = self.respond(msg).await;
        session.send(reply).await
    }

    /// Compute the reply to one peer request. Failures become an explicit
    /// [`PeerMessage::Refused`] so the initiator always learns why.
    pub async fn respond(&self, msg: PeerMessage) -> PeerMessage {
        let outcome = match msg {
            PeerMessage::SignatureRequest(stx) => self.countersign(stx).await,
            PeerMessage::TradeProposal { survey, key } => self.complete_trade(survey, key).await,
            PeerMessage::CommittedNotice(committed) => self.record(committed).await,
            other => Err(SettlementError::Protocol(format!(
                "unsupported request: {}",
                other.tag()
            ))),
        };
        outcome.unwrap_or_else(|err| {
            warn!(%err, "refusing peer request");
            PeerMessage::Refused {
                reason: err.to_string(),
            }
        })
    }

    /// Re-validate a candidate and countersign it.
    async fn countersign(&self, stx: SignedTransaction) -> Result<PeerMessage, SettlementError> {
        let me = self.ctx.party();
        if !stx.transaction.signers.contains(&me) {
            return Err(SettlementError::Protocol(
                "this node is not a required signer".into(),
            ));
        }
        stx.verify_signatures()?;
        self.check_inputs_current(&stx.transaction).await?;
        survey_validation::validate(&stx.transaction)?;

        let txid = stx.id();
        info!(txid = %txid, command = ?stx.transaction.command, "countersigning candidate");
        Ok(PeerMessage::SignatureResponse(PartySignature {
            signer: me,
            signature: self.ctx.identity.sign(&txid.0),
        }))
    }

    /// Refuse a candidate that consumes a state this node knows has been
    /// superseded. Inputs this node has never seen (a buyer's coins, say)
    /// pass through; the sequencer is the final arbiter of consumption.
    async fn check_inputs_current(&self, tx: &Transaction) -> Result<(), SettlementError> {
        for input in &tx.inputs {
            let known = self
                .ctx
                .store
                .find_by_logical_id(input.record.kind(), input.record.linear_id())
                .await?;
            if let Some(current) = known {
                if current.ref_ != input.ref_ {
                    return Err(SettlementError::Protocol(format!(
                        "input {} superseded by {}",
                        input.ref_, current.ref_
                    )));
                }
            }
        }
        Ok(())
    }

    /// Complete a trade proposal: fund it with this node's own cash,
    /// produce the transferred survey and key, and sign first.
    async fn complete_trade(
        &self,
        survey_entry: StateEntry,
        key_entry: StateEntry,
    ) -> Result<PeerMessage, SettlementError> {
        let me = self.ctx.party();
        let survey = survey_entry
            .record
            .as_survey()
            .cloned()
            .ok_or_else(|| SettlementError::Protocol("proposal is not a survey".into()))?;
        let key = key_entry
            .record
            .as_survey_key()
            .cloned()
            .ok_or_else(|| SettlementError::Protocol("proposal key is not a key record".into()))?;
        if key.content_hash != survey.content_hash {
            return Err(SettlementError::Protocol(
                "proposed key does not pair with the survey".into(),
            ));
        }
        if survey.owner == me {
            return Err(SettlementError::Protocol(
                "already the owner of this survey".into(),
            ));
        }

        let resale = survey.resale_price;
        let mut inputs = vec![survey_entry, key_entry];
        inputs.extend(self.ctx.select_exact_cash(resale).await?);

        let seller = survey.owner;
        let issuer = survey.issuer;
        let transferred_survey = survey_types::SurveyState {
            owner: me,
            ..survey.clone()
        };
        let transferred_key = survey_types::SurveyKeyState { owner: me, ..key };
        // The price always splits into two outputs; when the seller is
        // also the issuer both land with the same party.
        let issuer_cut = CashState {
            owner: issuer,
            amount: issuer_share(resale),
            linear_id: LinearId::fresh(),
        };
        let seller_cut = CashState {
            owner: seller,
            amount: owner_share(resale),
            linear_id: LinearId::fresh(),
        };

        let tx = Transaction {
            inputs,
            outputs: vec![
                transferred_survey.into(),
                transferred_key.into(),
                seller_cut.into(),
                issuer_cut.into(),
            ],
            command: survey_types::Command::Trade,
            signers: [seller, issuer, me].into_iter().collect(),
            attachment: None,
        };
        survey_validation::validate(&tx)?;

        let mut stx = SignedTransaction::unsigned(tx);
        stx.sign_with(&self.ctx.identity)?;
        info!(txid = %stx.id(), survey = %survey.linear_id, "funded trade candidate");
        Ok(PeerMessage::TradeCandidate(stx))
    }

    /// Record a committed copy distributed by an initiator.
    async fn record(&self, committed: CommittedTransaction) -> Result<PeerMessage, SettlementError> {
        verify_committed_notice(&committed, self.ctx.sequencer.party())?;
        self.ctx.store.persist(&committed).await?;
        debug!(txid = %committed.id(), "recorded committed transaction");
        Ok(PeerMessage::Ack)
    }
}
