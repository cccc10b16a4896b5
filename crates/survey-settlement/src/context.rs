//! Shared flow plumbing.
//!
//! A [`FlowContext`] bundles this node's identity with its outbound ports
//! and carries the helpers every flow needs: timeout-wrapped round trips,
//! checkpointing, exact coin selection, and post-commit distribution.

use crate::checkpoint::{FlowId, FlowStage};
use crate::config::SettlementConfig;
use crate::errors::SettlementError;
use crate::messages::PeerMessage;
use crate::ports::outbound::{
    CheckpointStore, DocumentStore, PeerNetwork, PeerSession, Sequencer, StateStore,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use survey_types::{Amount, CommittedTransaction, Keypair, PartyId, StateEntry, StateKind};
use tracing::{debug, warn};

/// Everything a flow run needs from its node.
#[derive(Clone)]
pub struct FlowContext {
    pub identity: Arc<Keypair>,
    /// The key-escrow oracle this marketplace trusts.
    pub oracle: PartyId,
    pub store: Arc<dyn StateStore>,
    pub sequencer: Arc<dyn Sequencer>,
    pub network: Arc<dyn PeerNetwork>,
    pub documents: Arc<dyn DocumentStore>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub config: SettlementConfig,
}

impl FlowContext {
    pub fn party(&self) -> PartyId {
        self.identity.party_id()
    }

    /// Persist the stage this flow run has reached.
    pub(crate) async fn checkpoint(
        &self,
        flow_id: FlowId,
        stage: FlowStage,
    ) -> Result<(), SettlementError> {
        debug!(flow = %flow_id, ?stage, "flow checkpoint");
        self.checkpoints.save(flow_id, stage).await?;
        Ok(())
    }

    /// One request/response round trip with `peer`, bounded by `window`.
    ///
    /// Expiry maps to [`SettlementError::CounterpartyTimeout`] and an
    /// explicit [`PeerMessage::Refused`] to
    /// [`SettlementError::CounterpartyRefused`]; every other reply is
    /// handed back for the caller to match.
    pub(crate) async fn exchange(
        &self,
        session: &mut dyn PeerSession,
        peer: PartyId,
        msg: PeerMessage,
        window: Duration,
    ) -> Result<PeerMessage, SettlementError> {
        let reply = tokio::time::timeout(window, session.send_and_receive(msg))
            .await
            .map_err(|_| SettlementError::CounterpartyTimeout(peer))??;
        match reply {
            PeerMessage::Refused { reason } => {
                Err(SettlementError::CounterpartyRefused { peer, reason })
            }
            other => Ok(other),
        }
    }

    /// Select unconsumed cash owned by this node summing to exactly
    /// `required`.
    ///
    /// A command's produced cash is fixed by its price terms, so there is
    /// no room for a change output: the selection must hit the amount
    /// exactly or fail as [`SettlementError::FundingUnavailable`]. Exact
    /// subset search over descending amounts; a greedy pass would miss
    /// feasible selections such as 5+5 out of {6, 5, 5} for 10.
    pub(crate) async fn select_exact_cash(
        &self,
        required: Amount,
    ) -> Result<Vec<StateEntry>, SettlementError> {
        let me = self.party();
        let mut coins: Vec<StateEntry> = self
            .store
            .current_unconsumed(StateKind::Cash)
            .await?
            .into_iter()
            .filter(|e| e.record.as_cash().is_some_and(|c| c.owner == me))
            .collect();
        coins.sort_by_key(|e| std::cmp::Reverse(e.record.as_cash().map_or(0, |c| c.amount)));

        let amounts: Vec<Amount> = coins
            .iter()
            .map(|e| e.record.as_cash().map_or(0, |c| c.amount))
            .collect();
        // remaining[i] = amounts[i..] summed, in u128 so no coin set wraps.
        let mut remaining = vec![0u128; amounts.len() + 1];
        for i in (0..amounts.len()).rev() {
            remaining[i] = remaining[i + 1] + u128::from(amounts[i]);
        }

        let mut picked = Vec::new();
        let mut dead = HashSet::new();
        if exact_subset(&amounts, &remaining, required, 0, &mut picked, &mut dead) {
            return Ok(picked.into_iter().map(|i| coins[i].clone()).collect());
        }
        Err(SettlementError::FundingUnavailable { required })
    }

    /// Send every participant (other than this node) its committed copy.
    ///
    /// Runs after the commit point, so failures here are logged and
    /// swallowed: the transaction stands regardless, and a participant
    /// that missed its copy can be re-notified out of band.
    pub(crate) async fn distribute(&self, committed: &CommittedTransaction) {
        let me = self.party();
        let mut recipients = committed.participants();
        recipients.remove(&me);
        // The oracle observes every committed survey version so its
        // ownership answers track the ledger.
        let touches_survey = committed
            .tx
            .transaction
            .outputs
            .iter()
            .any(|o| o.kind() == StateKind::Survey);
        if touches_survey {
            recipients.insert(self.oracle);
        }

        for peer in recipients {
            let notice = PeerMessage::CommittedNotice(committed.clone());
            let outcome = async {
                let mut session = self.network.open(peer).await?;
                tokio::time::timeout(self.config.notify_timeout, async {
                    session.send_and_receive(notice).await
                })
                .await
                .map_err(|_| crate::ports::outbound::TransportError("notify timed out".into()))?
            }
            .await;
            match outcome {
                Ok(PeerMessage::Ack) => {}
                Ok(other) => {
                    warn!(peer = %peer, reply = other.tag(), "unexpected reply to committed notice")
                }
                Err(err) => warn!(peer = %peer, %err, "failed to deliver committed notice"),
            }
        }
    }
}

/// Depth-first search for a subset of the descending `amounts` summing to
/// exactly `needed`. `remaining` holds suffix sums for pruning; `dead`
/// memoizes (index, needed) pairs already proven unreachable, which bounds
/// the search on pathological coin sets. Indices of the chosen coins end
/// up in `picked`.
fn exact_subset(
    amounts: &[Amount],
    remaining: &[u128],
    needed: Amount,
    index: usize,
    picked: &mut Vec<usize>,
    dead: &mut HashSet<(usize, Amount)>,
) -> bool {
    if needed == 0 {
        return true;
    }
    if index == amounts.len()
        || u128::from(needed) > remaining[index]
        || dead.contains(&(index, needed))
    {
        return false;
    }
    let amount = amounts[index];
    if amount > 0 && amount <= needed {
        picked.push(index);
        if exact_subset(amounts, remaining, needed - amount, index + 1, picked, dead) {
            return true;
        }
        picked.pop();
    }
    if exact_subset(amounts, remaining, needed, index + 1, picked, dead) {
        return true;
    }
    dead.insert((index, needed));
    false
}
