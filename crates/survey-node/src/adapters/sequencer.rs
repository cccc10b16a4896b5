//! The shared commit point.
//!
//! A single total order over accepted transactions with first-commit-wins
//! consumption: once any accepted transaction has claimed a state
//! reference, every later submission claiming it is refused. The
//! sequencer checks signatures and consumption only; it never runs
//! domain validation. Every accepted submission gets a receipt signed
//! under the sequencer's own key, so peers can tell a real commitment
//! from a fabricated one.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use survey_settlement::ports::outbound::{Sequencer, SequencerError};
use survey_types::{CommitReceipt, Keypair, PartyId, SignedTransaction, StateRef};
use tracing::info;

pub struct InMemorySequencer {
    identity: Keypair,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    consumed: HashSet<StateRef>,
    next_sequence: u64,
}

impl InMemorySequencer {
    pub fn new(identity: Keypair) -> Self {
        Self {
            identity,
            inner: Mutex::default(),
        }
    }

    pub fn party(&self) -> PartyId {
        self.identity.party_id()
    }
}

#[async_trait]
impl Sequencer for InMemorySequencer {
    async fn submit(&self, tx: &SignedTransaction) -> Result<CommitReceipt, SequencerError> {
        tx.require_fully_signed()
            .map_err(|err| SequencerError::RejectedSignatures(err.to_string()))?;

        // Check and claim under one lock so two submissions racing for the
        // same input cannot both win.
        let mut inner = self.inner.lock().unwrap();
        for input in &tx.transaction.inputs {
            if inner.consumed.contains(&input.ref_) {
                return Err(SequencerError::Conflict(input.ref_));
            }
        }
        for input in &tx.transaction.inputs {
            inner.consumed.insert(input.ref_);
        }
        inner.next_sequence += 1;
        let committed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let receipt = CommitReceipt::attest(tx.id(), inner.next_sequence, committed_at, &self.identity);
        info!(txid = %receipt.txid, sequence = receipt.sequence, "sequenced transaction");
        Ok(receipt)
    }

    fn party(&self) -> PartyId {
        self.identity.party_id()
    }
}
