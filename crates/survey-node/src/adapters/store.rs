//! One party's view of the ledger: unconsumed states plus the committed
//! transactions it has witnessed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use survey_settlement::ports::outbound::{StateStore, StoreError};
use survey_types::{
    CommittedTransaction, LinearId, StateEntry, StateKind, StateRecord, StateRef, TxId,
};

#[derive(Default)]
pub struct MemoryStateStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    unconsumed: HashMap<StateRef, StateRecord>,
    history: HashMap<TxId, CommittedTransaction>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a record straight into the unconsumed set under a synthetic
    /// reference. This is how external cash enters the marketplace;
    /// everything else arrives through [`StateStore::persist`].
    pub fn deposit(&self, record: StateRecord) -> StateEntry {
        let entry = StateEntry {
            ref_: StateRef {
                txid: TxId(rand::random()),
                index: 0,
            },
            record,
        };
        self.inner
            .lock()
            .unwrap()
            .unconsumed
            .insert(entry.ref_, entry.record.clone());
        entry
    }

    /// The committed transaction this party witnessed under `txid`.
    pub fn witnessed(&self, txid: TxId) -> Option<CommittedTransaction> {
        self.inner.lock().unwrap().history.get(&txid).cloned()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn find_by_logical_id(
        &self,
        kind: StateKind,
        id: LinearId,
    ) -> Result<Option<StateEntry>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .unconsumed
            .iter()
            .find(|(_, record)| record.kind() == kind && record.linear_id() == id)
            .map(|(ref_, record)| StateEntry {
                ref_: *ref_,
                record: record.clone(),
            }))
    }

    async fn current_unconsumed(&self, kind: StateKind) -> Result<Vec<StateEntry>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .unconsumed
            .iter()
            .filter(|(_, record)| record.kind() == kind)
            .map(|(ref_, record)| StateEntry {
                ref_: *ref_,
                record: record.clone(),
            })
            .collect())
    }

    async fn persist(&self, committed: &CommittedTransaction) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.history.contains_key(&committed.id()) {
            return Ok(());
        }
        for input in &committed.tx.transaction.inputs {
            inner.unconsumed.remove(&input.ref_);
        }
        for entry in committed.produced_entries() {
            inner.unconsumed.insert(entry.ref_, entry.record);
        }
        inner.history.insert(committed.id(), committed.clone());
        Ok(())
    }
}
