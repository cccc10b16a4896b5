//! In-memory marketplace for flow tests: per-party stores, a shared
//! sequencer, and a loopback network that routes each session straight
//! into the peer's responder.

use crate::checkpoint::{FlowId, FlowStage};
use crate::config::SettlementConfig;
use crate::context::FlowContext;
use crate::messages::PeerMessage;
use crate::ports::outbound::{
    CheckpointStore, DocumentStore, PeerNetwork, PeerSession, Sequencer, SequencerError,
    StateStore, StoreError, TransportError,
};
use crate::responder::Responder;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use survey_types::{
    Amount, CashState, CommitReceipt, CommittedTransaction, ContentHash, Keypair, LinearId,
    PartyId, SignedTransaction, StateEntry, StateKind, StateRef, StateRecord, TxId,
};

pub(crate) fn keypair(tag: u8) -> Keypair {
    Keypair::from_seed([tag; 32])
}

// ============================================================
// In-memory port adapters
// ============================================================

#[derive(Default)]
pub(crate) struct MemoryStore {
    unconsumed: Mutex<HashMap<StateRef, StateRecord>>,
}

impl MemoryStore {
    /// Make a record available under a fresh synthetic reference.
    pub(crate) fn seed(&self, record: StateRecord) -> StateEntry {
        let entry = StateEntry {
            ref_: StateRef {
                txid: TxId(rand::random()),
                index: 0,
            },
            record,
        };
        self.unconsumed
            .lock()
            .unwrap()
            .insert(entry.ref_, entry.record.clone());
        entry
    }

    /// Make a copy of `entry`'s record current under a different
    /// reference, as if a later transaction had superseded it.
    pub(crate) fn seed_same_lineage(&self, entry: &StateEntry) {
        self.seed(entry.record.clone());
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn find_by_logical_id(
        &self,
        kind: StateKind,
        id: LinearId,
    ) -> Result<Option<StateEntry>, StoreError> {
        Ok(self
            .unconsumed
            .lock()
            .unwrap()
            .iter()
            .find(|(_, record)| record.kind() == kind && record.linear_id() == id)
            .map(|(ref_, record)| StateEntry {
                ref_: *ref_,
                record: record.clone(),
            }))
    }

    async fn current_unconsumed(&self, kind: StateKind) -> Result<Vec<StateEntry>, StoreError> {
        Ok(self
            .unconsumed
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, record)| record.kind() == kind)
            .map(|(ref_, record)| StateEntry {
                ref_: *ref_,
                record: record.clone(),
            })
            .collect())
    }

    async fn persist(&self, committed: &CommittedTransaction) -> Result<(), StoreError> {
        let mut unconsumed = self.unconsumed.lock().unwrap();
        for input in &committed.tx.transaction.inputs {
            unconsumed.remove(&input.ref_);
        }
        for entry in committed.produced_entries() {
            unconsumed.insert(entry.ref_, entry.record);
        }
        Ok(())
    }
}

/// First submission to claim an input wins; later claims conflict.
pub(crate) struct MemorySequencer {
    identity: Keypair,
    inner: Mutex<(HashSet<StateRef>, u64)>,
}

impl MemorySequencer {
    fn new(identity: Keypair) -> Self {
        Self {
            identity,
            inner: Mutex::default(),
        }
    }
}

#[async_trait]
impl Sequencer for MemorySequencer {
    async fn submit(&self, tx: &SignedTransaction) -> Result<CommitReceipt, SequencerError> {
        tx.require_fully_signed()
            .map_err(|err| SequencerError::RejectedSignatures(err.to_string()))?;
        let mut inner = self.inner.lock().unwrap();
        let (consumed, sequence) = &mut *inner;
        for input in &tx.transaction.inputs {
            if consumed.contains(&input.ref_) {
                return Err(SequencerError::Conflict(input.ref_));
            }
        }
        for input in &tx.transaction.inputs {
            consumed.insert(input.ref_);
        }
        *sequence += 1;
        Ok(CommitReceipt::attest(
            tx.id(),
            *sequence,
            0,
            &self.identity,
        ))
    }

    fn party(&self) -> PartyId {
        self.identity.party_id()
    }
}

#[derive(Default)]
pub(crate) struct MemoryCheckpoints {
    stages: Mutex<HashMap<FlowId, FlowStage>>,
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoints {
    async fn save(&self, flow_id: FlowId, stage: FlowStage) -> Result<(), StoreError> {
        self.stages.lock().unwrap().insert(flow_id, stage);
        Ok(())
    }

    async fn load(&self, flow_id: FlowId) -> Result<Option<FlowStage>, StoreError> {
        Ok(self.stages.lock().unwrap().get(&flow_id).copied())
    }
}

#[derive(Default)]
pub(crate) struct MemoryDocs {
    blobs: Mutex<HashMap<ContentHash, Vec<u8>>>,
}

#[async_trait]
impl DocumentStore for MemoryDocs {
    async fn open(&self, hash: ContentHash) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .lock()
            .unwrap()
            .get(&hash)
            .cloned()
            .ok_or_else(|| StoreError(format!("no document {hash}")))
    }

    async fn import(&self, bytes: Vec<u8>) -> Result<ContentHash, StoreError> {
        let hash = ContentHash::of(&bytes);
        self.blobs.lock().unwrap().insert(hash, bytes);
        Ok(hash)
    }
}

// ============================================================
// Loopback network
// ============================================================

/// Computes the peer's reply to one request; `None` never answers.
#[async_trait]
trait Brain: Send + Sync {
    async fn reply(&self, msg: PeerMessage) -> Option<PeerMessage>;
}

struct ResponderBrain(Responder);

#[async_trait]
impl Brain for ResponderBrain {
    async fn reply(&self, msg: PeerMessage) -> Option<PeerMessage> {
        Some(self.0.respond(msg).await)
    }
}

struct SilentBrain;

#[async_trait]
impl Brain for SilentBrain {
    async fn reply(&self, _msg: PeerMessage) -> Option<PeerMessage> {
        None
    }
}

struct RefusingBrain(String);

#[async_trait]
impl Brain for RefusingBrain {
    async fn reply(&self, _msg: PeerMessage) -> Option<PeerMessage> {
        Some(PeerMessage::Refused {
            reason: self.0.clone(),
        })
    }
}

/// A minimal escrow: stores keys by hash, releases unconditionally.
/// Ownership checks belong to the real oracle service, not this stub.
#[derive(Default)]
struct OracleBrain {
    keys: Mutex<HashMap<ContentHash, String>>,
}

#[async_trait]
impl Brain for OracleBrain {
    async fn reply(&self, msg: PeerMessage) -> Option<PeerMessage> {
        Some(match msg {
            PeerMessage::RegisterKey {
                content_hash,
                encoded_key,
            } => {
                let mut keys = self.keys.lock().unwrap();
                match keys.get(&content_hash) {
                    Some(existing) if *existing != encoded_key => PeerMessage::Refused {
                        reason: "conflicting registration".into(),
                    },
                    _ => {
                        keys.insert(content_hash, encoded_key);
                        PeerMessage::KeyRegistered
                    }
                }
            }
            PeerMessage::KeyRequest { survey } => {
                match self.keys.lock().unwrap().get(&survey.content_hash) {
                    Some(key) => PeerMessage::KeyReleased {
                        encoded_key: key.clone(),
                    },
                    None => PeerMessage::Refused {
                        reason: "no key registered".into(),
                    },
                }
            }
            PeerMessage::CommittedNotice(_) => PeerMessage::Ack,
            _ => PeerMessage::Refused {
                reason: "unsupported request".into(),
            },
        })
    }
}

#[derive(Default)]
struct BrainNetwork {
    brains: Mutex<HashMap<PartyId, Arc<dyn Brain>>>,
}

struct BrainSession {
    brain: Arc<dyn Brain>,
    queued: Option<PeerMessage>,
}

#[async_trait]
impl PeerSession for BrainSession {
    async fn send(&mut self, msg: PeerMessage) -> Result<(), TransportError> {
        self.queued = self.brain.reply(msg).await;
        Ok(())
    }

    async fn receive(&mut self) -> Result<PeerMessage, TransportError> {
        match self.queued.take() {
            Some(msg) => Ok(msg),
            None => {
                // Outlive any test timeout.
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(TransportError("session went silent".into()))
            }
        }
    }
}

#[async_trait]
impl PeerNetwork for BrainNetwork {
    async fn open(&self, peer: PartyId) -> Result<Box<dyn PeerSession>, TransportError> {
        let brain = self
            .brains
            .lock()
            .unwrap()
            .get(&peer)
            .cloned()
            .ok_or_else(|| TransportError(format!("no route to {peer}")))?;
        Ok(Box::new(BrainSession {
            brain,
            queued: None,
        }))
    }
}

// ============================================================
// Marketplace
// ============================================================

pub(crate) struct TestParty {
    pub keypair: Arc<Keypair>,
    pub ctx: FlowContext,
    pub store: Arc<MemoryStore>,
}

impl TestParty {
    pub fn party(&self) -> PartyId {
        self.keypair.party_id()
    }

    pub async fn unconsumed(&self, kind: StateKind) -> Vec<StateEntry> {
        self.store.current_unconsumed(kind).await.unwrap()
    }
}

pub(crate) struct Marketplace {
    network: Arc<BrainNetwork>,
    sequencer: Arc<MemorySequencer>,
    sequencer_keypair: Keypair,
    oracle_keypair: Keypair,
}

impl Marketplace {
    pub fn new() -> Self {
        Self {
            network: Arc::new(BrainNetwork::default()),
            sequencer: Arc::new(MemorySequencer::new(keypair(0xAC))),
            sequencer_keypair: keypair(0xAC),
            oracle_keypair: keypair(0xEE),
        }
    }

    /// A receipt attested the way the marketplace sequencer attests.
    pub fn attest(&self, stx: &SignedTransaction, sequence: u64) -> CommitReceipt {
        CommitReceipt::attest(stx.id(), sequence, 0, &self.sequencer_keypair)
    }

    fn context_for(&self, identity: Arc<Keypair>) -> (FlowContext, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let ctx = FlowContext {
            identity,
            oracle: self.oracle_keypair.party_id(),
            store: store.clone(),
            sequencer: self.sequencer.clone(),
            network: self.network.clone(),
            documents: Arc::new(MemoryDocs::default()),
            checkpoints: Arc::new(MemoryCheckpoints::default()),
            config: SettlementConfig::default(),
        };
        (ctx, store)
    }

    /// A party that runs the real responder over its own store.
    pub fn add_party(&mut self, tag: u8) -> TestParty {
        let identity = Arc::new(keypair(tag));
        let (ctx, store) = self.context_for(identity.clone());
        self.network.brains.lock().unwrap().insert(
            identity.party_id(),
            Arc::new(ResponderBrain(Responder::new(ctx.clone()))),
        );
        TestParty {
            keypair: identity,
            ctx,
            store,
        }
    }

    /// A party that never answers.
    pub fn add_silent_party(&mut self, tag: u8) -> PartyId {
        let id = keypair(tag).party_id();
        self.network
            .brains
            .lock()
            .unwrap()
            .insert(id, Arc::new(SilentBrain));
        id
    }

    /// A party that refuses everything.
    pub fn add_refusing_party(&mut self, tag: u8, reason: &str) -> PartyId {
        let id = keypair(tag).party_id();
        self.network
            .brains
            .lock()
            .unwrap()
            .insert(id, Arc::new(RefusingBrain(reason.into())));
        id
    }

    /// Bring the escrow stub online under the marketplace's oracle
    /// identity.
    pub fn add_oracle(&mut self) {
        self.network.brains.lock().unwrap().insert(
            self.oracle_keypair.party_id(),
            Arc::new(OracleBrain::default()),
        );
    }

    /// Seed a spendable coin into the party's store.
    pub fn fund(&self, party: &TestParty, amount: Amount) {
        party.store.seed(StateRecord::Cash(CashState {
            owner: party.party(),
            amount,
            linear_id: LinearId::fresh(),
        }));
    }
}
