//! One marketplace principal: identity, adapters, settlement engine, and
//! the responder task serving incoming sessions.

use crate::adapters::{
    LoopbackHub, MemoryCheckpointStore, MemoryDocumentStore, MemoryStateStore,
};
use crate::config::NodeConfig;
use std::sync::Arc;
use survey_settlement::ports::inbound::SettlementApi;
use survey_settlement::ports::outbound::{Sequencer, StateStore};
use survey_settlement::{FlowContext, Responder, SettlementService};
use survey_types::{
    Amount, CashState, Keypair, LinearId, PartyId, StateEntry, StateKind, StateRecord,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct Node {
    identity: Arc<Keypair>,
    store: Arc<MemoryStateStore>,
    service: Arc<SettlementService>,
    responder_task: JoinHandle<()>,
}

impl Node {
    /// Wire a principal into the marketplace and start serving incoming
    /// sessions.
    pub fn start(
        hub: &Arc<LoopbackHub>,
        sequencer: Arc<dyn Sequencer>,
        identity: Keypair,
        oracle: PartyId,
        config: &NodeConfig,
    ) -> Self {
        let identity = Arc::new(identity);
        let store = Arc::new(MemoryStateStore::new());
        let ctx = FlowContext {
            identity: identity.clone(),
            oracle,
            store: store.clone(),
            sequencer,
            network: Arc::new(hub.endpoint(identity.party_id())),
            documents: Arc::new(MemoryDocumentStore::new()),
            checkpoints: Arc::new(MemoryCheckpointStore::new()),
            config: config.settlement(),
        };

        let responder = Arc::new(Responder::new(ctx.clone()));
        let mut inbox = hub.register(identity.party_id());
        let name = config.display_name.clone();
        let responder_task = tokio::spawn(async move {
            info!(node = %name, "serving peer sessions");
            while let Some(mut incoming) = inbox.recv().await {
                let responder = responder.clone();
                let name = name.clone();
                tokio::spawn(async move {
                    if let Err(err) = responder.handle(&mut incoming.session).await {
                        warn!(node = %name, caller = %incoming.caller, %err, "session failed");
                    }
                });
            }
        });

        Self {
            identity,
            store,
            service: Arc::new(SettlementService::new(ctx)),
            responder_task,
        }
    }

    pub fn party(&self) -> PartyId {
        self.identity.party_id()
    }

    /// The operations this node's operator can drive.
    pub fn api(&self) -> Arc<dyn SettlementApi> {
        self.service.clone()
    }

    /// Receive external cash into this node's store.
    pub fn deposit_cash(&self, amount: Amount) -> StateEntry {
        self.store.deposit(StateRecord::Cash(CashState {
            owner: self.party(),
            amount,
            linear_id: LinearId::fresh(),
        }))
    }

    /// This node's unconsumed records of one kind.
    pub async fn unconsumed(&self, kind: StateKind) -> Vec<StateEntry> {
        self.store.current_unconsumed(kind).await.unwrap_or_default()
    }

    /// Total unconsumed cash owned by this node.
    pub async fn cash_balance(&self) -> Amount {
        self.unconsumed(StateKind::Cash)
            .await
            .iter()
            .filter_map(|e| e.record.as_cash())
            .filter(|c| c.owner == self.party())
            .map(|c| c.amount)
            .sum()
    }

    pub fn store(&self) -> &Arc<MemoryStateStore> {
        &self.store
    }

    /// Stop serving incoming sessions.
    pub fn shutdown(&self) {
        self.responder_task.abort();
    }
}
