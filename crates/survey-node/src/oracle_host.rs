//! The oracle principal: serves key escrow over peer sessions, backed by
//! its own view of committed ledger state.

use crate::adapters::{LoopbackHub, MemoryStateStore};
use async_trait::async_trait;
use std::sync::Arc;
use survey_oracle::{LedgerView, Oracle, OracleError};
use survey_settlement::ports::outbound::{PeerSession, StateStore};
use survey_settlement::PeerMessage;
use survey_types::{Keypair, LinearId, PartyId, StateKind, SurveyState};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Ledger view over the store the oracle fills from committed notices.
struct StoreLedgerView {
    store: Arc<MemoryStateStore>,
}

#[async_trait]
impl LedgerView for StoreLedgerView {
    async fn current_survey(&self, linear_id: LinearId) -> Result<Option<SurveyState>, OracleError> {
        let entry = self
            .store
            .find_by_logical_id(StateKind::Survey, linear_id)
            .await
            .map_err(|err| OracleError::LedgerUnavailable(err.to_string()))?;
        Ok(entry.and_then(|e| e.record.as_survey().cloned()))
    }
}

pub struct OracleHost {
    identity: Arc<Keypair>,
    task: JoinHandle<()>,
}

impl OracleHost {
    /// Bring the oracle online under `identity`. The oracle only believes
    /// committed notices attested by `sequencer`.
    pub fn start(hub: &Arc<LoopbackHub>, identity: Keypair, sequencer: PartyId) -> Self {
        let identity = Arc::new(identity);
        let store = Arc::new(MemoryStateStore::new());
        let oracle = Arc::new(Oracle::new(StoreLedgerView {
            store: store.clone(),
        }));
        let mut inbox = hub.register(identity.party_id());

        let task = tokio::spawn(async move {
            info!("oracle serving escrow sessions");
            while let Some(mut incoming) = inbox.recv().await {
                let oracle = oracle.clone();
                let store = store.clone();
                tokio::spawn(async move {
                    let caller = incoming.caller;
                    let outcome =
                        Self::serve(oracle.as_ref(), &store, sequencer, caller, &mut incoming.session)
                            .await;
                    if let Err(err) = outcome {
                        warn!(caller = %caller, %err, "oracle session failed");
                    }
                });
            }
        });

        Self { identity, task }
    }

    pub fn party(&self) -> PartyId {
        self.identity.party_id()
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }

    async fn serve(
        oracle: &Oracle<StoreLedgerView>,
        store: &MemoryStateStore,
        sequencer: PartyId,
        caller: PartyId,
        session: &mut dyn PeerSession,
    ) -> Result<(), survey_settlement::ports::outbound::TransportError> {
        let msg = session.receive().await?;
        let reply = match msg {
            PeerMessage::RegisterKey {
                content_hash,
                encoded_key,
            } => match oracle.register(content_hash, &encoded_key) {
                Ok(()) => PeerMessage::KeyRegistered,
                Err(err) => PeerMessage::Refused {
                    reason: err.to_string(),
                },
            },
            PeerMessage::KeyRequest { survey } => match oracle.authorize(&survey, caller).await {
                Ok(encoded_key) => PeerMessage::KeyReleased { encoded_key },
                Err(err) => PeerMessage::Refused {
                    reason: err.to_string(),
                },
            },
            // Committed copies keep the oracle's ledger view current. A
            // notice nobody but the sender vouches for is worthless: the
            // receipt must carry the sequencer's attestation, or a peer
            // could plant a survey record naming itself as owner and walk
            // away with the escrowed key.
            PeerMessage::CommittedNotice(committed) => {
                if let Err(err) = survey_settlement::verify_committed_notice(&committed, sequencer) {
                    warn!(caller = %caller, %err, "refusing unattested committed notice");
                    PeerMessage::Refused {
                        reason: err.to_string(),
                    }
                } else if let Err(err) = store.persist(&committed).await {
                    PeerMessage::Refused {
                        reason: err.to_string(),
                    }
                } else {
                    PeerMessage::Ack
                }
            }
            other => PeerMessage::Refused {
                reason: format!("oracle does not serve {}", other.tag()),
            },
        };
        session.send(reply).await
    }
}
