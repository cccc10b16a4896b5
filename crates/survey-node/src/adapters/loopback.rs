//! In-process peer transport.
//!
//! A hub routes sessions between registered parties over paired channels.
//! Frames cross the hub bincode-encoded, so a message that cannot survive
//! serialization fails here and not in a future wire transport. The hub
//! attaches the opener's identity to each incoming session; within one
//! process that attribution is trustworthy by construction.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use survey_settlement::ports::outbound::{PeerNetwork, PeerSession, TransportError};
use survey_settlement::PeerMessage;
use survey_types::PartyId;
use tokio::sync::mpsc;

/// One session offered to a registered party.
pub struct Incoming {
    pub caller: PartyId,
    pub session: LoopbackSession,
}

/// Shared routing table: party id → inbox of incoming sessions.
#[derive(Default)]
pub struct LoopbackHub {
    inboxes: Mutex<HashMap<PartyId, mpsc::UnboundedSender<Incoming>>>,
}

impl LoopbackHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a party and take its inbox of incoming sessions.
    pub fn register(&self, party: PartyId) -> mpsc::UnboundedReceiver<Incoming> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inboxes.lock().unwrap().insert(party, tx);
        rx
    }

    /// The network endpoint through which `me` opens outbound sessions.
    pub fn endpoint(self: &Arc<Self>, me: PartyId) -> LoopbackNetwork {
        LoopbackNetwork {
            me,
            hub: Arc::clone(self),
        }
    }
}

/// One party's handle on the hub.
pub struct LoopbackNetwork {
    me: PartyId,
    hub: Arc<LoopbackHub>,
}

#[async_trait]
impl PeerNetwork for LoopbackNetwork {
    async fn open(&self, peer: PartyId) -> Result<Box<dyn PeerSession>, TransportError> {
        let inbox = self
            .hub
            .inboxes
            .lock()
            .unwrap()
            .get(&peer)
            .cloned()
            .ok_or_else(|| TransportError(format!("no route to {peer}")))?;

        let (to_peer, from_caller) = mpsc::unbounded_channel();
        let (to_caller, from_peer) = mpsc::unbounded_channel();
        inbox
            .send(Incoming {
                caller: self.me,
                session: LoopbackSession {
                    tx: to_caller,
                    rx: from_caller,
                },
            })
            .map_err(|_| TransportError(format!("{peer} is not accepting sessions")))?;

        Ok(Box::new(LoopbackSession {
            tx: to_peer,
            rx: from_peer,
        }))
    }
}

/// One end of a paired session. Frames are bincode-encoded.
pub struct LoopbackSession {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait]
impl PeerSession for LoopbackSession {
    async fn send(&mut self, msg: PeerMessage) -> Result<(), TransportError> {
        let frame = bincode::serialize(&msg)
            .map_err(|err| TransportError(format!("encode failed: {err}")))?;
        self.tx
            .send(frame)
            .map_err(|_| TransportError("peer hung up".into()))
    }

    async fn receive(&mut self) -> Result<PeerMessage, TransportError> {
        let frame = self
            .rx
            .recv()
            .await
            .ok_or_else(|| TransportError("session closed".into()))?;
        bincode::deserialize(&frame).map_err(|err| TransportError(format!("decode failed: {err}")))
    }
}
