//! Shared marketplace wiring: one oracle, one sequencer, one hub, and as
//! many principals as a scenario needs.

use std::sync::Arc;
use survey_node::adapters::{InMemorySequencer, LoopbackHub};
use survey_node::{Node, NodeConfig, OracleHost};
use survey_settlement::ports::inbound::IssueParams;
use survey_types::{Keypair, LinearId, StateKind};

pub struct Market {
    pub hub: Arc<LoopbackHub>,
    pub sequencer: Arc<InMemorySequencer>,
    pub oracle: OracleHost,
}

impl Market {
    pub fn new() -> Self {
        let hub = LoopbackHub::new();
        let sequencer = Arc::new(InMemorySequencer::new(Keypair::from_seed([0xACu8; 32])));
        let oracle = OracleHost::start(&hub, Keypair::from_seed([0xEEu8; 32]), sequencer.party());
        Self {
            hub,
            sequencer,
            oracle,
        }
    }

    /// Start a principal with a deterministic identity.
    pub fn node(&self, tag: u8, name: &str) -> Node {
        let config = NodeConfig {
            display_name: name.to_string(),
            ..NodeConfig::default()
        };
        Node::start(
            &self.hub,
            self.sequencer.clone(),
            Keypair::from_seed([tag; 32]),
            self.oracle.party(),
            &config,
        )
    }

    /// The deterministic keypair behind a principal started with `tag`.
    pub fn keypair(tag: u8) -> Keypair {
        Keypair::from_seed([tag; 32])
    }
}

pub const PRICE: u64 = 1000;
pub const DOCUMENT: &[u8] = b"sealed survey report for L1";
pub const ENCODED_KEY: &str = "base64:8fD9xK2mQ";

/// Run request + issue so `requester` ends up owning a freshly issued
/// survey of L1; returns its logical id.
pub async fn issue_survey_to(requester: &Node, surveyor: &Node) -> LinearId {
    requester.deposit_cash(PRICE);
    requester
        .api()
        .submit_request(surveyor.party(), "L1".to_string(), PRICE)
        .await
        .expect("request should settle");

    let request_id = surveyor.unconsumed(StateKind::SurveyRequest).await[0]
        .record
        .linear_id();
    surveyor
        .api()
        .issue(IssueParams {
            request_id,
            document: DOCUMENT.to_vec(),
            encoded_key: ENCODED_KEY.to_string(),
            survey_date: "2018-03-14".to_string(),
            property_address: "1 Acacia Avenue".to_string(),
        })
        .await
        .expect("issue should settle");

    requester.unconsumed(StateKind::Survey).await[0]
        .record
        .linear_id()
}
