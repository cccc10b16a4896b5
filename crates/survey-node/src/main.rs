//! Demo run: one oracle and three principals walk a survey through its
//! full lifecycle: request, issuance, resale, key release.

use anyhow::Result;
use std::sync::Arc;
use survey_node::adapters::{InMemorySequencer, LoopbackHub};
use survey_node::{Node, NodeConfig, OracleHost};
use survey_settlement::ports::inbound::IssueParams;
use survey_types::{Keypair, StateKind};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = NodeConfig::from_env();
    let hub = LoopbackHub::new();
    let sequencer = Arc::new(InMemorySequencer::new(Keypair::from_seed([0xACu8; 32])));

    let oracle = OracleHost::start(&hub, Keypair::from_seed([0xEEu8; 32]), sequencer.party());
    let named = |name: &str| NodeConfig {
        display_name: name.to_string(),
        ..config.clone()
    };
    let alice = Node::start(
        &hub,
        sequencer.clone(),
        Keypair::from_seed([1u8; 32]),
        oracle.party(),
        &named("alice"),
    );
    let steve = Node::start(
        &hub,
        sequencer.clone(),
        Keypair::from_seed([2u8; 32]),
        oracle.party(),
        &named("steve"),
    );
    let bob = Node::start(
        &hub,
        sequencer.clone(),
        Keypair::from_seed([3u8; 32]),
        oracle.party(),
        &named("bob"),
    );

    alice.deposit_cash(1000);
    bob.deposit_cash(1000);
    info!("marketplace online: alice requests, steve surveys, bob buys");

    // Alice pays Steve 1000 up front for a survey of L1.
    let txid = alice
        .api()
        .submit_request(steve.party(), "L1".to_string(), 1000)
        .await?;
    info!(%txid, "survey request committed");

    // Steve fulfils the request with a sealed report.
    let request_id = steve.unconsumed(StateKind::SurveyRequest).await[0]
        .record
        .linear_id();
    let txid = steve
        .api()
        .issue(IssueParams {
            request_id,
            document: b"sealed survey report for L1".to_vec(),
            encoded_key: "base64:8fD9xK2mQ".to_string(),
            survey_date: "2018-03-14".to_string(),
            property_address: "1 Acacia Avenue".to_string(),
        })
        .await?;
    info!(%txid, "survey issued to alice");

    // Alice resells to Bob; Steve takes his cut of the resale.
    let survey_id = alice.unconsumed(StateKind::Survey).await[0]
        .record
        .linear_id();
    let txid = alice.api().trade(survey_id, bob.party()).await?;
    info!(%txid, "survey traded to bob");

    // Bob, now the committed owner, retrieves the decryption key.
    let key = bob.api().request_key(survey_id).await?;
    info!(%key, "oracle released the key to bob");

    info!(
        alice = alice.cash_balance().await,
        steve = steve.cash_balance().await,
        bob = bob.cash_balance().await,
        "final balances"
    );

    alice.shutdown();
    steve.shutdown();
    bob.shutdown();
    oracle.shutdown();
    Ok(())
}
