//! Two buyers, one survey: the sequencer lets exactly one trade settle.

use crate::harness::{self, Market, PRICE};
use survey_settlement::ports::outbound::{Sequencer, SequencerError};
use survey_types::{
    CashState, Command, Keypair, LinearId, SignedTransaction, StateEntry, StateKind, Transaction,
};
use survey_validation::{issuer_share, owner_share};

/// A fully signed trade candidate moving `survey_entry`/`key_entry` to
/// `buyer`, funded by `coin`.
fn signed_trade(
    seller: &Keypair,
    issuer: &Keypair,
    buyer: &Keypair,
    survey_entry: &StateEntry,
    key_entry: &StateEntry,
    coin: &StateEntry,
) -> SignedTransaction {
    let survey = survey_entry.record.as_survey().unwrap().clone();
    let key = key_entry.record.as_survey_key().unwrap().clone();
    let resale = survey.resale_price;

    let tx = Transaction {
        inputs: vec![survey_entry.clone(), key_entry.clone(), coin.clone()],
        outputs: vec![
            survey_types::SurveyState {
                owner: buyer.party_id(),
                ..survey
            }
            .into(),
            survey_types::SurveyKeyState {
                owner: buyer.party_id(),
                ..key
            }
            .into(),
            CashState {
                owner: seller.party_id(),
                amount: owner_share(resale),
                linear_id: LinearId::fresh(),
            }
            .into(),
            CashState {
                owner: issuer.party_id(),
                amount: issuer_share(resale),
                linear_id: LinearId::fresh(),
            }
            .into(),
        ],
        command: Command::Trade,
        signers: [seller.party_id(), issuer.party_id(), buyer.party_id()]
            .into_iter()
            .collect(),
        attachment: None,
    };
    survey_validation::validate(&tx).expect("candidate must be valid");

    let mut stx = SignedTransaction::unsigned(tx);
    stx.sign_with(seller).unwrap();
    stx.sign_with(issuer).unwrap();
    stx.sign_with(buyer).unwrap();
    stx
}

/// Both candidates are individually valid and fully signed; only the
/// first to reach the sequencer settles, and the loser's rejection names
/// the contested input.
#[tokio::test]
async fn test_first_commit_wins_the_contested_survey() {
    let market = Market::new();
    let alice = market.node(1, "alice");
    let steve = market.node(2, "steve");
    let bob = market.node(3, "bob");
    let carol = market.node(4, "carol");

    harness::issue_survey_to(&alice, &steve).await;
    let survey_entry = alice.unconsumed(StateKind::Survey).await[0].clone();
    let key_entry = alice.unconsumed(StateKind::SurveyKey).await[0].clone();
    let bob_coin = bob.deposit_cash(PRICE);
    let carol_coin = carol.deposit_cash(PRICE);

    let seller = Market::keypair(1);
    let issuer = Market::keypair(2);
    let to_bob = signed_trade(
        &seller,
        &issuer,
        &Market::keypair(3),
        &survey_entry,
        &key_entry,
        &bob_coin,
    );
    let to_carol = signed_trade(
        &seller,
        &issuer,
        &Market::keypair(4),
        &survey_entry,
        &key_entry,
        &carol_coin,
    );

    market.sequencer.submit(&to_bob).await.unwrap();
    assert_eq!(
        market.sequencer.submit(&to_carol).await,
        Err(SequencerError::Conflict(survey_entry.ref_))
    );
}

/// The same race through the full flows: exactly one buyer ends up with
/// the survey, and the loser settles nothing.
#[tokio::test]
async fn test_racing_trade_flows_settle_exactly_once() {
    let market = Market::new();
    let alice = market.node(1, "alice");
    let steve = market.node(2, "steve");
    let bob = market.node(3, "bob");
    let carol = market.node(4, "carol");

    let survey_id = harness::issue_survey_to(&alice, &steve).await;
    bob.deposit_cash(PRICE);
    carol.deposit_cash(PRICE);

    let api = alice.api();
    let (to_bob, to_carol) = tokio::join!(
        api.trade(survey_id, bob.party()),
        api.trade(survey_id, carol.party())
    );
    assert!(
        to_bob.is_ok() != to_carol.is_ok(),
        "exactly one trade must settle: {to_bob:?} / {to_carol:?}"
    );

    // The survey landed with exactly one buyer, and the loser's coin is
    // still unconsumed.
    let bob_owns = !bob.unconsumed(StateKind::Survey).await.is_empty();
    let carol_owns = !carol.unconsumed(StateKind::Survey).await.is_empty();
    assert!(bob_owns != carol_owns);
    let loser = if bob_owns { &carol } else { &bob };
    assert_eq!(loser.cash_balance().await, PRICE);

    // Alice was paid her share exactly once.
    assert_eq!(alice.cash_balance().await, owner_share(PRICE));
}
