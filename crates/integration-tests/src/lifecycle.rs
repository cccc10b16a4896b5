//! The full marketplace lifecycle across real nodes.

use crate::harness::{self, Market, DOCUMENT, PRICE};
use survey_types::{ContentHash, RequestStatus, StateKind};
use survey_validation::{issuer_share, owner_share};

#[tokio::test]
async fn test_request_opens_pending_record_and_pays_surveyor() {
    let market = Market::new();
    let alice = market.node(1, "alice");
    let steve = market.node(2, "steve");

    alice.deposit_cash(PRICE);
    alice
        .api()
        .submit_request(steve.party(), "L1".to_string(), PRICE)
        .await
        .unwrap();

    // Both parties hold the same pending record.
    for node in [&alice, &steve] {
        let requests = node.unconsumed(StateKind::SurveyRequest).await;
        let request = requests[0].record.as_survey_request().unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.requester, alice.party());
        assert_eq!(request.surveyor, steve.party());
        assert_eq!(request.price, PRICE);
    }
    // The payment moved up front.
    assert_eq!(alice.cash_balance().await, 0);
    assert_eq!(steve.cash_balance().await, PRICE);
}

#[tokio::test]
async fn test_issue_binds_document_and_closes_request() {
    let market = Market::new();
    let alice = market.node(1, "alice");
    let steve = market.node(2, "steve");

    harness::issue_survey_to(&alice, &steve).await;

    let surveys = alice.unconsumed(StateKind::Survey).await;
    let survey = surveys[0].record.as_survey().unwrap();
    assert_eq!(survey.owner, alice.party());
    assert_eq!(survey.issuer, steve.party());
    assert_eq!(survey.land_title_id, "L1");
    assert_eq!(survey.initial_price, PRICE);
    assert_eq!(survey.resale_price, PRICE);
    // The committed record is bound to the sealed document bytes.
    assert_eq!(survey.content_hash, ContentHash::of(DOCUMENT));

    // The key record pairs with the survey and lands with the owner.
    let keys = alice.unconsumed(StateKind::SurveyKey).await;
    let key = keys[0].record.as_survey_key().unwrap();
    assert_eq!(key.owner, alice.party());
    assert_eq!(key.surveyor, steve.party());
    assert_eq!(key.content_hash, survey.content_hash);

    // The request lineage is closed.
    let requests = alice.unconsumed(StateKind::SurveyRequest).await;
    assert_eq!(
        requests[0].record.as_survey_request().unwrap().status,
        RequestStatus::Complete
    );
}

#[tokio::test]
async fn test_trade_moves_survey_and_splits_the_price() {
    let market = Market::new();
    let alice = market.node(1, "alice");
    let steve = market.node(2, "steve");
    let bob = market.node(3, "bob");

    let survey_id = harness::issue_survey_to(&alice, &steve).await;
    bob.deposit_cash(PRICE);
    alice.api().trade(survey_id, bob.party()).await.unwrap();

    // Survey and key moved to Bob in lock-step, lineage intact.
    let surveys = bob.unconsumed(StateKind::Survey).await;
    let survey = surveys[0].record.as_survey().unwrap();
    assert_eq!(survey.owner, bob.party());
    assert_eq!(survey.linear_id, survey_id);
    let keys = bob.unconsumed(StateKind::SurveyKey).await;
    assert_eq!(keys[0].record.as_survey_key().unwrap().owner, bob.party());

    // 1000 resale price: 800 to Alice, 200 issuer cut to Steve on top of
    // the 1000 he was paid for the original work.
    assert_eq!(owner_share(PRICE), 800);
    assert_eq!(issuer_share(PRICE), 200);
    assert_eq!(alice.cash_balance().await, 800);
    assert_eq!(steve.cash_balance().await, PRICE + 200);
    assert_eq!(bob.cash_balance().await, 0);

    // Alice no longer holds the survey or the key.
    assert!(alice.unconsumed(StateKind::Survey).await.is_empty());
    assert!(alice.unconsumed(StateKind::SurveyKey).await.is_empty());
}

#[tokio::test]
async fn test_full_lifecycle_ends_with_key_release_to_buyer() {
    let market = Market::new();
    let alice = market.node(1, "alice");
    let steve = market.node(2, "steve");
    let bob = market.node(3, "bob");

    let survey_id = harness::issue_survey_to(&alice, &steve).await;
    bob.deposit_cash(PRICE);
    alice.api().trade(survey_id, bob.party()).await.unwrap();

    let key = bob.api().request_key(survey_id).await.unwrap();
    assert_eq!(key, harness::ENCODED_KEY);
}
