//! Contract Test: フィクスチャの後始末
//!
//! Teardown must run after success, failure, panic, and drop.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use petstore_contract::client::PetstoreClient;
use petstore_contract::fixture::{representative_pet, with_fixture, with_pet, Fixture};
use petstore_contract::types::Pet;
use petstore_contract::ContractError;
use wiremock::{
    matchers::{method, path, path_regex},
    Mock, Respond, ResponseTemplate,
};

use crate::support::{config_for, petstore::FakePetstore, wait_until};

#[tokio::test]
async fn test_fixture_deleted_after_success() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let seen = with_pet(&client, |pet, created| {
        let fake = fake.clone();
        async move {
            assert!(fake.pet(pet.id).is_some());
            assert_eq!(created["id"], pet.id);
            Ok(pet.id)
        }
    })
    .await
    .unwrap();

    assert!(fake.pet(seen).is_none());
}

#[tokio::test]
async fn test_fixture_deleted_after_failure() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let result: Result<(), _> = with_pet(&client, |_pet, _created| async {
        Err(ContractError::field_mismatch(
            "name",
            serde_json::json!("a"),
            serde_json::json!("b"),
        ))
    })
    .await;

    // 本体のエラーがそのまま返る
    assert_eq!(result.unwrap_err().kind(), "field_mismatch");
    assert_eq!(fake.pet_count(), 0);
}

#[tokio::test]
async fn test_fixture_deleted_after_panic() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let outcome = AssertUnwindSafe(with_pet(&client, |pet, _created| async move {
        if pet.id > 0 {
            panic!("scenario body panicked");
        }
        Ok(())
    }))
    .catch_unwind()
    .await;

    assert!(outcome.is_err());
    assert_eq!(fake.pet_count(), 0);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.last().unwrap().method.as_str(), "DELETE");
}

#[tokio::test]
async fn test_dropped_fixture_is_deleted_in_background() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let fixture = Fixture::acquire(&client, representative_pet(123_456)).await.unwrap();
    assert_eq!(fixture.id(), 123_456);
    assert!(fake.pet(123_456).is_some());
    drop(fixture);

    let probe = fake.clone();
    assert!(wait_until(move || probe.pet(123_456).is_none()).await);
}

#[tokio::test]
async fn test_release_tolerates_already_deleted_entity() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    // 注文の削除は2回目以降404を返す
    let result = with_fixture(
        &client,
        petstore_contract::fixture::representative_order(7, 1),
        |order, _created| {
            let client = client.clone();
            async move {
                let response = client.delete_order(order.id).await?;
                assert_eq!(response.status, 200);
                Ok(())
            }
        },
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(fake.order_count(), 0);
}

#[tokio::test]
async fn test_failed_teardown_does_not_mask_body_result() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/pet/\d+$"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let value = with_fixture(&client, representative_pet(555_555), |pet: Pet, _| async move {
        Ok(pet.name)
    })
    .await
    .unwrap();

    assert_eq!(value, "Buddy");
}

#[tokio::test]
async fn test_setup_failure_reports_entity_kind() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let err = Fixture::acquire(&client, representative_pet(42_424))
        .await
        .unwrap_err();
    match err {
        ContractError::FixtureSetup { kind, .. } => assert_eq!(kind, "pet"),
        other => panic!("unexpected error: {other}"),
    }
    // 読めない作成結果でも送信したIDで削除を試みる
    server.verify().await;
}

#[tokio::test]
async fn test_cancelled_setup_still_deletes_entity() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    // 作成はすぐ反映されるが応答だけ遅れる
    let delayed = fake.clone();
    Mock::given(method("POST"))
        .and(path("/pet"))
        .respond_with(move |request: &wiremock::Request| {
            delayed
                .respond(request)
                .set_delay(Duration::from_millis(400))
        })
        .with_priority(1)
        .mount(&server)
        .await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        with_pet(&client, |_pet, _created| async { Ok(()) }),
    )
    .await;
    assert!(outcome.is_err(), "setup should still be pending");

    let probe = fake.clone();
    assert!(wait_until(move || probe.pet_count() == 0).await);
}

#[tokio::test]
async fn test_cancelled_teardown_still_deletes_entity() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    // 最初のDELETEは削除せずに応答を遅らせる
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/pet/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(400)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_millis(150),
        with_pet(&client, |_pet, _created| async { Ok(()) }),
    )
    .await;
    assert!(outcome.is_err(), "teardown should still be pending");
    assert_eq!(fake.pet_count(), 1);

    let probe = fake.clone();
    assert!(wait_until(move || probe.pet_count() == 0).await);
}

#[tokio::test]
async fn test_failed_release_schedules_another_delete() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/pet/\d+$"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let fixture = Fixture::acquire(&client, representative_pet(777_777)).await.unwrap();
    let err = fixture.release().await.unwrap_err();
    assert_eq!(err.kind(), "unexpected_status");

    let probe = fake.clone();
    assert!(wait_until(move || probe.pet(777_777).is_none()).await);
}
