//! Contract Test: /store/order

use petstore_contract::scenarios::store;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::support::{context_for, petstore::FakePetstore};

#[tokio::test]
async fn test_place_order_passes_and_cleans_up() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let (ctx, _sink) = context_for(&server);

    store::place_order(&ctx).await.unwrap();
    assert_eq!(fake.order_count(), 0);

    let requests = server.received_requests().await.unwrap();
    let placed: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(placed["id"], 1);
    assert_eq!(placed["petId"], 1);
    assert_eq!(placed["quantity"], 1);
    assert_eq!(placed["status"], "placed");
    assert_eq!(placed["complete"], true);
}

#[tokio::test]
async fn test_place_order_detects_changed_quantity() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    Mock::given(method("POST"))
        .and(path("/store/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "petId": 1,
            "quantity": 2,
            "status": "placed",
            "complete": true
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    let (ctx, _sink) = context_for(&server);

    let err = store::place_order(&ctx).await.unwrap_err();
    match err {
        petstore_contract::ContractError::FieldMismatch {
            field,
            expected,
            actual,
        } => {
            assert_eq!(field, "quantity");
            assert_eq!(expected, json!(1));
            assert_eq!(actual, json!(2));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_order_by_id_uses_provisioned_order() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let (ctx, _sink) = context_for(&server);
    assert!(fake.order(1).is_none());

    store::fetch_order_by_id(&ctx).await.unwrap();

    // 注文はフィクスチャとして作成・削除される
    assert_eq!(fake.order_count(), 0);
    let requests = server.received_requests().await.unwrap();
    let paths: Vec<String> = requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        paths,
        vec![
            "POST /store/order",
            "GET /store/order/1",
            "DELETE /store/order/1",
        ]
    );
}

#[tokio::test]
async fn test_delete_order_passes() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let (ctx, _sink) = context_for(&server);

    store::delete_order(&ctx).await.unwrap();
    assert_eq!(fake.order_count(), 0);
}

#[tokio::test]
async fn test_fetch_absent_order_passes() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let (ctx, _sink) = context_for(&server);

    store::fetch_absent_order(&ctx).await.unwrap();
}

#[tokio::test]
async fn test_fetch_absent_order_fails_on_200() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    Mock::given(method("GET"))
        .and(path("/store/order/9999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9999})))
        .with_priority(1)
        .mount(&server)
        .await;
    let (ctx, _sink) = context_for(&server);

    let err = store::fetch_absent_order(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), "unexpected_status");
}
