//! Contract Test: POST /pet
//!
//! 最小ペイロードと完全ペイロードのエコー、スキーマ適合性。

use petstore_contract::scenarios::pet;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::support::{context_for, petstore::FakePetstore};

#[tokio::test]
async fn test_create_minimal_pet_passes_and_cleans_up() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let (ctx, sink) = context_for(&server);

    pet::create_minimal_pet(&ctx).await.unwrap();

    // 作成したペットは削除されている
    assert_eq!(fake.pet_count(), 0);
    let phases: Vec<String> = sink
        .events_for("create_minimal_pet")
        .into_iter()
        .map(|e| e.phase)
        .collect();
    assert_eq!(
        phases,
        vec![
            "prepare minimal payload",
            "send create request",
            "check status and schema",
            "check echoed fields",
        ]
    );
}

#[tokio::test]
async fn test_create_full_pet_passes() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    let (ctx, _sink) = context_for(&server);

    pet::create_full_pet(&ctx).await.unwrap();
    assert_eq!(fake.pet_count(), 0);

    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/pet")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&create.body).unwrap();
    assert_eq!(body["name"], "doggie");
    assert_eq!(body["category"], json!({"id": 1, "name": "Dogs"}));
    assert_eq!(body["photoUrls"], json!(["string"]));
    assert_eq!(body["tags"], json!([{"id": 0, "name": "string"}]));
}

#[tokio::test]
async fn test_create_pet_schema_violation_is_reported() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    Mock::given(method("POST"))
        .and(path("/pet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "Buddy",
            "status": "adopted"
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    let (ctx, _sink) = context_for(&server);

    let err = pet::create_minimal_pet(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), "schema_violation");
    let message = err.to_string();
    assert!(message.contains("photoUrls"), "{message}");
    assert!(message.contains("/status"), "{message}");
}

#[tokio::test]
async fn test_create_full_pet_detects_dropped_nested_field() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    Mock::given(method("POST"))
        .and(path("/pet"))
        .respond_with(|request: &wiremock::Request| {
            let mut body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            body["tags"] = json!([]);
            ResponseTemplate::new(200).set_body_json(body)
        })
        .with_priority(1)
        .mount(&server)
        .await;
    let (ctx, _sink) = context_for(&server);

    let err = pet::create_full_pet(&ctx).await.unwrap_err();
    match err {
        petstore_contract::ContractError::FieldMismatch { field, .. } => assert_eq!(field, "tags"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_create_pet_unexpected_status() {
    let fake = FakePetstore::new();
    let server = fake.start().await;
    Mock::given(method("POST"))
        .and(path("/pet"))
        .respond_with(ResponseTemplate::new(405).set_body_string("Invalid input"))
        .with_priority(1)
        .mount(&server)
        .await;
    let (ctx, _sink) = context_for(&server);

    let err = pet::create_minimal_pet(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), "unexpected_status");
    assert!(err.to_string().contains("Invalid input"));
}
