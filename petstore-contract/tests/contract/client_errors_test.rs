//! Contract Test: トランスポートエラーの分類

use std::time::Duration;

use petstore_contract::client::{PetstoreClient, ResponseBody};
use petstore_contract::config::HarnessConfig;
use petstore_contract::scenarios::pet;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::support::{config_for, context_with};

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // ポート9(discard)は通常待ち受けていない
    let config = HarnessConfig::default()
        .with_base_url("http://127.0.0.1:9")
        .with_timeout(Duration::from_secs(2));
    let (ctx, sink) = context_with(config);

    let err = pet::fetch_absent_pet(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), "network");

    let events = sink.events_for("fetch_absent_pet");
    assert_eq!(events.len(), 1);
    assert!(!events[0].outcome.is_passed());
}

#[tokio::test]
async fn test_slow_response_is_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pet/9999"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(1_500)))
        .mount(&server)
        .await;
    let config = config_for(&server).with_timeout(Duration::from_millis(200));
    let client = PetstoreClient::new(&config).unwrap();

    let err = client.get_pet(9999).await.unwrap_err();
    assert_eq!(err.kind(), "timeout");
}

#[test]
fn test_invalid_base_url_is_config_error() {
    for base_url in ["not a url", "ftp://example.com/api", "mailto:someone@example.com"] {
        let config = HarnessConfig::default().with_base_url(base_url);
        let err = PetstoreClient::new(&config).unwrap_err();
        assert_eq!(err.kind(), "config", "{base_url}");
    }
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/store/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let config = HarnessConfig::default().with_base_url(format!("{}/api/v3/", server.uri()));
    let client = PetstoreClient::new(&config).unwrap();

    let response = client.get_inventory().await.unwrap();
    assert_eq!(response.status, 200);
    server.verify().await;
}

#[tokio::test]
async fn test_body_classification() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/pet/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Pet deleted"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pet/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{broken", "application/json"))
        .mount(&server)
        .await;
    let client = PetstoreClient::new(&config_for(&server)).unwrap();

    let deleted = client.delete_pet(1).await.unwrap();
    assert!(!deleted.is_json());
    assert!(matches!(deleted.body().unwrap(), ResponseBody::Text(t) if t == "Pet deleted"));

    let broken = client.get_pet(1).await.unwrap();
    assert!(broken.is_json());
    assert_eq!(broken.json_value().unwrap_err().kind(), "parse");
}
