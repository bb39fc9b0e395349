use std::time::Duration;

use serde_json::json;
use ton_http::{AccountStatus, ChainClient, RpcError, TonCenterClient};
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDRESS: &str = "0QDQBpCcv361Q785LZ33ky4fowYlgSYLTEIRTPzHVOaAhsVm";

fn client(server: &MockServer) -> TonCenterClient {
    TonCenterClient::new(server.uri(), Some("test-key".to_string()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_account_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("X-API-Key", "test-key"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "getAddressInformation",
            "params": { "address": ADDRESS }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "balance": "2500000000", "state": "active" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = client(&server).account_state(ADDRESS).await.unwrap();
    assert_eq!(state.balance, 2_500_000_000);
    assert_eq!(state.status, AccountStatus::Active);
}

#[tokio::test]
async fn test_seqno() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "runGetMethod",
            "params": { "address": ADDRESS, "method": "seqno", "stack": [] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "gas_used": 484, "stack": [["num", "0x2a"]], "exit_code": 0 }
        })))
        .mount(&server)
        .await;

    assert_eq!(client(&server).get_seqno(ADDRESS).await.unwrap(), 42);
}

#[tokio::test]
async fn test_seqno_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "stack": [], "exit_code": -13 }
        })))
        .mount(&server)
        .await;

    assert!(matches!(
        client(&server).get_seqno(ADDRESS).await,
        Err(RpcError::ExitCode { exit_code: -13, .. })
    ));
}

#[tokio::test]
async fn test_send_boc() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "sendBoc",
            "params": { "boc": "te6cckEBAQEAAgAAAEysuc0=" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "@type": "ok" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_boc("te6cckEBAQEAAgAAAEysuc0=")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "ok": false,
            "error": "LITE_SERVER_UNKNOWN: cannot apply external message",
            "code": 500
        })))
        .mount(&server)
        .await;

    let err = client(&server).send_boc("AA==").await.unwrap_err();
    assert!(matches!(err, RpcError::Api { code: Some(500), .. }));
    assert!(err.to_string().contains("cannot apply external message"));
}

#[tokio::test]
async fn test_non_json_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    assert!(matches!(
        client(&server).account_state(ADDRESS).await,
        Err(RpcError::Status { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_no_api_key_header_when_unset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("X-API-Key", "test-key"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "balance": 0, "state": "uninitialized" }
        })))
        .mount(&server)
        .await;

    let client = TonCenterClient::new(server.uri(), None, Duration::from_secs(5)).unwrap();
    let state = client.account_state(ADDRESS).await.unwrap();
    assert!(!state.is_active());
}
