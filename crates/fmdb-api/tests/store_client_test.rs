#![allow(clippy::unwrap_used)]
// Integration tests for `StoreClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fmdb_api::{BasicAuth, Error, FindQuery, StoreClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StoreClient) {
    let server = MockServer::start().await;
    let client = StoreClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        None,
    )
    .unwrap();
    (server, client)
}

fn store_error(kind: &str, reason: &str) -> Value {
    json!({ "error": kind, "reason": reason })
}

// ── Document reads ──────────────────────────────────────────────────

#[tokio::test]
async fn test_get_document() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/buildings/ITB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "ITB",
            "_rev": "1-abc",
            "name": "Information Technology Building"
        })))
        .mount(&server)
        .await;

    let doc: Value = client.get_document("buildings", "ITB").await.unwrap();

    assert_eq!(doc["_rev"], "1-abc");
    assert_eq!(doc["name"], "Information Technology Building");
}

#[tokio::test]
async fn test_get_missing_document_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rooms/ITB-1101"))
        .respond_with(ResponseTemplate::new(404).set_body_json(store_error("not_found", "missing")))
        .mount(&server)
        .await;

    let result: Result<Value, _> = client.get_document("rooms", "ITB-1101").await;

    assert!(
        matches!(result, Err(Error::NotFound { ref reason }) if reason == "missing"),
        "expected NotFound, got: {result:?}"
    );
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_document_posts_to_collection() {
    let (server, client) = setup().await;
    let doc = json!({ "_id": "ITB", "name": "ITB" });

    Mock::given(method("POST"))
        .and(path("/buildings"))
        .and(body_json(&doc))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ok": true, "id": "ITB", "rev": "1-def"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.create_document("buildings", &doc).await.unwrap();

    assert!(resp.ok);
    assert_eq!(resp.id, "ITB");
    assert_eq!(resp.rev, "1-def");
}

#[tokio::test]
async fn test_duplicate_create_is_conflict() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/buildings"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(store_error("conflict", "Document update conflict.")),
        )
        .mount(&server)
        .await;

    let err = client
        .create_document("buildings", &json!({ "_id": "ITB" }))
        .await
        .unwrap_err();

    assert!(err.is_conflict(), "expected Conflict, got: {err:?}");
}

#[tokio::test]
async fn test_replace_document_sends_revision() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/rooms/ITB-1101"))
        .and(query_param("rev", "3-aaa"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ok": true, "id": "ITB-1101", "rev": "4-bbb"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .replace_document("rooms", "ITB-1101", Some("3-aaa"), &json!({ "_id": "ITB-1101" }))
        .await
        .unwrap();

    assert_eq!(resp.rev, "4-bbb");
}

#[tokio::test]
async fn test_delete_document_sends_revision() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/devices/ITB-1101-CP1"))
        .and(query_param("rev", "2-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "id": "ITB-1101-CP1", "rev": "3-gone"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .delete_document("devices", "ITB-1101-CP1", "2-xyz")
        .await
        .unwrap();

    assert_eq!(resp.id, "ITB-1101-CP1");
}

// ── Queries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_posts_selector() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/_find"))
        .and(body_json(json!({
            "selector": { "_id": { "$gt": "ITB-1101-", "$lt": "ITB-1101." } },
            "limit": 1000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [{ "_id": "ITB-1101-CP1" }, { "_id": "ITB-1101-D1" }],
            "bookmark": "nil"
        })))
        .mount(&server)
        .await;

    let query = FindQuery::range("ITB-1101-", "ITB-1101.", 1000);
    let resp = client.find::<Value>("devices", &query).await.unwrap();

    let ids: Vec<&str> = resp.docs.iter().map(|d| d["_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["ITB-1101-CP1", "ITB-1101-D1"]);
    assert_eq!(resp.bookmark.as_deref(), Some("nil"));
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_bad_request_and_unknown_errors() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/_find"))
        .respond_with(ResponseTemplate::new(400).set_body_json(store_error("bad_request", "invalid selector")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/devices/ITB-1101-CP1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(store_error("unauthorized", "Name or password is incorrect.")))
        .mount(&server)
        .await;

    let err = client
        .find::<Value>("devices", &FindQuery::all(10))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest { .. }), "got: {err:?}");

    let err = client
        .get_document::<Value>("devices", "ITB-1101-CP1")
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::UnknownStore { ref error, .. } if error == "unauthorized"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_non_json_error_body_is_unexpected_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/buildings/ITB"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client
        .get_document::<Value>("buildings", "ITB")
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::UnexpectedStatus { status: 502, ref body } if body == "Bad Gateway"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_success_body_that_is_an_error_payload() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/buildings/ITB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_error("conflict", "stale")))
        .mount(&server)
        .await;

    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Named {
        name: String,
    }
    let err = client
        .get_document::<Named>("buildings", "ITB")
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "got: {err:?}");
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_basic_auth_header_is_sent() {
    let server = MockServer::start().await;
    let client = StoreClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        Some(BasicAuth {
            username: "admin".into(),
            password: SecretString::from("secret".to_string()),
        }),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/buildings/ITB"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_id": "ITB" })))
        .expect(1)
        .mount(&server)
        .await;

    let doc: Value = client.get_document("buildings", "ITB").await.unwrap();
    assert_eq!(doc["_id"], "ITB");
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        timeout: Duration::from_millis(200),
        ..TransportConfig::default()
    };
    let client = StoreClient::new(Url::parse(&server.uri()).unwrap(), None, &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/buildings/ITB"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "_id": "ITB" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client
        .get_document::<Value>("buildings", "ITB")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
}
