use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campus_store::error::StoreError;
use campus_store::infra::codec::Entity;
use campus_store::infra::filter::Filter;
use campus_store::infra::remote::{
    CONTINUATION_PARTITION_HEADER, CONTINUATION_ROW_HEADER, TableClient, TableEndpoint,
};
use campus_store::infra::store::TableStore;

const ENTITY_PATH: &str = "/users(PartitionKey='users',RowKey='u1')";

fn client(server: &MockServer) -> TableClient {
    let endpoint =
        TableEndpoint::parse(&format!("{}/users?sv=2019-02-02&sig=abc", server.uri())).unwrap();
    TableClient::new(Client::new(), endpoint)
}

// ── get ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_get_entity_with_signature_and_protocol_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENTITY_PATH))
        .and(query_param("sig", "abc"))
        .and(header("accept", "application/json;odata=nometadata"))
        .and(header("x-ms-version", "2019-02-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "PartitionKey": "users",
            "RowKey": "u1",
            "Timestamp": "2025-01-01T00:00:00Z",
            "email": "a@b.com",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entity = client(&server).get("users", "u1").await.unwrap().unwrap();

    assert_eq!(entity.partition_key, "users");
    assert_eq!(entity.row_key, "u1");
    assert_eq!(entity.attribute("email"), Some(json!("a@b.com")));
    assert_eq!(entity.attribute("Timestamp"), None);
}

#[tokio::test]
async fn should_return_none_when_entity_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENTITY_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client(&server).get("users", "u1").await.unwrap();
    assert!(result.is_none());
}

// ── list ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_follow_continuation_headers_across_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(CONTINUATION_PARTITION_HEADER, "users")
                .insert_header(CONTINUATION_ROW_HEADER, "u2")
                .set_body_json(json!({
                    "value": [{ "PartitionKey": "users", "RowKey": "u1" }]
                })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("NextPartitionKey", "users"))
        .and(query_param("NextRowKey", "u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "PartitionKey": "users", "RowKey": "u2" }]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let entities = client(&server).list(None).await.unwrap();

    let rows: Vec<_> = entities.iter().map(|e| e.row_key.as_str()).collect();
    assert_eq!(rows, vec!["u1", "u2"]);
}

#[tokio::test]
async fn should_send_filter_as_odata_expression() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("$filter", "email eq 'a@b.com'"))
        .and(query_param("sig", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = Filter::eq("email", "a@b.com");
    let entities = client(&server).list(Some(&filter)).await.unwrap();
    assert!(entities.is_empty());
}

// ── writes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_post_wire_entity_on_insert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({
            "PartitionKey": "users",
            "RowKey": "u1",
            "name": "Alice",
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let entity = Entity::new("users", "u1").with("name", "Alice");
    client(&server).insert(&entity).await.unwrap();
}

#[tokio::test]
async fn should_map_insert_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let result = client(&server).insert(&Entity::new("users", "u1")).await;
    assert!(
        matches!(result, Err(StoreError::Conflict)),
        "expected Conflict, got {result:?}"
    );
}

#[tokio::test]
async fn should_put_unconditionally_on_replace() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(ENTITY_PATH))
        .and(header("if-match", "*"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .replace(&Entity::new("users", "u1").with("name", "Bob"))
        .await
        .unwrap();
}

#[tokio::test]
async fn should_treat_missing_entity_on_delete_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(ENTITY_PATH))
        .and(header("if-match", "*"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete("users", "u1").await.unwrap();
}

// ── error mapping ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_map_forbidden_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client(&server).list(None).await;
    assert!(
        matches!(result, Err(StoreError::Unauthorized)),
        "expected Unauthorized, got {result:?}"
    );
}

#[tokio::test]
async fn should_map_server_error_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client(&server).get("users", "u1").await;
    assert!(
        matches!(result, Err(StoreError::Unavailable(_))),
        "expected Unavailable, got {result:?}"
    );
}

#[tokio::test]
async fn should_map_connection_failure_to_unavailable() {
    let endpoint = TableEndpoint::parse("http://127.0.0.1:9/users?sig=abc").unwrap();
    let client = TableClient::new(Client::new(), endpoint);

    let result = client.list(None).await;
    assert!(
        matches!(result, Err(StoreError::Unavailable(_))),
        "expected Unavailable, got {result:?}"
    );
}
