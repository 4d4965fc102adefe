//! Tests for the client module

use super::*;
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::http::{Transport, TransportResponse};
use crate::mapping::{Entity, RecordItem, Schema};
use crate::query::Query;
use crate::request::ApiRequest;
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// Fixtures
// ============================================================================

/// Replays canned responses and records every request
#[derive(Default)]
struct MockTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    fn with(responses: Vec<(u16, JsonValue)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| TransportResponse::new(status, body.to_string()))
                    .collect(),
            ),
            requests: Mutex::default(),
        })
    }

    fn raw(status: u16, body: &str) -> Arc<Self> {
        let transport = Self::default();
        transport
            .responses
            .lock()
            .unwrap()
            .push_back(TransportResponse::new(status, body));
        Arc::new(transport)
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| TransportResponse::new(500, "")))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Movie {
    id: Option<String>,
    name: String,
    year: Option<i64>,
}

impl Entity for Movie {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: Lazy<Schema<Movie>> = Lazy::new(|| {
            Schema::builder()
                .id(|m: &Movie| &m.id, |m, v| m.id = v)
                .renamed("name", "Name", |m: &Movie| &m.name, |m, v| m.name = v)
                .renamed("year", "Year", |m: &Movie| &m.year, |m, v| m.year = v)
                .build()
        });
        &SCHEMA
    }
}

fn base_over(transport: Arc<MockTransport>) -> Base {
    let config = Configuration::builder()
        .api_key("keyTEST")
        .endpoint_url("https://api.example.com/v0")
        .no_rate_limit()
        .build()
        .unwrap();
    Airtable::with_transport(config, transport)
        .base("appBase")
        .unwrap()
}

fn record(id: &str, name: &str) -> JsonValue {
    json!({
        "id": id,
        "createdTime": "2018-03-31T10:00:00.000Z",
        "fields": {"Name": name}
    })
}

// ============================================================================
// Airtable / Base Tests
// ============================================================================

#[test]
fn test_base_requires_id() {
    let airtable = Airtable::with_transport(Configuration::new("key"), MockTransport::with(vec![]));
    let err = airtable.base("").unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: base was null");

    let base = airtable.base("appXYZ").unwrap();
    assert_eq!(base.id(), "appXYZ");
}

#[test]
fn test_new_validates_config() {
    let err = Airtable::new(Configuration::new("")).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_table_is_cached_per_name() {
    let base = base_over(MockTransport::with(vec![]));

    let first = base.table::<Movie>("Movies").unwrap();
    let second = base.table::<Movie>("Movies").unwrap();
    let weak = base.records("Movies").unwrap();
    let other = base.table::<Movie>("Actors").unwrap();

    assert!(first.same_table(&second));
    assert!(first.same_table(&weak));
    assert!(!first.same_table(&other));
    assert_eq!(base.table_names(), vec!["Actors", "Movies"]);
    assert_eq!(first.url(), "https://api.example.com/v0/appBase/Movies");
}

#[test]
fn test_table_requires_name() {
    let base = base_over(MockTransport::with(vec![]));
    assert!(base.records("  ").is_err());
}

// ============================================================================
// Select Tests
// ============================================================================

#[tokio::test]
async fn test_select_keeps_server_order() {
    let transport = MockTransport::with(vec![(
        200,
        json!({"records": [record("rec1", "Alien"), record("rec2", "Brazil")]}),
    )]);
    let table = base_over(transport.clone()).table::<Movie>("Movies").unwrap();

    let movies = table.select(&Query::with_max_records(2)).await.unwrap();

    assert_eq!(
        movies,
        vec![
            Movie {
                id: Some("rec1".into()),
                name: "Alien".into(),
                year: None
            },
            Movie {
                id: Some("rec2".into()),
                name: "Brazil".into(),
                year: None
            },
        ]
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].query_value("maxRecords"), Some("2"));
}

#[tokio::test]
async fn test_select_follows_offset() {
    let transport = MockTransport::with(vec![
        (
            200,
            json!({"records": [record("rec1", "A"), record("rec2", "B")], "offset": "itr1/rec2"}),
        ),
        (200, json!({"records": [record("rec3", "C")]})),
    ]);
    let table = base_over(transport.clone()).records("Movies").unwrap();

    let items = table.select(&Query::new().page_size(2)).await.unwrap();
    let ids: Vec<_> = items.iter().filter_map(|i| i.id.as_deref()).collect();
    assert_eq!(ids, vec!["rec1", "rec2", "rec3"]);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].query_value("offset"), None);
    assert_eq!(requests[1].query_value("offset"), Some("itr1/rec2"));
    assert_eq!(requests[1].query_value("pageSize"), Some("2"));
}

#[tokio::test]
async fn test_select_failure_aborts() {
    let transport = MockTransport::with(vec![
        (200, json!({"records": [record("rec1", "A")], "offset": "next"})),
        (503, json!({})),
    ]);
    let table = base_over(transport).records("Movies").unwrap();

    let err = table.select_all().await.unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn test_select_repeated_offset_aborts() {
    let page = json!({"records": [record("rec1", "A")], "offset": "itr1/rec1"});
    let transport = MockTransport::with(vec![(200, page.clone()), (200, page)]);
    let table = base_over(transport.clone()).records("Movies").unwrap();

    let err = table.select_all().await.unwrap_err();
    assert!(err.is_mapping());
    assert!(err.to_string().contains("itr1/rec1"));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_select_empty_table() {
    let transport = MockTransport::with(vec![(200, json!({"records": []}))]);
    let table = base_over(transport).records("Movies").unwrap();
    assert!(table.select_all().await.unwrap().is_empty());
}

// ============================================================================
// Single Record Tests
// ============================================================================

#[tokio::test]
async fn test_find_not_found_message() {
    let transport = MockTransport::raw(404, "");
    let table = base_over(transport).table::<Movie>("Movies").unwrap();

    let err = table.find("recMissing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        "Could not find what you are looking for (NOT_FOUND) [Http code 404]"
    );
}

#[tokio::test]
async fn test_find_converts_record() {
    let transport = MockTransport::with(vec![(
        200,
        json!({"id": "rec1", "fields": {"Name": "Alien", "Year": 1979}}),
    )]);
    let table = base_over(transport.clone()).table::<Movie>("Movies").unwrap();

    let movie = table.find("rec1").await.unwrap();
    assert_eq!(movie.year, Some(1979));
    assert_eq!(
        transport.requests()[0].url,
        "https://api.example.com/v0/appBase/Movies/rec1"
    );
}

#[tokio::test]
async fn test_unparseable_success_body_is_mapping_error() {
    let transport = MockTransport::raw(200, "<html>");
    let table = base_over(transport).table::<Movie>("Movies").unwrap();
    assert!(table.find("rec1").await.unwrap_err().is_mapping());
}

#[tokio::test]
async fn test_invalid_request_uses_envelope() {
    let transport = MockTransport::with(vec![(
        422,
        json!({"error": {"type": "INVALID_VALUE_FOR_COLUMN", "message": "Field Year cannot accept text"}}),
    )]);
    let table = base_over(transport).table::<Movie>("Movies").unwrap();

    let err = table
        .create(&Movie {
            name: "Alien".into(),
            ..Movie::default()
        })
        .await
        .unwrap_err();
    let api = err.api().unwrap();
    assert_eq!(api.code(), "INVALID_VALUE_FOR_COLUMN");
    assert_eq!(api.message(), "Field Year cannot accept text");
    assert_eq!(api.status(), Some(422));
}

#[tokio::test]
async fn test_create_posts_payload() {
    let transport = MockTransport::with(vec![(200, record("recNew", "Alien"))]);
    let table = base_over(transport.clone()).table::<Movie>("Movies").unwrap();

    let created = table
        .create(&Movie {
            name: "Alien".into(),
            ..Movie::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id.as_deref(), Some("recNew"));

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.body, Some(json!({"fields": {"Name": "Alien"}})));
}

#[tokio::test]
async fn test_create_with_id_sends_nothing() {
    let transport = MockTransport::with(vec![]);
    let table = base_over(transport.clone()).table::<Movie>("Movies").unwrap();

    let err = table
        .create(&Movie {
            id: Some("rec1".into()),
            ..Movie::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_update_requires_id() {
    let transport = MockTransport::with(vec![]);
    let table = base_over(transport.clone()).table::<Movie>("Movies").unwrap();

    let err = table.update(&Movie::default()).await.unwrap_err();
    assert!(err.is_validation());
    assert!(transport.requests().is_empty());
}

#[test_case("" ; "empty")]
#[test_case("   " ; "whitespace")]
#[tokio::test]
async fn test_blank_id_is_rejected_before_any_request(id: &str) {
    let transport = MockTransport::with(vec![(200, json!({"records": []}))]);
    let table = base_over(transport.clone()).table::<Movie>("Movies").unwrap();

    assert!(table.find(id).await.unwrap_err().is_validation());
    assert!(table.destroy(id).await.unwrap_err().is_validation());
    let movie = Movie {
        id: Some(id.to_string()),
        ..Movie::default()
    };
    assert!(table.update(&movie).await.unwrap_err().is_validation());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_update_patches_without_protected_fields() {
    let transport = MockTransport::with(vec![(200, record("rec1", "Aliens"))]);
    let table = base_over(transport.clone()).table::<Movie>("Movies").unwrap();

    let updated = table
        .update(&Movie {
            id: Some("rec1".into()),
            name: "Aliens".into(),
            year: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Aliens");

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::PATCH);
    assert!(request.url.ends_with("/Movies/rec1"));
    assert_eq!(
        request.body,
        Some(json!({"fields": {"Name": "Aliens", "Year": null}}))
    );
}

#[tokio::test]
async fn test_destroy_returns_deleted_flag() {
    let transport = MockTransport::with(vec![(200, json!({"id": "rec1", "deleted": true}))]);
    let table = base_over(transport.clone()).records("Movies").unwrap();

    assert!(table.destroy("rec1").await.unwrap());
    assert_eq!(transport.requests()[0].method, Method::DELETE);
}

#[tokio::test]
async fn test_replace_is_not_implemented() {
    let transport = MockTransport::with(vec![]);
    let table = base_over(transport.clone()).records("Movies").unwrap();

    let err = table.replace(&RecordItem::default()).await.unwrap_err();
    assert!(matches!(err, Error::NotImplemented { operation: "replace" }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_custom_converters_reach_tables() {
    use crate::mapping::{ConverterRegistry, FieldKind, IntegerConverter};

    let transport = MockTransport::with(vec![(
        200,
        json!({"id": "rec1", "fields": {"Name": "Alien", "Year": 1979}}),
    )]);
    let config = Configuration::new("key");
    let airtable = Airtable::with_transport(config, transport)
        .with_converters(ConverterRegistry::empty().with(FieldKind::Integer, IntegerConverter));

    let table = airtable.base("app").unwrap().table::<Movie>("Movies").unwrap();
    let err = table.find("rec1").await.unwrap_err();
    assert!(err.is_mapping());
}
