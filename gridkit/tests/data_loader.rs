//! Tests for the data loader and data sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gridkit::data::{
    DataLoader, DataSource, Fetch, HttpMethod, MessageLevel, RemoteSource, RequestFn,
    RequestParams, RequestResponse,
};
use gridkit::error::RequestError;
use gridkit::model::{Column, Record};
use gridkit::renderer::TextPrimitive;
use gridkit::schema::{MountOptions, SearchFeature};
use gridkit::{GridError, SchemaTable, TableSchemaBuilder};
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

fn params() -> RequestParams {
    RequestParams {
        current: 1,
        page_size: 10,
        ..Default::default()
    }
}

/// Answers with queued results, one per call.
fn scripted(results: Vec<Result<RequestResponse, RequestError>>) -> DataSource {
    let queue = Arc::new(Mutex::new(results.into_iter()));
    DataSource::Request(RequestFn::new(move |_| {
        let next = queue
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| Err(RequestError::failed("script exhausted")));
        async move { next }
    }))
}

#[tokio::test]
async fn test_soft_failure_keeps_previous_rows() {
    let loader = DataLoader::new(Some(scripted(vec![
        Ok(RequestResponse::ok(vec![record(json!({ "id": 1 }))], 1)),
        Ok(RequestResponse::soft_failure("quota exceeded")),
    ])));

    loader.load(params()).await.unwrap();
    loader.load(params()).await.unwrap();

    assert_eq!(loader.records().len(), 1);
    let message = loader.message().unwrap();
    assert_eq!(message.level, MessageLevel::Warning);
    assert_eq!(message.text, "quota exceeded");
    assert!(!loader.is_loading());
}

#[tokio::test]
async fn test_hard_failure_keeps_rows_and_calls_back() {
    let failures = Arc::new(AtomicUsize::new(0));
    let seen = failures.clone();
    let loader = DataLoader::new(Some(scripted(vec![
        Ok(RequestResponse::ok(vec![record(json!({ "id": 1 })), record(json!({ "id": 2 }))], 40)),
        Err(RequestError::failed("connection reset")),
    ])))
    .on_error(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    loader.load(params()).await.unwrap();
    let err = loader.load(params()).await.unwrap_err();

    assert_eq!(err, RequestError::failed("connection reset"));
    assert_eq!(GridError::from(err).to_string(), "Request failed: connection reset");
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(loader.records().len(), 2);
    assert_eq!(loader.total(), 40);
    assert_eq!(loader.message().map(|m| m.level), Some(MessageLevel::Error));
}

#[tokio::test]
async fn test_missing_source() {
    let loader = DataLoader::new(None);
    assert_eq!(loader.load(params()).await, Err(RequestError::NoSource));
}

struct CannedFetch {
    calls: Mutex<Vec<(HttpMethod, String)>>,
}

#[async_trait]
impl Fetch for CannedFetch {
    async fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        params: &RequestParams,
    ) -> Result<Value, RequestError> {
        self.calls.lock().unwrap().push((method, url.to_string()));
        Ok(json!({ "items": [{ "bot_id": 77, "page": params.current }], "count": 120 }))
    }
}

#[tokio::test]
async fn test_remote_source_goes_through_fetch_and_transform() {
    let fetch = Arc::new(CannedFetch {
        calls: Mutex::new(Vec::new()),
    });
    let remote = RemoteSource::get("https://ops.example/api/bots").transform(|body| {
        let data = body["items"]
            .as_array()
            .map(|items| items.iter().filter_map(|i| i.as_object().cloned()).collect())
            .unwrap_or_default();
        let total = body["count"].as_u64().map(|n| n as usize);
        Ok(RequestResponse {
            data,
            total,
            ..Default::default()
        })
    });
    let schema = TableSchemaBuilder::new()
        .add_column(Column::new("bot_id", "Bot"))
        .set_remote(remote)
        .build();
    let table = SchemaTable::mount(
        "remote",
        schema,
        TextPrimitive::new(),
        MountOptions {
            fetch: Some(fetch.clone()),
            ..Default::default()
        },
    );

    table.reload().await.unwrap();

    assert_eq!(table.loader().records()[0]["key"], json!(77));
    assert_eq!(table.context().total(), 120);
    assert_eq!(
        *fetch.calls.lock().unwrap(),
        vec![(HttpMethod::Get, "https://ops.example/api/bots".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_search_is_debounced() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    let schema = TableSchemaBuilder::new()
        .add_column(Column::new("name", "Name"))
        .enable_search(SearchFeature {
            debounce_ms: Some(200),
            ..Default::default()
        })
        .set_request(move |params: RequestParams| {
            log.lock().unwrap().push(params.keyword.clone());
            async { Ok(RequestResponse::default()) }
        })
        .build();
    let table = SchemaTable::new("search", schema, TextPrimitive::new());

    let early = table.search("al");
    let late = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        table.search("alpha").await
    };
    let (early, late) = futures::join!(early, late);

    assert!(early.is_none());
    assert!(matches!(late, Some(Ok(()))));
    assert_eq!(*requests.lock().unwrap(), vec![Some("alpha".to_string())]);
    assert_eq!(table.context().current(), 1);
}

#[tokio::test]
async fn test_panicking_request_is_a_hard_failure() {
    let loader = DataLoader::new(Some(DataSource::Request(RequestFn::new(|_| async {
        if true {
            panic!("backend exploded");
        }
        Ok(RequestResponse::default())
    }))));

    let err = loader.load(params()).await.unwrap_err();
    assert!(err.to_string().contains("backend exploded"));
    assert!(!loader.is_loading());
}
