#![allow(dead_code)]

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: Option<String>,
    pub cache_control: Option<String>,
}

/// Whole-document file store: GET/PUT on `/<dir>/<file>`, no locking, no
/// versioning.
#[derive(Clone, Default)]
pub struct FakeStore {
    docs: Arc<Mutex<HashMap<String, StoredDocument>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    fail_puts: Arc<AtomicBool>,
}

impl FakeStore {
    pub fn document(&self, path: &str) -> Option<StoredDocument> {
        self.docs.lock().unwrap().get(path).cloned()
    }

    pub fn insert(&self, path: &str, content_type: &str, body: &str) {
        self.docs.lock().unwrap().insert(
            path.to_string(),
            StoredDocument {
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn put_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.method == "PUT")
            .count()
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    fn record(&self, method: &'static str, path: &str, query: Option<String>, headers: &HeaderMap) {
        let cache_control = headers
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            query,
            cache_control,
        });
    }
}

pub struct RunningStore {
    pub base_url: String,
    pub store: FakeStore,
}

pub async fn spawn_fake_store() -> RunningStore {
    let store = FakeStore::default();
    let app = Router::new()
        .route("/:dir/:file", get(fetch_document).put(put_document))
        .with_state(store.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake store");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake store stopped");
    });

    RunningStore {
        base_url: format!("http://{addr}"),
        store,
    }
}

async fn fetch_document(
    State(store): State<FakeStore>,
    Path((dir, file)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<([(header::HeaderName, String); 1], String), StatusCode> {
    let path = format!("/{dir}/{file}");
    store.record("GET", &path, query, &headers);
    let doc = store.document(&path).ok_or(StatusCode::NOT_FOUND)?;
    Ok(([(header::CONTENT_TYPE, doc.content_type)], doc.body))
}

async fn put_document(
    State(store): State<FakeStore>,
    Path((dir, file)): Path<(String, String)>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let path = format!("/{dir}/{file}");
    store.record("PUT", &path, None, &headers);
    if store.fail_puts.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    store.insert(&path, content_type, &body);
    StatusCode::NO_CONTENT
}
