use crate::errors::{ConfigError, StoreError};
use crate::key::StorageKey;
use crate::models::WorkoutDocument;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client, Response, Url,
    header::{CACHE_CONTROL, CONTENT_TYPE},
};

/// Whole-document GET/PUT access to a user's workout and notes documents.
///
/// Every call is one round trip: no retries, no caching, last writer wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch_workouts(&self, key: &StorageKey) -> Result<WorkoutDocument, StoreError>;
    async fn fetch_notes(&self, key: &StorageKey) -> Result<String, StoreError>;
    async fn put_workouts(&self, key: &StorageKey, doc: &WorkoutDocument) -> Result<(), StoreError>;
    async fn put_notes(&self, key: &StorageKey, text: &str) -> Result<(), StoreError>;
}

/// Document store reached over plain HTTP:
/// `<base>/data/<key>.json` and `<base>/notes/<key>.md`.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base: Url,
}

impl HttpDocumentStore {
    pub fn new(mut base: Url) -> Result<Self, ConfigError> {
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidStoreUrl {
                value: base.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn workouts_url(&self, key: &StorageKey) -> Result<Url, StoreError> {
        self.document_url(&format!("data/{key}.json"))
    }

    fn notes_url(&self, key: &StorageKey) -> Result<Url, StoreError> {
        self.document_url(&format!("notes/{key}.md"))
    }

    fn document_url(&self, path: &str) -> Result<Url, StoreError> {
        self.base.join(path).map_err(|err| StoreError::InvalidPath {
            path: path.to_string(),
            reason: err.to_string(),
        })
    }

    async fn get(&self, mut url: Url) -> Result<Response, StoreError> {
        let path = url.path().to_string();
        url.query_pairs_mut()
            .append_pair("_", &Utc::now().timestamp_millis().to_string());

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                path: path.clone(),
                source,
            })?;
        check_status(path, response)
    }

    async fn put(&self, url: Url, content_type: &'static str, body: Vec<u8>) -> Result<(), StoreError> {
        let path = url.path().to_string();
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                path: path.clone(),
                source,
            })?;
        check_status(path, response).map(drop)
    }
}

fn check_status(path: String, response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status == reqwest::StatusCode::NOT_FOUND {
        Err(StoreError::NotFound { path })
    } else {
        Err(StoreError::Status { path, status })
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch_workouts(&self, key: &StorageKey) -> Result<WorkoutDocument, StoreError> {
        let url = self.workouts_url(key)?;
        let path = url.path().to_string();
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|source| StoreError::Transport {
                path: path.clone(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode { path, source })
    }

    async fn fetch_notes(&self, key: &StorageKey) -> Result<String, StoreError> {
        let url = self.notes_url(key)?;
        let path = url.path().to_string();
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|source| StoreError::Transport { path, source })
    }

    async fn put_workouts(&self, key: &StorageKey, doc: &WorkoutDocument) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(doc)?;
        self.put(self.workouts_url(key)?, "application/json", payload)
            .await
    }

    async fn put_notes(&self, key: &StorageKey, text: &str) -> Result<(), StoreError> {
        self.put(self.notes_url(key)?, "text/markdown", text.as_bytes().to_vec())
            .await
    }
}
