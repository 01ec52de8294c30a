use crate::errors::StoreError;
use crate::key::StorageKey;
use crate::models::WorkoutDocument;
use crate::store::DocumentStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tokio::sync::{Mutex as GateMutex, OwnedMutexGuard};

/// Document store kept in memory, with switchable PUT failures and a gate
/// that holds PUTs in flight while the test owns it.
#[derive(Default)]
pub(crate) struct MemoryStore {
    workouts: Mutex<HashMap<String, WorkoutDocument>>,
    notes: Mutex<HashMap<String, String>>,
    fail_puts: AtomicBool,
    workout_puts: AtomicUsize,
    notes_puts: AtomicUsize,
    gate: Arc<GateMutex<()>>,
}

impl MemoryStore {
    pub(crate) fn insert_workouts(&self, key: &str, doc: WorkoutDocument) {
        self.workouts.lock().unwrap().insert(key.to_string(), doc);
    }

    pub(crate) fn insert_notes(&self, key: &str, text: &str) {
        self.notes
            .lock()
            .unwrap()
            .insert(key.to_string(), text.to_string());
    }

    pub(crate) fn workouts_for(&self, key: &str) -> Option<WorkoutDocument> {
        self.workouts.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn notes_for(&self, key: &str) -> Option<String> {
        self.notes.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// PUTs issued so far, whether or not they succeeded.
    pub(crate) fn workout_puts(&self) -> usize {
        self.workout_puts.load(Ordering::SeqCst)
    }

    pub(crate) fn notes_puts(&self) -> usize {
        self.notes_puts.load(Ordering::SeqCst)
    }

    /// PUTs block until the returned guard is dropped.
    pub(crate) async fn hold_puts(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.gate).lock_owned().await
    }

    async fn admit_put(&self, path: String) -> Result<(), StoreError> {
        let _gate = self.gate.lock().await;
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                path,
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_workouts(&self, key: &StorageKey) -> Result<WorkoutDocument, StoreError> {
        self.workouts_for(key.as_str())
            .ok_or_else(|| StoreError::NotFound {
                path: format!("/data/{key}.json"),
            })
    }

    async fn fetch_notes(&self, key: &StorageKey) -> Result<String, StoreError> {
        self.notes_for(key.as_str()).ok_or_else(|| StoreError::NotFound {
            path: format!("/notes/{key}.md"),
        })
    }

    async fn put_workouts(&self, key: &StorageKey, doc: &WorkoutDocument) -> Result<(), StoreError> {
        self.workout_puts.fetch_add(1, Ordering::SeqCst);
        self.admit_put(format!("/data/{key}.json")).await?;
        self.insert_workouts(key.as_str(), doc.clone());
        Ok(())
    }

    async fn put_notes(&self, key: &StorageKey, text: &str) -> Result<(), StoreError> {
        self.notes_puts.fetch_add(1, Ordering::SeqCst);
        self.admit_put(format!("/notes/{key}.md")).await?;
        self.insert_notes(key.as_str(), text);
        Ok(())
    }
}
