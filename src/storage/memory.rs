use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::{ObjectStore, StorageError};

const URL_PREFIX: &str = "memory://";

/// Operations observed by a [`MemoryObjectStore`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Upload { folder: String, url: String },
    Delete { public_id: String },
}

/// In-process store used by tests and local development.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Bytes>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following upload return an error.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Makes every following delete return an error.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Delete { public_id } => Some(public_id),
                StoreCall::Upload { .. } => None,
            })
            .collect()
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.objects
            .lock()
            .map(|o| o.contains_key(public_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, call: StoreCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn poisoned() -> StorageError {
        StorageError::Rejected("memory store lock poisoned".into())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, data: Bytes, folder: &str) -> Result<String, StorageError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("upload disabled".into()));
        }

        let public_id = format!("{}/{}", folder.trim_matches('/'), Uuid::new_v4());
        let url = format!("{}{}", URL_PREFIX, public_id);
        self.objects
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(public_id, data);
        self.record(StoreCall::Upload {
            folder: folder.to_string(),
            url: url.clone(),
        });
        Ok(url)
    }

    async fn delete(&self, public_id: &str) -> Result<(), StorageError> {
        self.record(StoreCall::Delete {
            public_id: public_id.to_string(),
        });
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("delete disabled".into()));
        }

        self.objects
            .lock()
            .map_err(|_| Self::poisoned())?
            .remove(public_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(public_id.to_string()))
    }

    fn public_id(&self, url: &str) -> Option<String> {
        url.strip_prefix(URL_PREFIX).map(str::to_string)
    }
}
