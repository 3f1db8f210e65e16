//! Mock object store that keeps blobs in memory

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ladle_storage::{ObjectStore, StorageError, StorageResult};

/// In-memory [`ObjectStore`] with per-key fault injection.
///
/// Puts whose key matches a registered failure substring error immediately;
/// puts matching a stall substring pend until their future is dropped, which
/// is how a cancelled sibling upload looks from the store's side. The gap
/// between `put_call_count` and `completed_put_count` is the set of puts the
/// pipeline abandoned.
#[derive(Clone)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    put_calls: Arc<AtomicUsize>,
    completed_puts: Arc<AtomicUsize>,
    fail_substrings: Arc<Mutex<Vec<String>>>,
    stall_substrings: Arc<Mutex<Vec<String>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            put_calls: Arc::new(AtomicUsize::new(0)),
            completed_puts: Arc::new(AtomicUsize::new(0)),
            fail_substrings: Arc::new(Mutex::new(Vec::new())),
            stall_substrings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every put whose key contains `needle` fail immediately.
    pub fn fail_puts_containing(&self, needle: &str) {
        self.fail_substrings.lock().unwrap().push(needle.to_string());
    }

    /// Make every put whose key contains `needle` pend until cancelled.
    pub fn stall_puts_containing(&self, needle: &str) {
        self.stall_substrings
            .lock()
            .unwrap()
            .push(needle.to_string());
    }

    /// Number of puts that started, failed and stalled ones included.
    pub fn put_call_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Number of puts that ran to completion and stored a blob.
    pub fn completed_put_count(&self) -> usize {
        self.completed_puts.load(Ordering::SeqCst)
    }

    /// Keys of all stored blobs, sorted for stable assertions.
    pub fn stored_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Stored blob content (for test assertions).
    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    fn matches(list: &Mutex<Vec<String>>, key: &str) -> bool {
        list.lock().unwrap().iter().any(|needle| key.contains(needle))
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<String> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        if Self::matches(&self.fail_substrings, key) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for {key}"
            )));
        }
        if Self::matches(&self.stall_substrings, key) {
            // No lock is held across this await.
            std::future::pending::<()>().await;
        }

        self.objects.lock().unwrap().insert(key.to_string(), data);
        self.completed_puts.fetch_add(1, Ordering::SeqCst);
        Ok(format!("http://mock.storage/{key}"))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}
