//! In-memory key-value store

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use crate::{
    core::error::{StoreError, StoreResult},
    store::{Entries, KeyValueStore},
};

/// Volatile store that counts commits reaching the medium
///
/// Failure knobs allow exercising the best-effort persistence paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: Mutex<HashMap<String, Entries>>,
    commits: AtomicUsize,
    fail_open: AtomicBool,
    fail_commit: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of namespace writes that reached the medium
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Make every open fail as if the partition were missing
    pub fn set_open_failure(&self, should_fail: bool) {
        self.fail_open.store(should_fail, Ordering::SeqCst);
    }

    pub fn set_commit_failure(&self, should_fail: bool) {
        self.fail_commit.store(should_fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for MemoryStore {
    fn load_namespace(&self, namespace: &str) -> StoreResult<Option<Entries>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(StoreError::Open(namespace.to_string()));
        }

        let namespaces = self.namespaces.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(namespaces.get(namespace).cloned())
    }

    fn store_namespace(&self, namespace: &str, entries: &Entries) -> StoreResult<()> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(StoreError::Commit("mock commit failure".into()));
        }

        self.namespaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(namespace.to_string(), entries.clone());
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
