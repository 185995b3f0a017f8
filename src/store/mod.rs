//! Persistent key-value store abstraction
//!
//! Mirrors the open/get/set/commit/close life cycle of flash-backed
//! key-value partitions. A [`Namespace`] stages reads and writes in memory;
//! nothing reaches the backing medium until [`Namespace::commit`]. Dropping
//! the handle closes it.

pub mod file;
pub mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{StoreError, StoreResult};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A single stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    U8(u8),
    Str(String),
}

/// Key/value pairs of one namespace
pub type Entries = BTreeMap<String, StoredValue>;

/// How a namespace is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// Backing medium for namespaces
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read a whole namespace, `None` if it was never written
    fn load_namespace(&self, namespace: &str) -> StoreResult<Option<Entries>>;

    /// Replace a whole namespace on the medium
    fn store_namespace(&self, namespace: &str, entries: &Entries) -> StoreResult<()>;
}

/// Open handle on one namespace
pub struct Namespace<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    name: String,
    mode: OpenMode,
    entries: Entries,
    dirty: bool,
}

impl<'a, S: KeyValueStore + ?Sized> Namespace<'a, S> {
    /// Open `name`; read-only opens fail if the namespace does not exist
    pub fn open(store: &'a S, name: &str, mode: OpenMode) -> StoreResult<Self> {
        let entries = match (store.load_namespace(name)?, mode) {
            (Some(entries), _) => entries,
            (None, OpenMode::ReadWrite) => Entries::new(),
            (None, OpenMode::ReadOnly) => return Err(StoreError::Open(name.to_string())),
        };

        Ok(Self {
            store,
            name: name.to_string(),
            mode,
            entries,
            dirty: false,
        })
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(StoredValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_u8(&self, key: &str) -> Option<u8> {
        match self.entries.get(key) {
            Some(StoredValue::U8(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn set_str(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.set(key, StoredValue::Str(value.to_string()))
    }

    pub fn set_u8(&mut self, key: &str, value: u8) -> StoreResult<()> {
        self.set(key, StoredValue::U8(value))
    }

    /// Remove every key in the namespace
    pub fn erase_all(&mut self) -> StoreResult<()> {
        self.ensure_writable()?;
        self.entries.clear();
        self.dirty = true;
        Ok(())
    }

    /// Flush staged writes to the medium
    pub fn commit(&mut self) -> StoreResult<()> {
        self.ensure_writable()?;
        if !self.dirty {
            return Ok(());
        }
        self.store.store_namespace(&self.name, &self.entries)?;
        self.dirty = false;
        Ok(())
    }

    fn set(&mut self, key: &str, value: StoredValue) -> StoreResult<()> {
        self.ensure_writable()?;
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    fn ensure_writable(&self) -> StoreResult<()> {
        match self.mode {
            OpenMode::ReadWrite => Ok(()),
            OpenMode::ReadOnly => Err(StoreError::ReadOnly(self.name.clone())),
        }
    }
}
