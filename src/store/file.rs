//! JSON file-backed key-value store

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    core::error::StoreResult,
    store::{Entries, KeyValueStore},
};

type Namespaces = BTreeMap<String, Entries>;

/// Stores every namespace in one JSON document
///
/// Writes go to a sibling temporary file which is then renamed over the
/// original, so a crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StoreResult<Namespaces> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Namespaces::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Namespaces::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn load_namespace(&self, namespace: &str) -> StoreResult<Option<Entries>> {
        Ok(self.read_all()?.remove(namespace))
    }

    fn store_namespace(&self, namespace: &str, entries: &Entries) -> StoreResult<()> {
        let mut all = self.read_all()?;
        all.insert(namespace.to_string(), entries.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&all)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), namespace, "Namespace committed");
        Ok(())
    }
}
