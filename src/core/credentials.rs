//! Last-known-good network credential persistence

use std::{fmt, sync::Arc};

use tracing::{debug, info};

use crate::{
    core::error::{StoreError, StoreResult},
    store::{KeyValueStore, Namespace, OpenMode},
};

/// Namespace holding the auto-connect record
pub const NAMESPACE: &str = "halow_auto";

const KEY_SSID: &str = "ssid";
const KEY_PASSWORD: &str = "password";
const KEY_VALID: &str = "valid";

/// Credential of the last successfully joined network
#[derive(Clone, PartialEq, Eq)]
pub struct SavedCredential {
    pub ssid: String,
    /// `None` for open networks (stored as an empty string)
    pub password: Option<String>,
}

impl fmt::Debug for SavedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavedCredential")
            .field("ssid", &self.ssid)
            .field(
                "password",
                &if self.password.is_some() { "[SET]" } else { "[OPEN]" },
            )
            .finish()
    }
}

/// What `save` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// Identical record already stored, medium untouched
    Unchanged,
}

/// Single-record credential store on top of a key-value partition
pub struct CredentialStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> Clone for CredentialStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Load the saved credential
    ///
    /// Returns `None` when the store is unavailable, the record is not
    /// marked valid, or a field is missing.
    pub fn load(&self) -> Option<SavedCredential> {
        let ns = match Namespace::open(self.store.as_ref(), NAMESPACE, OpenMode::ReadOnly) {
            Ok(ns) => ns,
            Err(e) => {
                debug!("No saved network config found: {}", e);
                return None;
            }
        };

        if ns.get_u8(KEY_VALID) != Some(1) {
            debug!("Network config not valid or missing");
            return None;
        }

        let ssid = ns.get_str(KEY_SSID).filter(|s| !s.is_empty())?;
        let password = ns.get_str(KEY_PASSWORD)?;

        Some(SavedCredential {
            ssid: ssid.to_string(),
            password: (!password.is_empty()).then(|| password.to_string()),
        })
    }

    /// Persist `ssid`/`password` unless the identical record is already stored
    pub fn save(&self, ssid: &str, password: Option<&str>) -> StoreResult<SaveOutcome> {
        if ssid.is_empty() {
            return Err(StoreError::InvalidCredential("empty SSID".into()));
        }

        let password = password.filter(|p| !p.is_empty());
        if let Some(saved) = self.load() {
            if saved.ssid == ssid && saved.password.as_deref() == password {
                info!(ssid, "Network config unchanged, skipping flash write");
                return Ok(SaveOutcome::Unchanged);
            }
        }

        let mut ns = Namespace::open(self.store.as_ref(), NAMESPACE, OpenMode::ReadWrite)?;
        ns.set_str(KEY_SSID, ssid)?;
        ns.set_str(KEY_PASSWORD, password.unwrap_or(""))?;
        ns.set_u8(KEY_VALID, 1)?;
        ns.commit()?;

        info!(ssid, "Network config saved");
        Ok(SaveOutcome::Written)
    }

    /// Erase the saved record
    pub fn clear(&self) -> StoreResult<()> {
        let mut ns = Namespace::open(self.store.as_ref(), NAMESPACE, OpenMode::ReadWrite)?;
        ns.erase_all()?;
        ns.commit()?;

        info!("Network config cleared");
        Ok(())
    }
}
