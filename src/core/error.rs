//! Error types for the HaLow link manager

use thiserror::Error;

/// Result type for radio driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Result type for key-value store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for link manager operations
pub type LinkResult<T> = Result<T, LinkError>;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Synchronous rejections reported by the radio driver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Failed to set channel list for {0}")]
    ChannelList(String),

    #[error("Failed to register {0} callback")]
    Registration(&'static str),

    #[error("Failed to boot interface: {0}")]
    Boot(String),

    #[error("Failed to enable STA mode: status {0}")]
    Enable(i32),

    #[error("Failed to start scan: status {0}")]
    ScanRequest(i32),

    #[error("Interface not booted")]
    NotBooted,

    #[error("Driver unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by the persistent key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open namespace '{0}'")]
    Open(String),

    #[error("Namespace '{0}' is opened read-only")]
    ReadOnly(String),

    #[error("Failed to write key '{0}'")]
    Write(String),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Store task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors returned by the link manager
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Invalid SSID length: {0} bytes (expected 1..=32)")]
    InvalidSsid(usize),

    #[error("Invalid password length: {0} bytes (expected 1..=64)")]
    InvalidPassword(usize),

    #[error("Unknown country code: {0}")]
    UnknownCountryCode(String),

    #[error("Operation already in progress")]
    Busy,

    #[error("Link manager not started")]
    NotStarted,

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl LinkError {
    /// Malformed input detected before touching the driver
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LinkError::InvalidSsid(_)
                | LinkError::InvalidPassword(_)
                | LinkError::UnknownCountryCode(_)
        )
    }
}

/// Errors related to the command transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session closed")]
    SessionClosed,
}
