//! HaLow Link Manager
//!
//! Station-mode link management for an 802.11ah (HaLow) radio:
//! - Connection state machine driven by asynchronous driver callbacks
//! - Scan coordination with streamed results
//! - Persistence of the last good credential and auto-connect on start
//! - Regulatory channel lists per country
//!
//! A JSON-RPC 2.0 command surface is served over a Unix domain socket.

pub mod config;
pub mod core;
pub mod driver;
pub mod protocol;
pub mod store;
pub mod transport;

pub use crate::core::{
    auto_connect::AutoConnectPolicy,
    error::{DriverError, LinkError, StoreError, TransportError},
    scanner::ScanStream,
    service::{LinkConfig, LinkManager},
    types::{LinkStatus, LinkStatusReport, ScanResult, WaitOutcome},
};
