//! Radio driver trait definition

use std::sync::Arc;

use trait_variant::make;

use crate::core::{
    error::DriverResult,
    regdb::ChannelList,
    types::{DriverVersion, LinkState, LinkStatus, ScanResult, StaArgs},
};

/// Link-state callback, invoked on link up/down
pub type LinkCallback = Arc<dyn Fn(LinkState) + Send + Sync>;

/// Per-connection station status callback
pub type StatusCallback = Arc<dyn Fn(LinkStatus) + Send + Sync>;

/// Invoked once per network found during a scan
pub type ScanResultCallback = Arc<dyn Fn(ScanResult) + Send + Sync>;

/// Invoked once when a scan finishes
pub type ScanCompleteCallback = Arc<dyn Fn() + Send + Sync>;

/// Abstraction over the HaLow radio SDK
///
/// Every call is non-blocking: operations with an asynchronous outcome
/// return as soon as the request is accepted and report their result later
/// through the supplied callbacks. Callbacks run on the driver's own
/// execution context and must not assume anything about the caller's.
#[make(Send)]
pub trait RadioDriver: Send + Sync + 'static {
    /// Configure the regulatory channel list; must precede `boot`
    async fn set_channel_list(&self, channels: &'static ChannelList) -> DriverResult<()>;

    /// Register (or with `None`, unregister) the link-state callback
    async fn register_link_callback(&self, callback: Option<LinkCallback>) -> DriverResult<()>;

    /// Boot the WLAN interface
    async fn boot(&self) -> DriverResult<()>;

    /// Enable station mode and start associating
    ///
    /// `on_status` receives every station state change of this association.
    async fn sta_enable(&self, args: &StaArgs, on_status: StatusCallback) -> DriverResult<()>;

    /// Disable station mode
    ///
    /// Whether an in-flight association is aborted is up to the hardware.
    async fn sta_disable(&self) -> DriverResult<()>;

    /// Start a scan
    async fn scan_request(
        &self,
        on_result: ScanResultCallback,
        on_complete: ScanCompleteCallback,
    ) -> DriverResult<()>;

    /// Firmware, chip and MAC identification
    async fn version(&self) -> DriverResult<DriverVersion>;
}
