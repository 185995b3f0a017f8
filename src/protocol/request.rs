//! Request message types

use serde::{Deserialize, Serialize};

/// Request messages from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", content = "params")]
#[serde(rename_all = "snake_case")]
pub enum Request {
    /// Boot the interface (if needed) and run auto-connect
    Start,

    /// Disable station mode
    Stop,

    /// Scan; results are streamed as notifications
    Scan,

    /// Connect to a HaLow network
    Connect(ConnectParams),

    /// Wait for the pending connection attempt
    WaitConnected(WaitConnectedParams),

    /// Get link status
    Status,

    /// Get driver and firmware versions
    Version,

    /// Forget the saved network
    ClearCredentials,
}

/// Parameters for connect request
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectParams {
    /// Network SSID
    pub ssid: String,

    /// Passphrase; omit for open networks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectParams")
            .field("ssid", &self.ssid)
            .field(
                "password",
                &if self.password.is_some() { "[SET]" } else { "[OPEN]" },
            )
            .finish()
    }
}

/// Parameters for wait_connected request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaitConnectedParams {
    #[serde(default = "default_wait_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_wait_timeout_ms() -> u64 {
    5000
}
