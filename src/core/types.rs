//! Domain types for the HaLow station link

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::{LinkError, LinkResult};

/// Maximum SSID length in bytes
pub const MAX_SSID_LEN: usize = 32;

/// Maximum passphrase length in bytes
pub const MAX_PASSWORD_LEN: usize = 64;

/// Station link status as reported by the driver's status callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Disabled,
    Connecting,
    Connected,
}

impl LinkStatus {
    /// Whether the driver may move from `self` to `next`
    pub fn can_transition_to(self, next: LinkStatus) -> bool {
        matches!(
            (self, next),
            (LinkStatus::Disabled, LinkStatus::Connecting)
                | (LinkStatus::Connecting, LinkStatus::Connected)
                | (LinkStatus::Connecting, LinkStatus::Disabled)
                | (LinkStatus::Connected, LinkStatus::Disabled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinkStatus::Disabled => "DISABLED",
            LinkStatus::Connecting => "CONNECTING",
            LinkStatus::Connected => "CONNECTED",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link-state callback value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Down,
    Up,
}

/// Association security mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// WPA3 SAE, used when a passphrase is given
    Sae,
    /// Opportunistic wireless encryption for open networks
    Owe,
}

/// Station association arguments handed to the driver
#[derive(Clone, PartialEq, Eq)]
pub struct StaArgs {
    pub ssid: String,
    pub password: Option<String>,
    pub security: SecurityMode,
}

impl StaArgs {
    /// Validate lengths and pick the security mode
    pub fn new(ssid: &str, password: Option<&str>) -> LinkResult<Self> {
        if ssid.is_empty() || ssid.len() > MAX_SSID_LEN {
            return Err(LinkError::InvalidSsid(ssid.len()));
        }

        if let Some(password) = password {
            if password.is_empty() || password.len() > MAX_PASSWORD_LEN {
                return Err(LinkError::InvalidPassword(password.len()));
            }
        }

        let security = if password.is_some() {
            SecurityMode::Sae
        } else {
            SecurityMode::Owe
        };

        Ok(Self {
            ssid: ssid.to_string(),
            password: password.map(str::to_string),
            security,
        })
    }
}

impl fmt::Debug for StaArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaArgs")
            .field("ssid", &self.ssid)
            .field(
                "password",
                &if self.password.is_some() { "[SET]" } else { "[OPEN]" },
            )
            .field("security", &self.security)
            .finish()
    }
}

/// 48-bit hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode(self.0);
        for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            // chunks of an ASCII hex string are valid UTF-8
            f.write_str(std::str::from_utf8(pair).map_err(|_| fmt::Error)?)?;
        }
        Ok(())
    }
}

impl FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        let bytes = hex::decode(&digits).map_err(|e| format!("Invalid MAC address {s}: {e}"))?;
        let octets: [u8; 6] = bytes
            .try_into()
            .map_err(|_| format!("MAC address must have 6 octets: {s}"))?;
        Ok(MacAddr(octets))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A network reported by the scan-result callback
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanResult {
    pub bssid: MacAddr,
    pub ssid: String,
    /// Signal strength in dBm
    pub rssi: i16,
    /// Operating bandwidth in MHz
    pub bandwidth_mhz: u8,
}

/// Outcome of waiting for the pending attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    Connected,
    TimedOut,
    Failed,
}

/// Link status as presented to the command surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkStatusReport {
    pub state: LinkStatus,
    pub connected: bool,
    pub ssid: Option<String>,
}

/// Firmware and hardware identification from the driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverVersion {
    pub library_version: String,
    pub firmware_version: String,
    pub chip_id: u32,
    pub mac_addr: MacAddr,
}

/// Result of the start-up auto-connect run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AutoConnectOutcome {
    /// Nothing saved, no attempt made
    NoCredential,
    Connected { attempt: u32 },
    /// All attempts used; a manual connect is required
    Exhausted { attempts: u32 },
    Disabled,
}

/// Session identifier for transport connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
