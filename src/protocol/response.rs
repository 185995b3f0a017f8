//! Response message types

use serde::{Deserialize, Serialize};

use crate::core::types::{AutoConnectOutcome, DriverVersion, LinkStatusReport, WaitOutcome};

/// Response messages from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    /// Start response
    Start(StartResponse),

    /// Scan finished response
    ScanComplete(ScanCompleteResponse),

    /// Wait outcome response
    WaitConnected(WaitConnectedResponse),

    /// Status response
    Status(StatusResponse),

    /// Version response
    Version(VersionResponse),

    /// Plain acknowledgement (stop, connect, clear_credentials)
    Ack(AckResponse),
}

/// Response for start request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartResponse {
    pub status: String,
    pub already_started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_connect: Option<AutoConnectOutcome>,
}

/// Response sent once a scan has completed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanCompleteResponse {
    pub status: String,
    pub count: u32,
}

/// Response for wait_connected request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaitConnectedResponse {
    pub status: String,
    pub outcome: WaitOutcome,
}

/// Response for status request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    #[serde(flatten)]
    pub link: LinkStatusReport,
}

/// Response for version request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionResponse {
    pub status: String,
    #[serde(flatten)]
    pub version: DriverVersion,
}

/// Acknowledgement without payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AckResponse {
    pub status: String,
}

impl StartResponse {
    /// `None` means the link manager was already running
    pub fn ok(auto_connect: Option<AutoConnectOutcome>) -> Self {
        Self {
            status: "ok".to_string(),
            already_started: auto_connect.is_none(),
            auto_connect,
        }
    }
}

impl ScanCompleteResponse {
    pub fn ok(count: u32) -> Self {
        Self {
            status: "ok".to_string(),
            count,
        }
    }
}

impl WaitConnectedResponse {
    pub fn ok(outcome: WaitOutcome) -> Self {
        Self {
            status: "ok".to_string(),
            outcome,
        }
    }
}

impl StatusResponse {
    pub fn ok(link: LinkStatusReport) -> Self {
        Self {
            status: "ok".to_string(),
            link,
        }
    }
}

impl VersionResponse {
    pub fn ok(version: DriverVersion) -> Self {
        Self {
            status: "ok".to_string(),
            version,
        }
    }
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{LinkStatus, MacAddr};

    #[test]
    fn test_start_response() {
        let response = StartResponse::ok(Some(AutoConnectOutcome::NoCredential));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""already_started":false"#));
        assert!(json.contains(r#""outcome":"no_credential""#));

        let again = serde_json::to_string(&StartResponse::ok(None)).unwrap();
        assert_eq!(again, r#"{"status":"ok","already_started":true}"#);
    }

    #[test]
    fn test_scan_complete_response() {
        let response = ScanCompleteResponse::ok(4);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"status":"ok","count":4}"#);
    }

    #[test]
    fn test_wait_connected_response() {
        let json = serde_json::to_string(&WaitConnectedResponse::ok(WaitOutcome::TimedOut)).unwrap();
        assert!(json.contains(r#""outcome":"timed_out""#));
    }

    #[test]
    fn test_status_response() {
        let response = StatusResponse::ok(LinkStatusReport {
            state: LinkStatus::Connected,
            connected: true,
            ssid: Some("testnet".to_string()),
        });
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""status":"ok""#));
        assert!(json.contains(r#""state":"connected""#));
        assert!(json.contains(r#""connected":true"#));
        assert!(json.contains(r#""ssid":"testnet""#));
    }

    #[test]
    fn test_version_response() {
        let response = VersionResponse::ok(DriverVersion {
            library_version: "2.7.0".to_string(),
            firmware_version: "1.14.3".to_string(),
            chip_id: 0x0306,
            mac_addr: MacAddr([0x0c, 0xbf, 0x74, 0, 0, 1]),
        });
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""chip_id":774"#));
        assert!(json.contains(r#""mac_addr":"0c:bf:74:00:00:01""#));
    }

    #[test]
    fn test_ack_response() {
        let json = serde_json::to_string(&Response::Ack(AckResponse::ok())).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);
    }
}
