//! Simulated HaLow radio
//!
//! Models a handful of access points in-process. Every callback is invoked
//! from a task spawned by the radio itself, never from the caller of the
//! request, so the link manager sees the same concurrency it would with a
//! real SDK.

use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::debug;

use crate::{
    core::{
        error::{DriverError, DriverResult},
        regdb::ChannelList,
        types::{
            DriverVersion, LinkState, LinkStatus, MacAddr, ScanResult, SecurityMode, StaArgs,
        },
    },
    driver::{LinkCallback, RadioDriver, ScanCompleteCallback, ScanResultCallback, StatusCallback},
};

const DEFAULT_LATENCY: Duration = Duration::from_millis(50);
const SIM_MAC: MacAddr = MacAddr([0x0c, 0xbf, 0x74, 0x00, 0x00, 0x01]);

/// An access point visible to the simulated radio
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulatedNetwork {
    pub ssid: String,
    /// `None` for open (OWE) networks
    #[serde(default)]
    pub password: Option<String>,
    pub bssid: MacAddr,
    pub rssi: i16,
    #[serde(default = "default_bandwidth")]
    pub bandwidth_mhz: u8,
}

fn default_bandwidth() -> u8 {
    1
}

impl SimulatedNetwork {
    fn accepts(&self, args: &StaArgs) -> bool {
        if self.ssid != args.ssid {
            return false;
        }
        match args.security {
            SecurityMode::Sae => self.password.is_some() && self.password == args.password,
            SecurityMode::Owe => self.password.is_none(),
        }
    }

    fn scan_result(&self) -> ScanResult {
        ScanResult {
            bssid: self.bssid,
            ssid: self.ssid.clone(),
            rssi: self.rssi,
            bandwidth_mhz: self.bandwidth_mhz,
        }
    }
}

/// How the simulated radio answers `sta_enable`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectBehavior {
    /// Associate when a matching network exists, fail otherwise
    Normal,
    /// Accept the request and never call back
    NeverRespond,
    /// Report connecting, then disabled
    AlwaysFail,
}

struct SimState {
    networks: Vec<SimulatedNetwork>,
    latency: Duration,
    behavior: ConnectBehavior,
    fail_boot: bool,
    reject_enable: bool,
    reject_scan: bool,
    silent_scan: bool,
    booted: bool,
    country_code: Option<&'static str>,
    link_callback: Option<LinkCallback>,
    status_callback: Option<StatusCallback>,
    associated: bool,
    association: Option<JoinHandle<()>>,
    boot_calls: usize,
    enable_calls: usize,
    scan_calls: usize,
    last_sta_args: Option<StaArgs>,
}

/// In-process radio used for bench runs and tests
#[derive(Clone)]
pub struct SimulatedRadio {
    inner: Arc<Mutex<SimState>>,
}

impl SimulatedRadio {
    pub fn new(networks: Vec<SimulatedNetwork>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimState {
                networks,
                latency: DEFAULT_LATENCY,
                behavior: ConnectBehavior::Normal,
                fail_boot: false,
                reject_enable: false,
                reject_scan: false,
                silent_scan: false,
                booted: false,
                country_code: None,
                link_callback: None,
                status_callback: None,
                associated: false,
                association: None,
                boot_calls: 0,
                enable_calls: 0,
                scan_calls: 0,
                last_sta_args: None,
            })),
        }
    }

    /// Load the access point list from a JSON array
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub async fn set_latency(&self, latency: Duration) {
        self.inner.lock().await.latency = latency;
    }

    pub async fn set_connect_behavior(&self, behavior: ConnectBehavior) {
        self.inner.lock().await.behavior = behavior;
    }

    pub async fn set_boot_failure(&self, should_fail: bool) {
        self.inner.lock().await.fail_boot = should_fail;
    }

    /// Reject `sta_enable` synchronously
    pub async fn set_enable_rejection(&self, should_reject: bool) {
        self.inner.lock().await.reject_enable = should_reject;
    }

    /// Reject `scan_request` synchronously
    pub async fn set_scan_rejection(&self, should_reject: bool) {
        self.inner.lock().await.reject_scan = should_reject;
    }

    /// Accept `scan_request` but never report results or completion
    pub async fn set_scan_silent(&self, silent: bool) {
        self.inner.lock().await.silent_scan = silent;
    }

    pub async fn boot_calls(&self) -> usize {
        self.inner.lock().await.boot_calls
    }

    pub async fn enable_calls(&self) -> usize {
        self.inner.lock().await.enable_calls
    }

    pub async fn scan_calls(&self) -> usize {
        self.inner.lock().await.scan_calls
    }

    pub async fn last_sta_args(&self) -> Option<StaArgs> {
        self.inner.lock().await.last_sta_args.clone()
    }

    pub async fn country_code(&self) -> Option<&'static str> {
        self.inner.lock().await.country_code
    }

    /// Drop the current association as if the access point went away
    pub async fn drop_link(&self) {
        let mut state = self.inner.lock().await;
        if !state.associated {
            return;
        }
        state.associated = false;
        let link = state.link_callback.clone();
        let status = state.status_callback.clone();
        drop(state);

        tokio::spawn(async move {
            if let Some(link) = link {
                link(LinkState::Down);
            }
            if let Some(status) = status {
                status(LinkStatus::Disabled);
            }
        });
    }

    async fn associate(inner: Arc<Mutex<SimState>>, args: StaArgs, on_status: StatusCallback) {
        let (latency, behavior, accepted) = {
            let state = inner.lock().await;
            let accepted = state.networks.iter().any(|n| n.accepts(&args));
            (state.latency, state.behavior, accepted)
        };

        if behavior == ConnectBehavior::NeverRespond {
            debug!(ssid = %args.ssid, "Simulated radio swallowing association");
            return;
        }

        tokio::time::sleep(latency).await;
        on_status(LinkStatus::Connecting);
        tokio::time::sleep(latency).await;

        if behavior == ConnectBehavior::Normal && accepted {
            let link = {
                let mut state = inner.lock().await;
                state.associated = true;
                state.link_callback.clone()
            };
            on_status(LinkStatus::Connected);
            if let Some(link) = link {
                link(LinkState::Up);
            }
        } else {
            on_status(LinkStatus::Disabled);
        }
    }
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RadioDriver for SimulatedRadio {
    async fn set_channel_list(&self, channels: &'static ChannelList) -> DriverResult<()> {
        let mut state = self.inner.lock().await;
        if state.booted {
            return Err(DriverError::ChannelList(channels.country_code.to_string()));
        }
        state.country_code = Some(channels.country_code);
        Ok(())
    }

    async fn register_link_callback(&self, callback: Option<LinkCallback>) -> DriverResult<()> {
        self.inner.lock().await.link_callback = callback;
        Ok(())
    }

    async fn boot(&self) -> DriverResult<()> {
        let mut state = self.inner.lock().await;
        state.boot_calls += 1;
        if state.fail_boot {
            return Err(DriverError::Boot("simulated boot failure".into()));
        }
        if state.country_code.is_none() {
            return Err(DriverError::Boot("channel list not set".into()));
        }
        state.booted = true;
        Ok(())
    }

    async fn sta_enable(&self, args: &StaArgs, on_status: StatusCallback) -> DriverResult<()> {
        let mut state = self.inner.lock().await;
        state.enable_calls += 1;
        state.last_sta_args = Some(args.clone());

        if !state.booted {
            return Err(DriverError::NotBooted);
        }
        if state.reject_enable {
            return Err(DriverError::Enable(-1));
        }

        if let Some(task) = state.association.take() {
            task.abort();
        }

        // Re-enabling tears down the current association first
        let previous = state.status_callback.replace(on_status.clone());
        let was_associated = std::mem::replace(&mut state.associated, false);
        let link = state.link_callback.clone();

        let inner = self.inner.clone();
        let args = args.clone();
        state.association = Some(tokio::spawn(async move {
            if was_associated {
                if let Some(link) = link {
                    link(LinkState::Down);
                }
                if let Some(previous) = previous {
                    previous(LinkStatus::Disabled);
                }
            }
            Self::associate(inner, args, on_status).await;
        }));

        Ok(())
    }

    async fn sta_disable(&self) -> DriverResult<()> {
        let mut state = self.inner.lock().await;
        if let Some(task) = state.association.take() {
            task.abort();
        }

        let status = state.status_callback.take();
        if std::mem::replace(&mut state.associated, false) {
            let link = state.link_callback.clone();
            tokio::spawn(async move {
                if let Some(link) = link {
                    link(LinkState::Down);
                }
                if let Some(status) = status {
                    status(LinkStatus::Disabled);
                }
            });
        }
        Ok(())
    }

    async fn scan_request(
        &self,
        on_result: ScanResultCallback,
        on_complete: ScanCompleteCallback,
    ) -> DriverResult<()> {
        let mut state = self.inner.lock().await;
        state.scan_calls += 1;

        if !state.booted {
            return Err(DriverError::NotBooted);
        }
        if state.reject_scan {
            return Err(DriverError::ScanRequest(-1));
        }

        if state.silent_scan {
            return Ok(());
        }

        let results: Vec<ScanResult> = state.networks.iter().map(|n| n.scan_result()).collect();
        let latency = state.latency;

        tokio::spawn(async move {
            for result in results {
                tokio::time::sleep(latency).await;
                on_result(result);
            }
            tokio::time::sleep(latency).await;
            on_complete();
        });

        Ok(())
    }

    async fn version(&self) -> DriverResult<DriverVersion> {
        if !self.inner.lock().await.booted {
            return Err(DriverError::NotBooted);
        }

        Ok(DriverVersion {
            library_version: "sim-2.7.0".into(),
            firmware_version: "sim-1.14.3".into(),
            chip_id: 0x0306,
            mac_addr: SIM_MAC,
        })
    }
}
