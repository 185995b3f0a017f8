//! HaLow link manager facade
//!
//! Driver callbacks never touch shared state directly. Each one pushes an
//! event tagged with the current registration epoch into a channel, and a
//! single coordinator task applies the events under the manager's lock.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, Notify, mpsc},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::{
    core::{
        auto_connect::{self, AutoConnectPolicy, Connector},
        connector::ConnectionStateMachine,
        credentials::{CredentialStore, SaveOutcome},
        error::{DriverError, LinkError, LinkResult, StoreError, StoreResult},
        flags::{EventFlags, Flags},
        regdb,
        scanner::{ScanStateMachine, ScanStream},
        types::{
            AutoConnectOutcome, DriverVersion, LinkState, LinkStatus, LinkStatusReport,
            ScanResult, StaArgs, WaitOutcome,
        },
    },
    driver::{LinkCallback, RadioDriver, ScanCompleteCallback, ScanResultCallback, StatusCallback},
    store::KeyValueStore,
};

/// Link manager configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Regulatory domain, resolved when the interface boots
    pub country_code: String,
    /// Retry policy for the saved network; `None` disables auto-connect
    pub auto_connect: Option<AutoConnectPolicy>,
    /// How long an unanswered attempt blocks a new `connect`
    pub pending_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        let policy = AutoConnectPolicy::default();
        Self {
            country_code: "US".to_string(),
            auto_connect: Some(policy),
            pending_timeout: policy.attempt_timeout,
        }
    }
}

#[derive(Debug)]
enum DriverEvent {
    Link(LinkState),
    Status { attempt: u64, status: LinkStatus },
    ScanResult { session: u64, result: ScanResult },
    ScanComplete { session: u64 },
}

#[derive(Debug)]
struct Tagged {
    epoch: u64,
    event: DriverEvent,
}

/// Builds driver callbacks that feed the coordinator
#[derive(Clone)]
struct EventSink(mpsc::UnboundedSender<Tagged>);

impl EventSink {
    fn push(&self, epoch: u64, event: DriverEvent) {
        // Only fails once the coordinator is gone
        if self.0.send(Tagged { epoch, event }).is_err() {
            debug!("Link manager gone, dropping driver callback");
        }
    }

    fn link(&self, epoch: u64) -> LinkCallback {
        let sink = self.clone();
        Arc::new(move |state: LinkState| sink.push(epoch, DriverEvent::Link(state)))
    }

    fn status(&self, epoch: u64, attempt: u64) -> StatusCallback {
        let sink = self.clone();
        Arc::new(move |status: LinkStatus| {
            sink.push(epoch, DriverEvent::Status { attempt, status })
        })
    }

    fn scan(&self, epoch: u64, session: u64) -> (ScanResultCallback, ScanCompleteCallback) {
        let result_sink = self.clone();
        let on_result: ScanResultCallback = Arc::new(move |result: ScanResult| {
            result_sink.push(epoch, DriverEvent::ScanResult { session, result })
        });

        let complete_sink = self.clone();
        let on_complete: ScanCompleteCallback = Arc::new(move || {
            complete_sink.push(epoch, DriverEvent::ScanComplete { session })
        });

        (on_result, on_complete)
    }
}

struct ManagerState {
    booted: bool,
    started: bool,
    /// Bumped by `stop`; events tagged with an older epoch are stale
    epoch: u64,
    connection: ConnectionStateMachine,
    scan: ScanStateMachine,
}

struct Shared<D: RadioDriver, S: KeyValueStore> {
    driver: Arc<D>,
    credentials: CredentialStore<S>,
    config: LinkConfig,
    state: Mutex<ManagerState>,
    /// Serializes credential store access
    persistence: Mutex<()>,
    flags: EventFlags,
    link_up: Notify,
    events: EventSink,
}

impl<D: RadioDriver, S: KeyValueStore> Shared<D, S> {
    /// Run a credential store operation on the blocking pool
    async fn with_credentials<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&CredentialStore<S>) -> StoreResult<T> + Send + 'static,
    {
        let _guard = self.persistence.lock().await;
        let credentials = self.credentials.clone();
        tokio::task::spawn_blocking(move || op(&credentials))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

/// Station-mode link manager
///
/// Owns the connection and scan state machines for one radio, persists the
/// last good credential and runs auto-connect on start.
pub struct LinkManager<D: RadioDriver, S: KeyValueStore> {
    shared: Arc<Shared<D, S>>,
    coordinator: JoinHandle<()>,
}

impl<D: RadioDriver, S: KeyValueStore> LinkManager<D, S> {
    /// Create a link manager; must be called within a tokio runtime
    pub fn new(driver: Arc<D>, store: Arc<S>, config: LinkConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            driver,
            credentials: CredentialStore::new(store),
            config,
            persistence: Mutex::new(()),
            state: Mutex::new(ManagerState {
                booted: false,
                started: false,
                epoch: 0,
                connection: ConnectionStateMachine::new(),
                scan: ScanStateMachine::new(),
            }),
            flags: EventFlags::new(),
            link_up: Notify::new(),
            events: EventSink(tx),
        });

        let coordinator = tokio::spawn(coordinate(shared.clone(), rx));

        Self {
            shared,
            coordinator,
        }
    }

    /// Bring the interface up and run auto-connect
    ///
    /// Returns `None` when already started. Boots the radio on first use;
    /// a restarted interface only gets its link callback re-registered.
    pub async fn start(&self) -> LinkResult<Option<AutoConnectOutcome>> {
        {
            let mut state = self.shared.state.lock().await;
            if state.started {
                warn!("HaLow already started");
                return Ok(None);
            }

            let on_link = self.shared.events.link(state.epoch);
            let driver = &self.shared.driver;

            if !state.booted {
                let country = &self.shared.config.country_code;
                let channels = regdb::lookup(country).ok_or_else(|| {
                    error!(country = %country, "Could not find regulatory domain");
                    LinkError::UnknownCountryCode(country.clone())
                })?;

                driver.set_channel_list(channels).await?;
                driver.register_link_callback(Some(on_link)).await?;
                driver.boot().await?;
                state.booted = true;

                info!(
                    country = channels.country_code,
                    channels = channels.channels.len(),
                    "HaLow interface booted"
                );
            } else {
                info!("Re-registering HaLow callbacks for restarted interface");
                if let Err(e) = driver.register_link_callback(Some(on_link)).await {
                    error!("Failed to register link state callback: {}", e);
                }
            }

            state.started = true;
            info!("HaLow started");
        }

        let outcome = match &self.shared.config.auto_connect {
            Some(policy) => {
                let credential = self
                    .shared
                    .with_credentials(|c| Ok(c.load()))
                    .await
                    .unwrap_or_else(|e| {
                        error!("Failed to load network config: {}", e);
                        None
                    });
                auto_connect::run(self, credential, policy).await
            }
            None => AutoConnectOutcome::Disabled,
        };
        Ok(Some(outcome))
    }

    /// Disable station mode and stop listening to the driver
    ///
    /// Idempotent. An association already in flight may still complete in
    /// hardware; its callbacks are ignored.
    pub async fn stop(&self) {
        let mut state = self.shared.state.lock().await;
        if !state.started {
            warn!("HaLow not started");
            return;
        }

        state.epoch += 1;
        state.started = false;
        state.connection.force_disabled();
        if state.scan.in_progress() {
            state.scan.rollback();
        }
        self.shared.flags.clear(Flags::CONNECTED);

        if let Err(e) = self.shared.driver.sta_disable().await {
            error!("Failed to disable STA mode: {}", e);
        }
        if let Err(e) = self.shared.driver.register_link_callback(None).await {
            error!("Failed to unregister link state callback: {}", e);
        }

        info!("HaLow stopped");
    }

    /// Issue an association and return without waiting for its outcome
    pub async fn connect(&self, ssid: &str, password: Option<&str>) -> LinkResult<()> {
        let args = StaArgs::new(ssid, password)?;

        let mut state = self.shared.state.lock().await;
        if !state.started {
            return Err(LinkError::NotStarted);
        }

        let attempt =
            state
                .connection
                .begin_attempt(&args, Instant::now(), self.shared.config.pending_timeout)?;
        self.shared.flags.clear(Flags::CONNECTED | Flags::FAILED);

        info!(
            ssid = %args.ssid,
            security = ?args.security,
            attempt,
            "Connecting to HaLow network"
        );

        let on_status = self.shared.events.status(state.epoch, attempt);
        if let Err(e) = self.shared.driver.sta_enable(&args, on_status).await {
            error!(ssid = %args.ssid, "Failed to enable STA mode: {}", e);
            state.connection.abort_attempt(attempt);
            if state.connection.status() == LinkStatus::Connected {
                self.shared.flags.set(Flags::CONNECTED);
            }
            return Err(e.into());
        }

        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.shared.state.lock().await.connection.status() == LinkStatus::Connected
    }

    /// Wait for the current attempt to connect or fail
    pub async fn wait_connected(&self, timeout: Duration) -> WaitOutcome {
        match self
            .shared
            .flags
            .wait_any(Flags::CONNECTED | Flags::FAILED, timeout)
            .await
        {
            Some(flags) if flags.contains(Flags::CONNECTED) => WaitOutcome::Connected,
            Some(_) => WaitOutcome::Failed,
            None => WaitOutcome::TimedOut,
        }
    }

    /// Wait for the next link-up notification
    pub async fn wait_link_up(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.shared.link_up.notified())
            .await
            .is_ok()
    }

    pub async fn status(&self) -> LinkStatusReport {
        self.shared.state.lock().await.connection.report()
    }

    /// Start a scan; results arrive on the returned stream
    pub async fn scan(&self) -> LinkResult<ScanStream> {
        let mut state = self.shared.state.lock().await;
        if !state.started {
            return Err(LinkError::NotStarted);
        }

        let stream = state.scan.start()?;
        self.shared.flags.clear(Flags::SCAN_DONE);

        let (on_result, on_complete) = self.shared.events.scan(state.epoch, state.scan.session());
        if let Err(e) = self
            .shared
            .driver
            .scan_request(on_result, on_complete)
            .await
        {
            error!("Failed to start scan: {}", e);
            state.scan.rollback();
            return Err(e.into());
        }

        info!("HaLow scan initiated");
        Ok(stream)
    }

    /// Give up on the running scan
    ///
    /// For drivers that never report completion. Late callbacks of the
    /// abandoned session are ignored.
    pub async fn abort_scan(&self) {
        let mut state = self.shared.state.lock().await;
        if state.scan.in_progress() {
            warn!(count = state.scan.result_count(), "Abandoning unfinished scan");
            state.scan.rollback();
        }
    }

    /// Wait until the running scan completes
    pub async fn wait_done(&self, timeout: Duration) -> bool {
        self.shared
            .flags
            .wait_any(Flags::SCAN_DONE, timeout)
            .await
            .is_some()
    }

    pub async fn scan_in_progress(&self) -> bool {
        self.shared.state.lock().await.scan.in_progress()
    }

    /// Results delivered by the current or last scan
    pub async fn scan_result_count(&self) -> u32 {
        self.shared.state.lock().await.scan.result_count()
    }

    /// Firmware and hardware identification; needs a booted interface
    pub async fn version(&self) -> LinkResult<DriverVersion> {
        if !self.shared.state.lock().await.booted {
            return Err(DriverError::NotBooted.into());
        }
        Ok(self.shared.driver.version().await?)
    }

    /// Forget the saved network
    pub async fn clear_credentials(&self) -> LinkResult<()> {
        Ok(self.shared.with_credentials(|c| c.clear()).await?)
    }
}

impl<D: RadioDriver, S: KeyValueStore> Connector for LinkManager<D, S> {
    async fn connect(&self, ssid: &str, password: Option<&str>) -> LinkResult<()> {
        LinkManager::connect(self, ssid, password).await
    }

    async fn wait_connected(&self, timeout: Duration) -> WaitOutcome {
        LinkManager::wait_connected(self, timeout).await
    }
}

impl<D: RadioDriver, S: KeyValueStore> Drop for LinkManager<D, S> {
    fn drop(&mut self) {
        self.coordinator.abort();
    }
}

async fn coordinate<D: RadioDriver, S: KeyValueStore>(
    shared: Arc<Shared<D, S>>,
    mut events: mpsc::UnboundedReceiver<Tagged>,
) {
    while let Some(Tagged { epoch, event }) = events.recv().await {
        let mut state = shared.state.lock().await;
        if epoch != state.epoch {
            warn!(?event, "Ignoring driver callback from before stop");
            continue;
        }

        match event {
            DriverEvent::Link(LinkState::Up) => {
                info!("HaLow link is up");
                shared.link_up.notify_one();
            }
            DriverEvent::Link(LinkState::Down) => {
                info!("HaLow link is down");
                shared.flags.clear(Flags::CONNECTED);
            }
            DriverEvent::Status { attempt, status } => {
                debug!(attempt, %status, "Station status callback");
                let effect = state.connection.apply_status(attempt, status);
                if effect.stale {
                    continue;
                }

                // Persist before waiters are woken so a returned `Connected`
                // implies the credential is on the medium. The lock is not
                // held meanwhile.
                if let Some((ssid, password)) = effect.save {
                    drop(state);
                    let saved_ssid = ssid.clone();
                    match shared
                        .with_credentials(move |c| c.save(&ssid, password.as_deref()))
                        .await
                    {
                        Ok(SaveOutcome::Written) => debug!(ssid = %saved_ssid, "Credential written"),
                        Ok(SaveOutcome::Unchanged) => {}
                        Err(e) => error!(ssid = %saved_ssid, "Failed to save network config: {}", e),
                    }

                    state = shared.state.lock().await;
                    if state.epoch != epoch || !state.connection.is_current(attempt) {
                        debug!(attempt, "Connection attempt replaced while saving credential");
                        continue;
                    }
                }

                if effect.connected {
                    shared.flags.set(Flags::CONNECTED);
                } else {
                    shared.flags.clear(Flags::CONNECTED);
                }
                if effect.failed {
                    shared.flags.set(Flags::FAILED);
                }
            }
            DriverEvent::ScanResult { session, result } => {
                if session != state.scan.session() {
                    warn!(bssid = %result.bssid, "Ignoring result of an abandoned scan");
                    continue;
                }
                let (bssid, rssi, bandwidth) = (result.bssid, result.rssi, result.bandwidth_mhz);
                let ssid = result.ssid.clone();
                match state.scan.record_result(result) {
                    Some(index) => debug!(
                        index,
                        %bssid,
                        ssid = %ssid,
                        rssi,
                        bandwidth_mhz = bandwidth,
                        "Scan result"
                    ),
                    None => warn!(%bssid, "Scan result outside a scan session"),
                }
            }
            DriverEvent::ScanComplete { session } if session != state.scan.session() => {
                warn!("Ignoring completion of an abandoned scan");
            }
            DriverEvent::ScanComplete { .. } => match state.scan.complete() {
                Some(count) => {
                    info!(count, "Scan complete");
                    shared.flags.set(Flags::SCAN_DONE);
                }
                None => warn!("Scan completion outside a scan session"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        core::{credentials::SavedCredential, regdb::ChannelList, types::MacAddr},
        driver::{ConnectBehavior, SimulatedNetwork, SimulatedRadio},
        store::MemoryStore,
    };

    type Manager = LinkManager<SimulatedRadio, MemoryStore>;

    const WAIT: Duration = Duration::from_secs(1);

    fn network(ssid: &str, password: Option<&str>, last_octet: u8) -> SimulatedNetwork {
        SimulatedNetwork {
            ssid: ssid.into(),
            password: password.map(str::to_string),
            bssid: MacAddr([0x02, 0, 0, 0, 0, last_octet]),
            rssi: -60 - i16::from(last_octet),
            bandwidth_mhz: 2,
        }
    }

    fn manual_config() -> LinkConfig {
        LinkConfig {
            auto_connect: None,
            ..LinkConfig::default()
        }
    }

    fn setup(networks: Vec<SimulatedNetwork>, config: LinkConfig) -> (SimulatedRadio, Arc<MemoryStore>, Manager) {
        let radio = SimulatedRadio::new(networks);
        let store = Arc::new(MemoryStore::new());
        let manager = LinkManager::new(Arc::new(radio.clone()), store.clone(), config);
        (radio, store, manager)
    }

    fn saved(store: &Arc<MemoryStore>) -> Option<SavedCredential> {
        CredentialStore::new(store.clone()).load()
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_persists_credential() {
        let (_radio, store, manager) =
            setup(vec![network("testnet", Some("pw123"), 1)], manual_config());
        manager.start().await.unwrap();

        manager.connect("testnet", Some("pw123")).await.unwrap();
        assert_eq!(manager.wait_connected(WAIT).await, WaitOutcome::Connected);

        assert_eq!(
            manager.status().await,
            LinkStatusReport {
                state: LinkStatus::Connected,
                connected: true,
                ssid: Some("testnet".into()),
            }
        );
        assert!(manager.is_connected().await);
        assert_eq!(
            saved(&store),
            Some(SavedCredential {
                ssid: "testnet".into(),
                password: Some("pw123".into()),
            })
        );
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_to_saved_network_writes_nothing() {
        let (_radio, store, manager) = setup(
            vec![network("net1", Some("pw1"), 1)],
            LinkConfig::default(),
        );
        CredentialStore::new(store.clone())
            .save("net1", Some("pw1"))
            .unwrap();
        assert_eq!(store.commit_count(), 1);

        let outcome = manager.start().await.unwrap();
        assert_eq!(outcome, Some(AutoConnectOutcome::Connected { attempt: 1 }));
        assert!(manager.is_connected().await);
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_network_uses_owe() {
        let (radio, store, manager) = setup(vec![network("open", None, 1)], manual_config());
        manager.start().await.unwrap();

        manager.connect("open", None).await.unwrap();
        assert_eq!(manager.wait_connected(WAIT).await, WaitOutcome::Connected);

        let args = radio.last_sta_args().await.unwrap();
        assert_eq!(args.security, crate::core::types::SecurityMode::Owe);
        assert_eq!(saved(&store).unwrap().password, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_never_reaches_driver() {
        let (radio, _store, manager) = setup(Vec::new(), manual_config());
        manager.start().await.unwrap();

        let long_ssid = "s".repeat(33);
        let err = manager.connect(&long_ssid, Some("pw")).await.unwrap_err();
        assert!(err.is_validation());

        let long_password = "p".repeat(65);
        let err = manager
            .connect("net", Some(&long_password))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::InvalidPassword(65)));

        assert_eq!(radio.enable_calls().await, 0);
    }

    #[tokio::test]
    async fn test_connect_requires_start() {
        let (radio, _store, manager) = setup(Vec::new(), manual_config());
        assert!(matches!(
            manager.connect("net", None).await,
            Err(LinkError::NotStarted)
        ));
        assert!(matches!(manager.scan().await, Err(LinkError::NotStarted)));
        assert_eq!(radio.enable_calls().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_password_fails_without_saving() {
        let (_radio, store, manager) =
            setup(vec![network("testnet", Some("pw123"), 1)], manual_config());
        manager.start().await.unwrap();

        manager.connect("testnet", Some("wrong")).await.unwrap();
        assert_eq!(manager.wait_connected(WAIT).await, WaitOutcome::Failed);

        let status = manager.status().await;
        assert_eq!(status.state, LinkStatus::Disabled);
        assert_eq!(status.ssid, None);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_while_pending_is_busy_until_stale() {
        let (radio, _store, manager) =
            setup(vec![network("testnet", None, 1)], manual_config());
        radio.set_connect_behavior(ConnectBehavior::NeverRespond).await;
        manager.start().await.unwrap();

        manager.connect("testnet", None).await.unwrap();
        assert!(matches!(
            manager.connect("other", None).await,
            Err(LinkError::Busy)
        ));
        assert_eq!(radio.enable_calls().await, 1);

        assert_eq!(manager.wait_connected(WAIT).await, WaitOutcome::TimedOut);
        tokio::time::sleep(Duration::from_secs(5)).await;

        manager.connect("other", None).await.unwrap();
        assert_eq!(radio.enable_calls().await, 2);
        assert_eq!(radio.last_sta_args().await.unwrap().ssid, "other");
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_rejection_clears_pending_attempt() {
        let (radio, _store, manager) =
            setup(vec![network("testnet", None, 1)], manual_config());
        manager.start().await.unwrap();
        radio.set_enable_rejection(true).await;

        let err = manager.connect("testnet", None).await.unwrap_err();
        assert!(matches!(err, LinkError::Driver(DriverError::Enable(-1))));

        radio.set_enable_rejection(false).await;
        manager.connect("testnet", None).await.unwrap();
        assert_eq!(manager.wait_connected(WAIT).await, WaitOutcome::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_streams_results_and_rejects_overlap() {
        let (radio, _store, manager) = setup(
            vec![network("a", None, 1), network("b", Some("pw"), 2)],
            manual_config(),
        );
        manager.start().await.unwrap();

        let stream = manager.scan().await.unwrap();
        assert!(manager.scan_in_progress().await);
        assert_eq!(manager.scan_result_count().await, 0);
        assert!(matches!(manager.scan().await, Err(LinkError::Busy)));
        assert_eq!(radio.scan_calls().await, 1);

        let results: Vec<ScanResult> = stream.collect().await;
        let ssids: Vec<&str> = results.iter().map(|r| r.ssid.as_str()).collect();
        assert_eq!(ssids, vec!["a", "b"]);

        assert!(manager.wait_done(WAIT).await);
        assert!(!manager.scan_in_progress().await);
        assert_eq!(manager.scan_result_count().await, 2);

        // A new scan starts counting from zero
        let _stream = manager.scan().await.unwrap();
        assert_eq!(manager.scan_result_count().await, 0);
        assert!(!manager.wait_done(Duration::from_millis(10)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_rejection_rolls_back() {
        let (radio, _store, manager) = setup(vec![network("a", None, 1)], manual_config());
        manager.start().await.unwrap();
        radio.set_scan_rejection(true).await;

        assert!(matches!(
            manager.scan().await,
            Err(LinkError::Driver(DriverError::ScanRequest(-1)))
        ));
        assert!(!manager.scan_in_progress().await);

        radio.set_scan_rejection(false).await;
        assert!(manager.scan().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent_and_restart_skips_boot() {
        let (radio, _store, manager) = setup(Vec::new(), LinkConfig::default());

        assert_eq!(
            manager.start().await.unwrap(),
            Some(AutoConnectOutcome::NoCredential)
        );
        assert_eq!(manager.start().await.unwrap(), None);
        assert_eq!(radio.boot_calls().await, 1);
        assert_eq!(radio.country_code().await, Some("US"));

        manager.stop().await;
        manager.stop().await;
        assert!(manager.start().await.unwrap().is_some());
        assert_eq!(radio.boot_calls().await, 1);
        assert_eq!(radio.enable_calls().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_country_fails_start() {
        let config = LinkConfig {
            country_code: "us".into(),
            ..manual_config()
        };
        let (radio, _store, manager) = setup(Vec::new(), config);

        let err = manager.start().await.unwrap_err();
        assert!(matches!(err, LinkError::UnknownCountryCode(ref c) if c == "us"));
        assert_eq!(radio.boot_calls().await, 0);
    }

    #[tokio::test]
    async fn test_boot_failure_surfaces_driver_error() {
        let (radio, _store, manager) = setup(Vec::new(), manual_config());
        radio.set_boot_failure(true).await;

        assert!(matches!(
            manager.start().await,
            Err(LinkError::Driver(DriverError::Boot(_)))
        ));
        assert!(matches!(
            manager.connect("net", None).await,
            Err(LinkError::NotStarted)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_connect_exhausts_on_silent_driver() {
        let (radio, store, manager) = setup(vec![network("net1", None, 1)], LinkConfig::default());
        radio.set_connect_behavior(ConnectBehavior::NeverRespond).await;
        CredentialStore::new(store.clone()).save("net1", None).unwrap();

        let start = Instant::now();
        let outcome = manager.start().await.unwrap();

        assert_eq!(outcome, Some(AutoConnectOutcome::Exhausted { attempts: 3 }));
        assert_eq!(radio.enable_calls().await, 3);
        assert_eq!(start.elapsed(), Duration::from_millis(19000));
        assert!(!manager.is_connected().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_connect_with_stale_password_fails_fast() {
        let (radio, store, manager) = setup(
            vec![network("net1", Some("new-pw"), 1)],
            LinkConfig::default(),
        );
        CredentialStore::new(store.clone())
            .save("net1", Some("old-pw"))
            .unwrap();

        let outcome = manager.start().await.unwrap();
        assert_eq!(outcome, Some(AutoConnectOutcome::Exhausted { attempts: 3 }));
        assert_eq!(radio.enable_calls().await, 3);
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_notifications() {
        let (radio, _store, manager) = setup(vec![network("net", None, 1)], manual_config());
        manager.start().await.unwrap();

        manager.connect("net", None).await.unwrap();
        assert!(manager.wait_link_up(WAIT).await);
        assert!(manager.is_connected().await);

        radio.drop_link().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!manager.is_connected().await);
        assert_eq!(manager.status().await.ssid, None);
        assert_eq!(
            manager.wait_connected(Duration::from_millis(10)).await,
            WaitOutcome::TimedOut
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_version_needs_boot() {
        let (_radio, _store, manager) = setup(Vec::new(), manual_config());
        assert!(matches!(
            manager.version().await,
            Err(LinkError::Driver(DriverError::NotBooted))
        ));

        manager.start().await.unwrap();
        let version = manager.version().await.unwrap();
        assert_eq!(version.chip_id, 0x0306);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_credentials() {
        let (_radio, store, manager) = setup(vec![network("net", None, 1)], manual_config());
        manager.start().await.unwrap();
        manager.connect("net", None).await.unwrap();
        manager.wait_connected(WAIT).await;
        assert!(saved(&store).is_some());

        manager.clear_credentials().await.unwrap();
        assert_eq!(saved(&store), None);
    }

    /// Radio whose callbacks are fired by hand
    #[derive(Default)]
    struct ManualRadio {
        /// Status callback of every `sta_enable`, in call order
        status: StdMutex<Vec<StatusCallback>>,
        scans: StdMutex<Vec<(ScanResultCallback, ScanCompleteCallback)>>,
    }

    impl ManualRadio {
        fn fire(&self, status: LinkStatus) {
            let count = self.status.lock().unwrap().len();
            self.fire_for(count - 1, status);
        }

        /// Fire the status callback handed over by the `n`th `sta_enable`
        fn fire_for(&self, n: usize, status: LinkStatus) {
            let callback = self.status.lock().unwrap()[n].clone();
            // Callbacks arrive on the driver's own thread
            std::thread::spawn(move || callback(status)).join().unwrap();
        }

        fn scan_result(&self, n: usize, ssid: &str) {
            let on_result = self.scans.lock().unwrap()[n].0.clone();
            let result = ScanResult {
                bssid: MacAddr([0x02, 0, 0, 0, 0, 9]),
                ssid: ssid.into(),
                rssi: -70,
                bandwidth_mhz: 1,
            };
            std::thread::spawn(move || on_result(result)).join().unwrap();
        }

        fn scan_complete(&self, n: usize) {
            let on_complete = self.scans.lock().unwrap()[n].1.clone();
            std::thread::spawn(move || on_complete()).join().unwrap();
        }
    }

    impl RadioDriver for ManualRadio {
        async fn set_channel_list(&self, _channels: &'static ChannelList) -> Result<(), DriverError> {
            Ok(())
        }

        async fn register_link_callback(&self, _callback: Option<LinkCallback>) -> Result<(), DriverError> {
            Ok(())
        }

        async fn boot(&self) -> Result<(), DriverError> {
            Ok(())
        }

        async fn sta_enable(&self, _args: &StaArgs, on_status: StatusCallback) -> Result<(), DriverError> {
            self.status.lock().unwrap().push(on_status);
            Ok(())
        }

        async fn sta_disable(&self) -> Result<(), DriverError> {
            Ok(())
        }

        async fn scan_request(
            &self,
            on_result: ScanResultCallback,
            on_complete: ScanCompleteCallback,
        ) -> Result<(), DriverError> {
            self.scans.lock().unwrap().push((on_result, on_complete));
            Ok(())
        }

        async fn version(&self) -> Result<DriverVersion, DriverError> {
            Err(DriverError::Unavailable("manual radio".into()))
        }
    }

    #[tokio::test]
    async fn test_callbacks_after_stop_are_ignored() {
        let radio = Arc::new(ManualRadio::default());
        let store = Arc::new(MemoryStore::new());
        let manager = LinkManager::new(radio.clone(), store.clone(), manual_config());
        manager.start().await.unwrap();

        manager.connect("late", Some("pw")).await.unwrap();
        manager.stop().await;

        radio.fire(LinkStatus::Connecting);
        radio.fire(LinkStatus::Connected);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!manager.is_connected().await);
        assert_eq!(manager.status().await.state, LinkStatus::Disabled);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_callbacks_from_foreign_thread() {
        let radio = Arc::new(ManualRadio::default());
        let store = Arc::new(MemoryStore::new());
        let manager = LinkManager::new(radio.clone(), store.clone(), manual_config());
        manager.start().await.unwrap();

        manager.connect("net", Some("pw")).await.unwrap();
        radio.fire(LinkStatus::Connecting);
        radio.fire(LinkStatus::Connected);

        assert_eq!(manager.wait_connected(WAIT).await, WaitOutcome::Connected);
        assert_eq!(manager.status().await.ssid.as_deref(), Some("net"));
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_late_success_of_replaced_attempt_is_ignored() {
        let radio = Arc::new(ManualRadio::default());
        let store = Arc::new(MemoryStore::new());
        let config = LinkConfig {
            pending_timeout: Duration::from_millis(10),
            ..manual_config()
        };
        let manager = LinkManager::new(radio.clone(), store.clone(), config);
        manager.start().await.unwrap();

        manager.connect("first", Some("pw1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.connect("second", Some("pw2")).await.unwrap();

        radio.fire_for(0, LinkStatus::Connected);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            manager.wait_connected(Duration::from_millis(10)).await,
            WaitOutcome::TimedOut
        );
        let status = manager.status().await;
        assert!(!status.connected);
        assert_eq!(status.ssid, None);
        assert_eq!(store.commit_count(), 0);

        radio.fire_for(1, LinkStatus::Connected);
        assert_eq!(manager.wait_connected(WAIT).await, WaitOutcome::Connected);
        assert_eq!(manager.status().await.ssid.as_deref(), Some("second"));
        assert_eq!(saved(&store).unwrap().ssid, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistence_failure_does_not_block_connection() {
        let (_radio, store, manager) =
            setup(vec![network("testnet", Some("pw123"), 1)], manual_config());
        store.set_commit_failure(true);
        manager.start().await.unwrap();

        manager.connect("testnet", Some("pw123")).await.unwrap();
        assert_eq!(manager.wait_connected(WAIT).await, WaitOutcome::Connected);
        assert_eq!(manager.status().await.ssid.as_deref(), Some("testnet"));
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_scan_frees_the_coordinator() {
        let radio = Arc::new(ManualRadio::default());
        let manager = LinkManager::new(radio.clone(), Arc::new(MemoryStore::new()), manual_config());
        manager.start().await.unwrap();

        let mut abandoned = manager.scan().await.unwrap();
        assert!(matches!(manager.scan().await, Err(LinkError::Busy)));

        manager.abort_scan().await;
        assert!(!manager.scan_in_progress().await);
        assert!(abandoned.next().await.is_none());

        let stream = manager.scan().await.unwrap();
        radio.scan_result(0, "late");
        radio.scan_complete(0);
        radio.scan_result(1, "fresh");
        radio.scan_complete(1);

        let ssids: Vec<String> = stream.map(|r| r.ssid).collect().await;
        assert_eq!(ssids, vec!["fresh"]);
        assert!(manager.wait_done(WAIT).await);
        assert_eq!(manager.scan_result_count().await, 1);
    }
}
