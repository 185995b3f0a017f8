//! Start-up auto-connect with bounded retries

use std::time::Duration;

use trait_variant::make;
use tracing::{info, warn};

use crate::core::{
    credentials::SavedCredential,
    error::LinkResult,
    types::{AutoConnectOutcome, WaitOutcome},
};

/// Retry policy for reconnecting to the saved network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConnectPolicy {
    pub max_attempts: u32,
    /// How long each attempt may take before it counts as failed
    pub attempt_timeout: Duration,
    /// Pause between attempts; none after the last one
    pub retry_delay: Duration,
}

impl Default for AutoConnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_millis(5000),
            retry_delay: Duration::from_millis(2000),
        }
    }
}

/// The subset of the link manager the retry loop drives
#[make(Send)]
pub trait Connector: Sync {
    async fn connect(&self, ssid: &str, password: Option<&str>) -> LinkResult<()>;

    async fn wait_connected(&self, timeout: Duration) -> WaitOutcome;
}

/// Reconnect to `credential` according to `policy`
///
/// A synchronous rejection counts as a failed attempt. Whatever the last
/// callback reported is left in place once the attempts are used up.
pub async fn run<C: Connector>(
    connector: &C,
    credential: Option<SavedCredential>,
    policy: &AutoConnectPolicy,
) -> AutoConnectOutcome {
    let Some(credential) = credential else {
        info!("No saved HaLow credential, skipping auto-connect");
        return AutoConnectOutcome::NoCredential;
    };

    info!(ssid = %credential.ssid, "Auto-connecting to saved network");

    for attempt in 1..=policy.max_attempts {
        match connector
            .connect(&credential.ssid, credential.password.as_deref())
            .await
        {
            Ok(()) => match connector.wait_connected(policy.attempt_timeout).await {
                WaitOutcome::Connected => {
                    info!(ssid = %credential.ssid, attempt, "Auto-connect succeeded");
                    return AutoConnectOutcome::Connected { attempt };
                }
                outcome => {
                    warn!(attempt, ?outcome, "Auto-connect attempt did not connect");
                }
            },
            Err(e) => {
                warn!(attempt, "Auto-connect attempt rejected: {}", e);
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    warn!(
        attempts = policy.max_attempts,
        "Auto-connect gave up; use connect to retry manually"
    );
    AutoConnectOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;
    use crate::core::error::{DriverError, LinkError};

    /// How the fake answers each connect call
    #[derive(Clone, Copy)]
    enum Script {
        /// Accept and never report back
        Silent,
        /// Reject synchronously
        Reject,
        /// Accept, then report failure after 300 ms
        Fail,
        /// Connect on the given attempt
        SucceedOn(usize),
    }

    struct FakeConnector {
        script: Script,
        calls: Mutex<Vec<Instant>>,
        origin: Instant,
    }

    impl FakeConnector {
        fn new(script: Script) -> Self {
            Self {
                script,
                calls: Mutex::new(Vec::new()),
                origin: Instant::now(),
            }
        }

        fn call_offsets_ms(&self) -> Vec<u128> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|t| t.duration_since(self.origin).as_millis())
                .collect()
        }
    }

    impl Connector for FakeConnector {
        async fn connect(&self, _ssid: &str, _password: Option<&str>) -> LinkResult<()> {
            self.calls.lock().unwrap().push(Instant::now());
            match self.script {
                Script::Reject => Err(LinkError::Driver(DriverError::Enable(-1))),
                _ => Ok(()),
            }
        }

        async fn wait_connected(&self, timeout: Duration) -> WaitOutcome {
            let attempt = self.calls.lock().unwrap().len();
            match self.script {
                Script::SucceedOn(n) if n == attempt => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    WaitOutcome::Connected
                }
                Script::Fail => {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    WaitOutcome::Failed
                }
                _ => {
                    tokio::time::sleep(timeout).await;
                    WaitOutcome::TimedOut
                }
            }
        }
    }

    fn saved() -> Option<SavedCredential> {
        Some(SavedCredential {
            ssid: "net1".into(),
            password: Some("pw1".into()),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_credential_makes_no_attempt() {
        let connector = FakeConnector::new(Script::Silent);
        let outcome = run(&connector, None, &AutoConnectPolicy::default()).await;

        assert_eq!(outcome, AutoConnectOutcome::NoCredential);
        assert!(connector.call_offsets_ms().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_driver_exhausts_three_attempts() {
        let connector = FakeConnector::new(Script::Silent);
        let start = Instant::now();
        let outcome = run(&connector, saved(), &AutoConnectPolicy::default()).await;

        assert_eq!(outcome, AutoConnectOutcome::Exhausted { attempts: 3 });
        // 5000 ms wait, 2000 ms delay, twice, then a final wait with no delay
        assert_eq!(connector.call_offsets_ms(), vec![0, 7000, 14000]);
        assert_eq!(start.elapsed(), Duration::from_millis(19000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reported_failure_moves_on_early() {
        let connector = FakeConnector::new(Script::Fail);
        let outcome = run(&connector, saved(), &AutoConnectPolicy::default()).await;

        assert_eq!(outcome, AutoConnectOutcome::Exhausted { attempts: 3 });
        assert_eq!(connector.call_offsets_ms(), vec![0, 2300, 4600]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synchronous_rejection_counts_as_attempt() {
        let connector = FakeConnector::new(Script::Reject);
        let start = Instant::now();
        let outcome = run(&connector, saved(), &AutoConnectPolicy::default()).await;

        assert_eq!(outcome, AutoConnectOutcome::Exhausted { attempts: 3 });
        assert_eq!(connector.call_offsets_ms(), vec![0, 2000, 4000]);
        assert_eq!(start.elapsed(), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_success() {
        let connector = FakeConnector::new(Script::SucceedOn(2));
        let outcome = run(&connector, saved(), &AutoConnectPolicy::default()).await;

        assert_eq!(outcome, AutoConnectOutcome::Connected { attempt: 2 });
        assert_eq!(connector.call_offsets_ms(), vec![0, 7000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy() {
        let connector = FakeConnector::new(Script::Silent);
        let policy = AutoConnectPolicy {
            max_attempts: 2,
            attempt_timeout: Duration::from_millis(100),
            retry_delay: Duration::from_millis(10),
        };
        let outcome = run(&connector, saved(), &policy).await;

        assert_eq!(outcome, AutoConnectOutcome::Exhausted { attempts: 2 });
        assert_eq!(connector.call_offsets_ms(), vec![0, 110]);
    }
}
