//! Station connection state machine

use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::core::{
    error::{LinkError, LinkResult},
    types::{LinkStatus, LinkStatusReport, StaArgs},
};

/// The connect request currently awaiting a terminal outcome
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct PendingAttempt {
    pub id: u64,
    pub ssid: String,
    pub password: Option<String>,
    pub issued_at: Instant,
    /// Association that owned the callbacks before this attempt
    replaced: Option<Association>,
}

/// The attempt whose status callbacks are honoured
#[derive(Debug, Clone, PartialEq, Eq)]
struct Association {
    id: u64,
    ssid: String,
}

/// What the caller must do after a status callback was applied
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct StatusEffect {
    /// Credential to hand to the credential store
    pub save: Option<(String, Option<String>)>,
    /// The pending attempt reached its terminal failure
    pub failed: bool,
    /// Whether the CONNECTED flag should be set afterwards
    pub connected: bool,
    /// The callback belongs to a replaced attempt and changed nothing
    pub stale: bool,
}

/// Connection state machine
///
/// Pure bookkeeping; owned by the link manager and only mutated under its
/// lock.
#[derive(Debug)]
pub(crate) struct ConnectionStateMachine {
    status: LinkStatus,
    pending: Option<PendingAttempt>,
    connected_ssid: Option<String>,
    current: Option<Association>,
    next_attempt: u64,
}

impl std::fmt::Debug for PendingAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAttempt")
            .field("id", &self.id)
            .field("ssid", &self.ssid)
            .field("issued_at", &self.issued_at)
            .finish_non_exhaustive()
    }
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self {
            status: LinkStatus::Disabled,
            pending: None,
            connected_ssid: None,
            current: None,
            next_attempt: 1,
        }
    }

    /// Record a new pending attempt
    ///
    /// A pending attempt younger than `pending_timeout` makes this fail with
    /// `Busy`. An older one is superseded as a whole.
    pub fn begin_attempt(
        &mut self,
        args: &StaArgs,
        now: Instant,
        pending_timeout: Duration,
    ) -> LinkResult<u64> {
        if let Some(pending) = &self.pending {
            let age = now.saturating_duration_since(pending.issued_at);
            if age < pending_timeout {
                return Err(LinkError::Busy);
            }
            warn!(
                ssid = %pending.ssid,
                age_ms = age.as_millis() as u64,
                "Superseding unanswered connection attempt"
            );
        }

        let id = self.next_attempt;
        self.next_attempt += 1;
        let replaced = self.current.replace(Association {
            id,
            ssid: args.ssid.clone(),
        });
        self.pending = Some(PendingAttempt {
            id,
            ssid: args.ssid.clone(),
            password: args.password.clone(),
            issued_at: now,
            replaced,
        });
        Ok(id)
    }

    /// Drop attempt `id` after the driver rejected it synchronously
    ///
    /// The association it replaced owns the callbacks again.
    pub fn abort_attempt(&mut self, id: u64) {
        if self.pending.as_ref().is_some_and(|p| p.id == id) {
            if let Some(pending) = self.pending.take() {
                self.current = pending.replaced;
            }
        }
    }

    /// Whether callbacks of attempt `id` still change state
    pub fn is_current(&self, id: u64) -> bool {
        self.current.as_ref().is_some_and(|c| c.id == id)
    }

    /// Apply a status callback belonging to attempt `attempt`
    ///
    /// Callbacks of a replaced attempt are ignored.
    pub fn apply_status(&mut self, attempt: u64, status: LinkStatus) -> StatusEffect {
        if !self.is_current(attempt) {
            warn!(attempt, %status, "Ignoring status of a replaced connection attempt");
            return StatusEffect {
                stale: true,
                ..StatusEffect::default()
            };
        }

        let previous = self.status;
        if previous != status && !previous.can_transition_to(status) {
            warn!(from = %previous, to = %status, "Unexpected station state transition");
        }
        self.status = status;

        let ours = self.pending.as_ref().is_some_and(|p| p.id == attempt);
        let mut effect = StatusEffect::default();

        match status {
            LinkStatus::Connected => {
                if ours {
                    if let Some(pending) = self.pending.take() {
                        info!(ssid = %pending.ssid, "HaLow connection established");
                        self.connected_ssid = Some(pending.ssid.clone());
                        effect.save = Some((pending.ssid, pending.password));
                    }
                } else {
                    info!("Connected without a pending attempt");
                    self.connected_ssid = self.current.as_ref().map(|c| c.ssid.clone());
                }
                effect.connected = true;
            }
            LinkStatus::Connecting => {
                self.connected_ssid = None;
                if previous == LinkStatus::Connected {
                    warn!("HaLow link lost, driver reconnecting");
                }
            }
            LinkStatus::Disabled => {
                self.connected_ssid = None;
                if ours {
                    if let Some(pending) = self.pending.take() {
                        warn!(ssid = %pending.ssid, "HaLow connection attempt failed");
                        effect.failed = true;
                    }
                }
            }
        }

        effect
    }

    /// Force the disabled state when station mode is torn down locally
    pub fn force_disabled(&mut self) {
        self.status = LinkStatus::Disabled;
        self.pending = None;
        self.current = None;
        self.connected_ssid = None;
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn pending(&self) -> Option<&PendingAttempt> {
        self.pending.as_ref()
    }

    pub fn report(&self) -> LinkStatusReport {
        let connected = self.status == LinkStatus::Connected;
        LinkStatusReport {
            state: self.status,
            connected,
            ssid: if connected {
                self.connected_ssid.clone()
            } else {
                None
            },
        }
    }
}
