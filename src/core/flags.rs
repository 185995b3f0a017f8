//! Event flag set shared between driver callbacks and waiting callers

use std::time::Duration;

use bitflags::bitflags;
use tokio::sync::watch;

bitflags! {
    /// Bitmask of link events
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const CONNECTED = 1 << 0;
        /// The pending attempt reached its terminal failure
        const FAILED = 1 << 1;
        const SCAN_DONE = 1 << 2;
    }
}

/// Flag set that can be set, cleared and waited on with a timeout
#[derive(Debug)]
pub struct EventFlags {
    tx: watch::Sender<Flags>,
}

impl EventFlags {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Flags::empty());
        Self { tx }
    }

    pub fn set(&self, flags: Flags) {
        self.tx.send_modify(|f| f.insert(flags));
    }

    pub fn clear(&self, flags: Flags) {
        self.tx.send_modify(|f| f.remove(flags));
    }

    pub fn get(&self) -> Flags {
        *self.tx.borrow()
    }

    /// Wait until any flag in `mask` is set
    ///
    /// Returns the subset of `mask` that was set, or `None` on timeout.
    /// Flags are not consumed.
    pub async fn wait_any(&self, mask: Flags, timeout: Duration) -> Option<Flags> {
        let mut rx = self.tx.subscribe();
        let wait = async {
            rx.wait_for(|f| f.intersects(mask))
                .await
                .map(|f| f.intersection(mask))
                .ok()
        };

        tokio::time::timeout(timeout, wait).await.ok().flatten()
    }
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_set_and_clear() {
        let flags = EventFlags::new();
        assert!(flags.get().is_empty());

        flags.set(Flags::CONNECTED | Flags::SCAN_DONE);
        assert!(flags.get().contains(Flags::CONNECTED));
        assert!(flags.get().contains(Flags::SCAN_DONE));
        assert!(!flags.get().contains(Flags::FAILED));

        flags.clear(Flags::CONNECTED);
        assert!(!flags.get().contains(Flags::CONNECTED));
        assert!(flags.get().contains(Flags::SCAN_DONE));
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_set() {
        let flags = EventFlags::new();
        flags.set(Flags::FAILED);

        let got = flags
            .wait_any(Flags::CONNECTED | Flags::FAILED, Duration::from_millis(10))
            .await;
        assert_eq!(got, Some(Flags::FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let flags = EventFlags::new();
        flags.set(Flags::SCAN_DONE);

        let start = tokio::time::Instant::now();
        let got = flags
            .wait_any(Flags::CONNECTED, Duration::from_millis(5000))
            .await;
        assert_eq!(got, None);
        assert_eq!(start.elapsed(), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_wakes_on_set_from_other_task() {
        let flags = Arc::new(EventFlags::new());

        let setter = flags.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            setter.set(Flags::CONNECTED);
        });

        let got = flags
            .wait_any(Flags::CONNECTED, Duration::from_secs(5))
            .await;
        assert_eq!(got, Some(Flags::CONNECTED));
    }

    #[test]
    fn test_flags_debug() {
        assert_eq!(
            format!("{:?}", Flags::CONNECTED | Flags::SCAN_DONE),
            "Flags(CONNECTED | SCAN_DONE)"
        );
    }
}
