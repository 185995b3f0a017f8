//! HaLow scan session with state machine

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::sync::mpsc;

use crate::core::{
    error::{LinkError, LinkResult},
    types::ScanResult,
};

/// Scan session state machine
///
/// Only one scan may be in progress. Results are forwarded to the stream
/// handed out by [`ScanStateMachine::start`]; completion closes it.
#[derive(Debug, Default)]
pub(crate) struct ScanStateMachine {
    in_progress: bool,
    /// Identifies the current session; bumped by every `start`
    session: u64,
    result_count: u32,
    results: Option<mpsc::UnboundedSender<ScanResult>>,
}

impl ScanStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session and return the stream its results are delivered on
    pub fn start(&mut self) -> LinkResult<ScanStream> {
        if self.in_progress {
            return Err(LinkError::Busy);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.session += 1;
        self.in_progress = true;
        self.result_count = 0;
        self.results = Some(tx);
        Ok(ScanStream { rx })
    }

    /// Undo `start` after the driver rejected the request
    pub fn rollback(&mut self) {
        self.in_progress = false;
        self.results = None;
    }

    /// Count and forward one result; `None` when no scan is running
    pub fn record_result(&mut self, result: ScanResult) -> Option<u32> {
        if !self.in_progress {
            return None;
        }

        self.result_count += 1;
        if let Some(tx) = &self.results {
            // A dropped stream only means nobody is listening any more
            let _ = tx.send(result);
        }
        Some(self.result_count)
    }

    /// Finish the session; returns the number of results delivered
    pub fn complete(&mut self) -> Option<u32> {
        if !self.in_progress {
            return None;
        }

        self.in_progress = false;
        self.results = None;
        Some(self.result_count)
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn result_count(&self) -> u32 {
        self.result_count
    }
}

/// Scan results in the order the driver delivers them
///
/// The stream is finite: it ends when the driver reports completion (or the
/// link manager is stopped). It cannot be restarted; issue a new scan instead.
#[derive(Debug)]
pub struct ScanStream {
    rx: mpsc::UnboundedReceiver<ScanResult>,
}

impl Stream for ScanStream {
    type Item = ScanResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
