//! Cancellation signals
//!
//! A [`CancellationSignal`] fires from any of its sources, whichever comes
//! first:
//!
//! 1. an explicit [`CancellationSignal::cancel`]
//! 2. a [`StopHandle`] it was linked to (the host's stop notification)
//! 3. a timeout
//! 4. Ctrl+C, when interrupt listening is enabled
//!
//! Once fired it stays fired, and it can be observed from any thread. Timers
//! and the interrupt listener run on the reactor and are disarmed when the
//! signal is dropped.

use std::future::pending;
use std::time::Duration;

use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use super::reactor;
use crate::error::{Result, ShellextError};

/// Host-facing stop notification.
///
/// Cheap to clone and safe to trigger from any thread; stopping never blocks
/// and is idempotent.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            debug!("stop requested");
        }
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Monotonic cancellation flag handed to async routines.
#[derive(Debug)]
pub struct CancellationSignal {
    token: CancellationToken,
    // Stops the watcher task when the signal goes away
    _disarm: Option<DropGuard>,
}

impl CancellationSignal {
    /// Signal that only fires when cancelled explicitly.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            _disarm: None,
        }
    }

    pub fn builder() -> CancellationSignalBuilder {
        CancellationSignalBuilder::default()
    }

    /// Signal that fires when `stop` is triggered.
    pub fn from_stop(stop: &StopHandle) -> Self {
        Self::builder().linked_to(stop).build()
    }

    /// Signal that fires once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::builder().timeout(timeout).build()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `Err(Cancelled)` if the signal has fired.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ShellextError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once the signal fires.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Underlying token, e.g. for `tokio::select!` or handing to libraries.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Combines cancellation sources into one [`CancellationSignal`].
#[derive(Debug, Default)]
pub struct CancellationSignalBuilder {
    timeout: Option<Duration>,
    parent: Option<CancellationToken>,
    interrupt: bool,
}

impl CancellationSignalBuilder {
    /// Fire after `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fire when `stop` is triggered.
    pub fn linked_to(self, stop: &StopHandle) -> Self {
        self.linked_to_token(stop.token())
    }

    /// Fire when `token` is cancelled.
    pub fn linked_to_token(mut self, token: &CancellationToken) -> Self {
        self.parent = Some(token.clone());
        self
    }

    /// Fire on Ctrl+C. Best effort: ignored where signals are unavailable.
    ///
    /// Listening installs a process-wide handler that stays for the life of
    /// the process.
    pub fn interrupt(mut self, enabled: bool) -> Self {
        self.interrupt = enabled;
        self
    }

    pub fn build(self) -> CancellationSignal {
        // Child tokens fire with their parent but never cancel it
        let token = match &self.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };

        if self.timeout.is_none() && !self.interrupt {
            return CancellationSignal {
                token,
                _disarm: None,
            };
        }

        let Some(handle) = reactor::handle() else {
            warn!("no reactor available, timeout and interrupt sources disabled");
            return CancellationSignal {
                token,
                _disarm: None,
            };
        };

        let disarm = CancellationToken::new();
        let watched = token.clone();
        let disarmed = disarm.clone();
        let timeout = self.timeout;
        let interrupt = self.interrupt;

        handle.spawn(async move {
            let timer = async {
                match timeout {
                    Some(duration) => tokio::time::sleep(duration).await,
                    None => pending::<()>().await,
                }
            };
            let ctrl_c = async {
                if interrupt {
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => return,
                        Err(e) => debug!("interrupt listener unavailable: {e}"),
                    }
                }
                pending::<()>().await
            };

            tokio::select! {
                _ = timer => {
                    debug!(?timeout, "cancellation timeout elapsed");
                    watched.cancel();
                }
                _ = ctrl_c => {
                    debug!("interrupt received");
                    watched.cancel();
                }
                _ = watched.cancelled() => {}
                _ = disarmed.cancelled() => {}
            }
        });

        CancellationSignal {
            token,
            _disarm: Some(disarm.drop_guard()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_manual_cancel_is_monotonic() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_cancelled());
        assert!(signal.check().is_ok());

        signal.cancel();
        signal.cancel();
        assert!(signal.is_cancelled());
        assert!(signal.check().unwrap_err().is_cancelled());
    }

    #[test]
    fn test_cancelled_future_resolves_after_cancel() {
        let signal = CancellationSignal::new();
        let mut fut = task::spawn(signal.cancelled());
        assert_pending!(fut.poll());

        signal.cancel();
        assert!(fut.is_woken());
        assert_ready!(fut.poll());
    }

    #[test]
    fn test_stop_handle_cancels_linked_signal() {
        let stop = StopHandle::new();
        let signal = CancellationSignal::from_stop(&stop);
        assert!(!signal.is_cancelled());

        stop.stop();
        assert!(signal.is_cancelled());
        assert!(stop.is_stopped());
    }

    #[test]
    fn test_signal_created_after_stop_is_already_cancelled() {
        let stop = StopHandle::new();
        stop.stop();
        assert!(CancellationSignal::from_stop(&stop).is_cancelled());
    }

    #[test]
    fn test_cancelling_signal_leaves_stop_untouched() {
        let stop = StopHandle::new();
        let signal = CancellationSignal::from_stop(&stop);
        signal.cancel();
        assert!(!stop.is_stopped());
    }

    #[test]
    fn test_stop_from_another_thread() {
        let stop = StopHandle::new();
        let signal = CancellationSignal::from_stop(&stop);

        let remote = stop.clone();
        thread::spawn(move || remote.stop()).join().unwrap();
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_timeout_fires() {
        let signal = CancellationSignal::with_timeout(Duration::from_millis(20));
        assert!(!signal.is_cancelled());

        thread::sleep(Duration::from_millis(300));
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_combined_sources_first_wins() {
        let stop = StopHandle::new();
        let signal = CancellationSignal::builder()
            .timeout(Duration::from_secs(60))
            .linked_to(&stop)
            .build();

        stop.stop();
        assert!(signal.is_cancelled());
    }
}
