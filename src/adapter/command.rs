//! Async command lifecycle adapter
//!
//! Hosts call three synchronous entry points in a fixed order: prepare once,
//! process zero or more times, finish once. [`CommandAdapter`] turns each
//! call into one blocking run of the matching async hook on a fresh
//! [`SingleThreadExecutor`], so every phase has its own single-threaded
//! continuation domain.
//!
//! All phases share one [`CancellationSignal`] linked to the adapter's
//! [`StopHandle`]. A stop requested at any time, even before `prepare`,
//! is seen by every phase that has not finished yet.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, UsageError};
use crate::executor::{CancellationSignal, SingleThreadExecutor, StopHandle};

/// Async lifecycle hooks of a command.
///
/// Every hook defaults to doing nothing. Hooks run one at a time on the
/// host's calling thread, so implementations need no locking for their own
/// fields.
#[async_trait(?Send)]
pub trait AsyncCommand {
    /// Runs once before any input is processed.
    async fn prepare(&mut self, _cancel: &CancellationSignal) -> Result<()> {
        Ok(())
    }

    /// Runs once per input record.
    async fn process(&mut self, _cancel: &CancellationSignal) -> Result<()> {
        Ok(())
    }

    /// Runs once after all input was processed.
    async fn finish(&mut self, _cancel: &CancellationSignal) -> Result<()> {
        Ok(())
    }
}

/// Where a [`CommandAdapter`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Idle,
    Preparing,
    Processing,
    Finishing,
    Done,
    /// A stop was requested before the lifecycle completed
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Preparing => "preparing",
            LifecycleState::Processing => "processing",
            LifecycleState::Finishing => "finishing",
            LifecycleState::Done => "done",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Drives an [`AsyncCommand`] from a host's synchronous entry points.
///
/// Dropping the adapter disposes it; [`CommandAdapter::dispose`] may also be
/// called explicitly, any number of times.
pub struct CommandAdapter<C> {
    command: C,
    stop: StopHandle,
    signal: Option<CancellationSignal>,
    phase: LifecycleState,
}

impl<C: AsyncCommand> CommandAdapter<C> {
    pub fn new(command: C) -> Self {
        let stop = StopHandle::new();
        let signal = CancellationSignal::from_stop(&stop);
        Self {
            command,
            stop,
            signal: Some(signal),
            phase: LifecycleState::Idle,
        }
    }

    /// Prepare entry point; runs [`AsyncCommand::prepare`] to completion.
    pub fn begin_processing(&mut self) -> Result<()> {
        self.advance(
            "begin processing",
            &[LifecycleState::Idle],
            LifecycleState::Preparing,
        )?;
        let (command, signal) = self.parts()?;
        SingleThreadExecutor::new().run_blocking(command.prepare(signal))
    }

    /// Process entry point; runs [`AsyncCommand::process`] to completion.
    pub fn process_record(&mut self) -> Result<()> {
        self.advance(
            "process a record",
            &[LifecycleState::Preparing, LifecycleState::Processing],
            LifecycleState::Processing,
        )?;
        let (command, signal) = self.parts()?;
        SingleThreadExecutor::new().run_blocking(command.process(signal))
    }

    /// Finish entry point; runs [`AsyncCommand::finish`] to completion.
    pub fn end_processing(&mut self) -> Result<()> {
        self.advance(
            "end processing",
            &[LifecycleState::Preparing, LifecycleState::Processing],
            LifecycleState::Finishing,
        )?;
        let (command, signal) = self.parts()?;
        let result = SingleThreadExecutor::new().run_blocking(command.finish(signal));
        self.phase = LifecycleState::Done;
        result
    }

    /// Host stop notification. Never blocks; safe to call repeatedly.
    pub fn stop_processing(&self) {
        self.stop.stop();
    }

    /// Handle for delivering the stop notification from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> LifecycleState {
        if self.stop.is_stopped() && self.phase != LifecycleState::Done {
            LifecycleState::Stopped
        } else {
            self.phase
        }
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    pub fn command_mut(&mut self) -> &mut C {
        &mut self.command
    }

    /// Release the shared cancellation signal.
    pub fn dispose(&mut self) {
        if self.signal.take().is_some() {
            debug!(state = %self.state(), "command adapter disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.signal.is_none()
    }

    fn advance(
        &mut self,
        operation: &'static str,
        allowed: &[LifecycleState],
        next: LifecycleState,
    ) -> Result<()> {
        if self.is_disposed() {
            return Err(UsageError::Disposed.into());
        }
        if !allowed.contains(&self.phase) {
            return Err(UsageError::InvalidState {
                operation,
                state: self.phase.to_string(),
            }
            .into());
        }
        debug!(from = %self.phase, to = %next, stopped = self.stop.is_stopped(), "lifecycle transition");
        self.phase = next;
        Ok(())
    }

    fn parts(&mut self) -> Result<(&mut C, &CancellationSignal)> {
        let signal = self.signal.as_ref().ok_or(UsageError::Disposed)?;
        Ok((&mut self.command, signal))
    }
}

impl<C> Drop for CommandAdapter<C> {
    fn drop(&mut self) {
        if self.signal.take().is_some() {
            debug!("command adapter disposed on drop");
        }
    }
}

impl<C> fmt::Debug for CommandAdapter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandAdapter")
            .field("phase", &self.phase)
            .field("stopped", &self.stop.is_stopped())
            .field("disposed", &self.signal.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellextError;
    use crate::executor::{Scheduler, yield_now};
    use std::thread;
    use std::time::Duration;

    /// Records what each hook saw.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        executors: Vec<u64>,
    }

    #[async_trait(?Send)]
    impl AsyncCommand for Recorder {
        async fn prepare(&mut self, cancel: &CancellationSignal) -> Result<()> {
            yield_now().await;
            self.executors.push(Scheduler::current().map(|s| s.id()).unwrap_or(0));
            self.events.push(format!("prepare cancelled={}", cancel.is_cancelled()));
            Ok(())
        }

        async fn process(&mut self, cancel: &CancellationSignal) -> Result<()> {
            self.executors.push(Scheduler::current().map(|s| s.id()).unwrap_or(0));
            self.events.push(format!("process cancelled={}", cancel.is_cancelled()));
            Ok(())
        }

        async fn finish(&mut self, cancel: &CancellationSignal) -> Result<()> {
            self.executors.push(Scheduler::current().map(|s| s.id()).unwrap_or(0));
            self.events.push(format!("finish cancelled={}", cancel.is_cancelled()));
            Ok(())
        }
    }

    #[test]
    fn test_full_lifecycle_in_order() {
        let mut adapter = CommandAdapter::new(Recorder::default());
        assert_eq!(adapter.state(), LifecycleState::Idle);

        adapter.begin_processing().unwrap();
        adapter.process_record().unwrap();
        adapter.process_record().unwrap();
        adapter.end_processing().unwrap();

        assert_eq!(adapter.state(), LifecycleState::Done);
        assert_eq!(
            adapter.command().events,
            vec![
                "prepare cancelled=false",
                "process cancelled=false",
                "process cancelled=false",
                "finish cancelled=false",
            ]
        );
    }

    #[test]
    fn test_each_phase_gets_its_own_executor() {
        let mut adapter = CommandAdapter::new(Recorder::default());
        adapter.begin_processing().unwrap();
        adapter.process_record().unwrap();
        adapter.end_processing().unwrap();

        let ids = &adapter.command().executors;
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| *id != 0));
        assert!(ids[0] != ids[1] && ids[1] != ids[2]);
    }

    #[test]
    fn test_stop_before_prepare_is_seen_by_all_phases() {
        let mut adapter = CommandAdapter::new(Recorder::default());
        adapter.stop_processing();
        assert_eq!(adapter.state(), LifecycleState::Stopped);

        adapter.begin_processing().unwrap();
        adapter.process_record().unwrap();
        adapter.end_processing().unwrap();

        assert_eq!(
            adapter.command().events,
            vec![
                "prepare cancelled=true",
                "process cancelled=true",
                "finish cancelled=true",
            ]
        );
    }

    #[test]
    fn test_out_of_order_calls_rejected() {
        let mut adapter = CommandAdapter::new(Recorder::default());
        let err = adapter.process_record().unwrap_err();
        assert!(matches!(
            err,
            ShellextError::Usage(UsageError::InvalidState { .. })
        ));

        adapter.begin_processing().unwrap();
        assert!(adapter.begin_processing().is_err());

        // Finish straight after prepare is allowed
        adapter.end_processing().unwrap();
        assert!(adapter.end_processing().is_err());
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut adapter = CommandAdapter::new(Recorder::default());
        adapter.dispose();
        adapter.dispose();
        assert!(adapter.is_disposed());

        let err = adapter.begin_processing().unwrap_err();
        assert!(matches!(err, ShellextError::Usage(UsageError::Disposed)));
    }

    /// Waits for a stop and reports it as cancellation.
    struct WaitForStop;

    #[async_trait(?Send)]
    impl AsyncCommand for WaitForStop {
        async fn process(&mut self, cancel: &CancellationSignal) -> Result<()> {
            tokio::select! {
                _ = cancel.cancelled() => Err(ShellextError::Cancelled),
                _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(()),
            }
        }
    }

    #[test]
    fn test_stop_from_other_thread_cancels_running_phase() {
        let mut adapter = CommandAdapter::new(WaitForStop);
        adapter.begin_processing().unwrap();

        let stop = adapter.stop_handle();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            stop.stop();
        });

        let err = adapter.process_record().unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(adapter.state(), LifecycleState::Stopped);
        stopper.join().unwrap();
    }

    struct Failing;

    #[async_trait(?Send)]
    impl AsyncCommand for Failing {
        async fn prepare(&mut self, _cancel: &CancellationSignal) -> Result<()> {
            Err(ShellextError::operation("cannot open session"))
        }
    }

    #[test]
    fn test_hook_failure_propagates_verbatim() {
        let mut adapter = CommandAdapter::new(Failing);
        let err = adapter.begin_processing().unwrap_err();
        assert_eq!(err.to_string(), "cannot open session");
    }
}
