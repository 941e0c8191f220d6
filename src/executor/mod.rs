//! Single-threaded synchronous bridge for async routines
//!
//! [`SingleThreadExecutor::run_blocking`] drives a future to completion on
//! the calling thread. The calling thread becomes the executor's only
//! worker: it sleeps on a FIFO work queue and runs, one at a time, every
//! continuation of the routine along with any job scheduled onto the
//! executor. Wake-ups may come from any thread (timers, I/O, other
//! producers); they only ever enqueue.
//!
//! # Lifecycle
//!
//! ```text
//! Created --run_blocking--> Running --routine done--> Draining --close marker--> Closed
//! ```
//!
//! When the routine completes, a close marker is queued behind whatever work
//! is already pending, so trailing jobs scheduled by the routine's last step
//! still run, in order. From that point `schedule` fails with
//! [`SchedulingError::ExecutorClosed`].
//!
//! # Example
//!
//! ```no_run
//! use shellext::executor::{run_blocking, yield_now, Scheduler};
//!
//! let answer = run_blocking(async {
//!     let scheduler = Scheduler::current().expect("inside run_blocking");
//!     scheduler.schedule(|| println!("runs on the calling thread"))?;
//!     yield_now().await;
//!     Ok(42)
//! })?;
//! assert_eq!(answer, 42);
//! # Ok::<(), shellext::error::ShellextError>(())
//! ```

mod cancel;
mod context;
mod queue;
pub mod reactor;
mod waker;

use std::fmt;
use std::future::Future;
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::{Context, Poll};

use tracing::{debug, trace};

use crate::error::{Result, SchedulingError, ShellextError, UsageError};

pub use cancel::{CancellationSignal, CancellationSignalBuilder, StopHandle};
pub use context::Scheduler;
pub use queue::Job;

use queue::{WorkItem, WorkQueue};

static NEXT_EXECUTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state of a [`SingleThreadExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorState {
    /// Queue open, nobody pumping yet
    Created,
    /// The blocking call is pumping the queue
    Running,
    /// Routine finished; queued work is being flushed, nothing new accepted
    Draining,
    /// Queue permanently closed
    Closed,
}

impl ExecutorState {
    /// Whether `schedule` succeeds in this state.
    pub fn is_accepting(&self) -> bool {
        matches!(self, ExecutorState::Created | ExecutorState::Running)
    }
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutorState::Created => "created",
            ExecutorState::Running => "running",
            ExecutorState::Draining => "draining",
            ExecutorState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// State shared between the executor, its schedulers and its waker.
pub(crate) struct Shared {
    pub(crate) id: u64,
    pub(crate) queue: WorkQueue,
    pub(crate) resume_pending: AtomicBool,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_EXECUTOR_ID.fetch_add(1, Ordering::Relaxed),
            queue: WorkQueue::new(),
            resume_pending: AtomicBool::new(false),
        }
    }
}

/// Closes the queue on every exit path out of `run_blocking`.
struct CloseOnExit<'a>(&'a Shared);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        let discarded = self.0.queue.close();
        if discarded > 0 {
            debug!(executor = self.0.id, discarded, "executor closed with pending work");
        }
    }
}

/// Runs one async routine to completion on the calling thread.
///
/// An executor serves exactly one `run_blocking` call.
pub struct SingleThreadExecutor {
    shared: Arc<Shared>,
}

impl SingleThreadExecutor {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    /// Identifier used in log output.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn state(&self) -> ExecutorState {
        self.shared.queue.state()
    }

    /// Thread-safe handle for scheduling onto this executor.
    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.shared.clone())
    }

    /// Enqueue `job`; see [`Scheduler::schedule`].
    pub fn schedule<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.scheduler().schedule(job)
    }

    /// Drive `routine` to completion, blocking the calling thread.
    ///
    /// While blocked, the calling thread runs the routine's continuations and
    /// any scheduled jobs in FIFO order, never two at once. This executor is
    /// the ambient [`Scheduler::current`] for the duration of the call, and
    /// the reactor's tokio context is entered so the routine may use tokio
    /// timers and signals. The previous ambient scheduler is restored before
    /// returning, whatever the outcome.
    ///
    /// The routine's result is returned as-is; a cancelled routine yields
    /// [`ShellextError::Cancelled`].
    pub fn run_blocking<F, T>(&self, routine: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let id = self.shared.id;
        self.shared
            .queue
            .start()
            .map_err(|state| UsageError::InvalidState {
                operation: "run_blocking",
                state: format!("executor is {state}"),
            })?;

        let _close = CloseOnExit(&self.shared);
        let _context = context::enter(self.scheduler());
        let _runtime = reactor::enter();

        debug!(executor = id, depth = Scheduler::depth(), "run_blocking started");

        let waker = waker::resume_waker(self.shared.clone());
        let mut cx = Context::from_waker(&waker);
        let mut routine = pin!(routine);
        let mut output: Option<Result<T>> = None;

        // First poll goes through the queue like every other continuation
        self.shared.resume_pending.store(true, Ordering::Release);
        self.shared.queue.push(WorkItem::Resume)?;

        while let Some(item) = self.shared.queue.take() {
            match item {
                WorkItem::Resume => {
                    self.shared.resume_pending.store(false, Ordering::Release);
                    if output.is_some() {
                        continue;
                    }
                    trace!(executor = id, "polling routine");
                    if let Poll::Ready(result) = Pin::as_mut(&mut routine).poll(&mut cx) {
                        debug!(
                            executor = id,
                            ok = result.is_ok(),
                            pending = self.shared.queue.len(),
                            "routine completed, draining"
                        );
                        output = Some(result);
                        self.shared.queue.begin_draining();
                    }
                }
                WorkItem::Run(job) => {
                    trace!(executor = id, "running job");
                    job();
                }
                WorkItem::Close => {
                    debug!(executor = id, "executor closed");
                    break;
                }
            }
        }

        output.unwrap_or(Err(ShellextError::Scheduling(
            SchedulingError::ExecutorClosed,
        )))
    }
}

impl Default for SingleThreadExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SingleThreadExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleThreadExecutor")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .finish()
    }
}

/// Drive `routine` to completion on a fresh [`SingleThreadExecutor`].
pub fn run_blocking<F, T>(routine: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    SingleThreadExecutor::new().run_blocking(routine)
}

/// Yield once, letting work queued ahead of the routine run first.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

/// Future returned by [`yield_now`].
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
