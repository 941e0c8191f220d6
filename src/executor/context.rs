//! Ambient scheduling context
//!
//! Each thread keeps a stack of the executors whose `run_blocking` is
//! currently on that thread's call stack. Entering pushes, the returned
//! guard pops, so nested blocking calls restore the outer context on every
//! exit path including unwinding.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{trace, warn};

use super::Shared;
use super::queue::WorkItem;
use crate::error::Result;

thread_local! {
    static CURRENT: RefCell<Vec<Scheduler>> = const { RefCell::new(Vec::new()) };
}

/// Cloneable, thread-safe handle for submitting work to one executor.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Innermost executor running on this thread, if any.
    pub fn current() -> Option<Scheduler> {
        CURRENT.with(|stack| stack.borrow().last().cloned())
    }

    /// Number of nested blocking calls active on this thread.
    pub fn depth() -> usize {
        CURRENT.with(|stack| stack.borrow().len())
    }

    /// Enqueue `job` to run on the executor's thread.
    ///
    /// Fails with [`SchedulingError::ExecutorClosed`] once the executor's
    /// routine has completed.
    ///
    /// [`SchedulingError::ExecutorClosed`]: crate::error::SchedulingError::ExecutorClosed
    pub fn schedule<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared
            .queue
            .push(WorkItem::Run(Box::new(job)))
            .inspect(|_| trace!(executor = self.shared.id, "job scheduled"))
            .map_err(|e| {
                warn!(
                    executor = self.shared.id,
                    "job scheduled after its executor closed"
                );
                e.into()
            })
    }

    /// Whether new work would currently be accepted.
    pub fn is_accepting(&self) -> bool {
        self.shared.queue.state().is_accepting()
    }

    /// Identifier of the executor behind this handle.
    pub fn id(&self) -> u64 {
        self.shared.id
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("id", &self.shared.id)
            .field("state", &self.shared.queue.state())
            .finish()
    }
}

/// Restores the previous ambient scheduler when dropped.
pub(crate) struct ContextGuard {
    id: u64,
    // Tied to the thread whose stack it pushed onto
    _not_send: PhantomData<*const ()>,
}

/// Make `scheduler` the ambient scheduler until the guard drops.
pub(crate) fn enter(scheduler: Scheduler) -> ContextGuard {
    let id = scheduler.id();
    CURRENT.with(|stack| stack.borrow_mut().push(scheduler));
    ContextGuard {
        id,
        _not_send: PhantomData,
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let popped = CURRENT.with(|stack| stack.borrow_mut().pop());
        debug_assert_eq!(popped.map(|s| s.id()), Some(self.id));
    }
}
