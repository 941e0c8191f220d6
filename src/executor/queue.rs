//! Blocking FIFO work queue
//!
//! Many producers, one consumer. Producers may be any thread; the consumer
//! is the thread inside `run_blocking`, which sleeps on a condition variable
//! rather than polling.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::ExecutorState;
use crate::error::SchedulingError;

/// Callback scheduled onto an executor. Any state it needs is captured.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Unit of work consumed by the pump.
pub(crate) enum WorkItem {
    /// Run a scheduled callback.
    Run(Job),
    /// Poll the driven routine again.
    Resume,
    /// Stop pumping; the routine has finished and everything ahead ran.
    Close,
}

struct QueueState {
    items: VecDeque<WorkItem>,
    state: ExecutorState,
}

pub(crate) struct WorkQueue {
    inner: Mutex<QueueState>,
    available: Condvar,
}

impl WorkQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(QueueState {
                items: VecDeque::new(),
                state: ExecutorState::Created,
            }),
            available: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> ExecutorState {
        self.lock().state
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Move from `Created` to `Running`; any other state is returned as the error.
    pub(crate) fn start(&self) -> Result<(), ExecutorState> {
        let mut inner = self.lock();
        match inner.state {
            ExecutorState::Created => {
                inner.state = ExecutorState::Running;
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Append a work item. Fails once draining has begun.
    pub(crate) fn push(&self, item: WorkItem) -> Result<(), SchedulingError> {
        let mut inner = self.lock();
        if !inner.state.is_accepting() {
            return Err(SchedulingError::ExecutorClosed);
        }
        inner.items.push_back(item);
        drop(inner);
        self.available.notify_one();
        Ok(())
    }

    /// Stop accepting work and queue the close marker behind what is already queued.
    pub(crate) fn begin_draining(&self) {
        let mut inner = self.lock();
        inner.state = ExecutorState::Draining;
        inner.items.push_back(WorkItem::Close);
        drop(inner);
        self.available.notify_one();
    }

    /// Block until an item is available. `None` once the queue is closed.
    pub(crate) fn take(&self) -> Option<WorkItem> {
        let inner = self.lock();
        let mut inner = self
            .available
            .wait_while(inner, |q| {
                q.items.is_empty() && q.state != ExecutorState::Closed
            })
            .unwrap_or_else(PoisonError::into_inner);

        if inner.state == ExecutorState::Closed {
            return None;
        }
        inner.items.pop_front()
    }

    /// Close permanently, discarding anything left behind.
    ///
    /// Returns the number of items discarded.
    pub(crate) fn close(&self) -> usize {
        let mut inner = self.lock();
        inner.state = ExecutorState::Closed;
        let discarded = inner.items.len();
        inner.items.clear();
        drop(inner);
        self.available.notify_all();
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_push_take_fifo() {
        let queue = WorkQueue::new();
        for _ in 0..3 {
            queue.push(WorkItem::Resume).unwrap();
        }
        queue.push(WorkItem::Run(Box::new(|| {}))).unwrap();
        assert_eq!(queue.len(), 4);

        for _ in 0..3 {
            assert!(matches!(queue.take(), Some(WorkItem::Resume)));
        }
        assert!(matches!(queue.take(), Some(WorkItem::Run(_))));
    }

    #[test]
    fn test_draining_rejects_new_work_but_keeps_queued() {
        let queue = WorkQueue::new();
        queue.start().unwrap();
        queue.push(WorkItem::Resume).unwrap();
        queue.begin_draining();

        assert_eq!(
            queue.push(WorkItem::Resume).unwrap_err(),
            SchedulingError::ExecutorClosed
        );
        assert!(matches!(queue.take(), Some(WorkItem::Resume)));
        assert!(matches!(queue.take(), Some(WorkItem::Close)));
    }

    #[test]
    fn test_start_only_once() {
        let queue = WorkQueue::new();
        assert!(queue.start().is_ok());
        assert_eq!(queue.start().unwrap_err(), ExecutorState::Running);
    }

    #[test]
    fn test_take_blocks_until_push() {
        let queue = Arc::new(WorkQueue::new());
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                queue.push(WorkItem::Resume).unwrap();
            })
        };

        assert!(matches!(queue.take(), Some(WorkItem::Resume)));
        producer.join().unwrap();
    }

    #[test]
    fn test_close_unblocks_consumer() {
        let queue = Arc::new(WorkQueue::new());
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.take().is_none())
        };

        thread::sleep(Duration::from_millis(30));
        queue.close();
        assert!(consumer.join().unwrap());
        assert_eq!(queue.state(), ExecutorState::Closed);
    }
}
