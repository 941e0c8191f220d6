//! Waker that funnels wake-ups of the driven routine into its work queue

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::task::{Wake, Waker};

use tracing::trace;

use super::Shared;
use super::queue::WorkItem;

struct ResumeWaker {
    shared: Arc<Shared>,
}

impl Wake for ResumeWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        // Coalesce: one pending Resume is enough however many wakes arrive
        if self.shared.resume_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        if self.shared.queue.push(WorkItem::Resume).is_err() {
            // Leftover registrations (a losing select! branch, a dropped
            // timer) may fire after the routine finished.
            trace!(executor = self.shared.id, "wake after close ignored");
        }
    }
}

/// Waker for the routine driven by `shared`'s executor.
pub(crate) fn resume_waker(shared: Arc<Shared>) -> Waker {
    Waker::from(Arc::new(ResumeWaker { shared }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorState;

    #[test]
    fn test_wakes_are_coalesced() {
        let shared = Arc::new(Shared::new());
        let waker = resume_waker(shared.clone());

        waker.wake_by_ref();
        waker.wake_by_ref();
        waker.clone().wake();

        assert_eq!(shared.queue.len(), 1);
    }

    #[test]
    fn test_wake_after_close_is_silent() {
        let shared = Arc::new(Shared::new());
        shared.queue.close();

        resume_waker(shared.clone()).wake();
        assert_eq!(shared.queue.state(), ExecutorState::Closed);
        assert_eq!(shared.queue.len(), 0);
    }
}
