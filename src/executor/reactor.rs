//! Background tokio runtime providing timer, signal and I/O drivers
//!
//! Routines driven by `run_blocking` may use `tokio::time`, `tokio::signal`
//! or tokio I/O. Those need a runtime context for registration, and a thread
//! to fire the wake-ups. The reactor supplies both; the wake-ups it fires
//! land in the executor's queue, so continuations still run on the thread
//! that called `run_blocking`.

use std::sync::OnceLock;

use tokio::runtime::{Builder, EnterGuard, Handle, Runtime};
use tracing::{debug, warn};

static REACTOR: OnceLock<Option<Runtime>> = OnceLock::new();

fn runtime() -> Option<&'static Runtime> {
    REACTOR
        .get_or_init(|| {
            match Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("shellext-reactor")
                .enable_all()
                .build()
            {
                Ok(runtime) => {
                    debug!("reactor runtime started");
                    Some(runtime)
                }
                Err(e) => {
                    warn!("failed to start reactor runtime: {e}");
                    None
                }
            }
        })
        .as_ref()
}

/// Handle to the reactor runtime, starting it on first use.
pub fn handle() -> Option<Handle> {
    runtime().map(|rt| rt.handle().clone())
}

/// Enter the reactor's runtime context for the current scope.
pub(crate) fn enter() -> Option<EnterGuard<'static>> {
    runtime().map(Runtime::enter)
}
