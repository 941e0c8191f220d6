//! Error handling for shellext.
//!
//! Errors fall into a small taxonomy:
//! - Usage errors (malformed arguments, wrong lifecycle order), surfaced to
//!   the direct caller and never retried
//! - Scheduling errors (work submitted after an executor closed), always
//!   surfaced because they point at a continuation outliving its call
//! - Cancellation, a terminal outcome distinct from failure
//! - Stale resources, recovered locally by the completion adapter
//! - Routine failures, propagated verbatim
//!
//! # Example
//!
//! ```rust
//! use shellext::error::{Result, ShellextError};
//!
//! fn lookup(name: &str) -> Result<u32> {
//!     name.parse::<u32>().map_err(ShellextError::operation)
//! }
//!
//! assert!(lookup("42").is_ok());
//! assert!(lookup("forty-two").is_err());
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{BoxError, ConfigError, Result, SchedulingError, ShellextError, UsageError};
