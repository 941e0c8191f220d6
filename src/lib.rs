//! Async extension layer for synchronous shell hosts
//!
//! Shell hosts call extensions through synchronous entry points: a command's
//! prepare/process/finish hooks, an argument completer's "complete this
//! word" call. This library lets that logic be written as async code and
//! bridges it back to the blocking call.
//!
//! # Modules
//!
//! - `quoting`: Quotation style of shell tokens, stripping and re-applying quotes
//! - `completion`: Completion request, wildcard predicate and result types
//! - `executor`: Single-threaded executor that runs async routines to completion
//!   on the calling thread, plus cancellation signals
//! - `adapter`: Lifecycle and completion adapters built on the executor
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `logging`: Tracing subscriber setup
//! - `cli`: Command-line interface of the demo binary
//!
//! # Example
//!
//! ```no_run
//! use shellext::adapter::{CompletionAdapter, WordListCompleter};
//! use shellext::completion::{BoundParameters, CommandAst};
//!
//! let adapter = CompletionAdapter::new(WordListCompleter::new(["alpha", "beta"]));
//! let ast = CommandAst::new("Get-Thing -Name 'al");
//! let bound = BoundParameters::new();
//!
//! let results = adapter.complete_argument("Get-Thing", "Name", "'al", &ast, &bound)?;
//! assert_eq!(results[0].completion_text, "'alpha'");
//! # Ok::<(), shellext::ShellextError>(())
//! ```

pub mod adapter;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod quoting;

// Re-export commonly used types
pub use adapter::{AsyncCommand, AsyncCompleter, CommandAdapter, CompletionAdapter};
pub use completion::{CompletionRequest, CompletionResult};
pub use config::Config;
pub use error::{Result, ShellextError};
pub use executor::{CancellationSignal, Scheduler, SingleThreadExecutor, StopHandle, run_blocking};
pub use quoting::QuotationStyle;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
