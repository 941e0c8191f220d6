//! Adapters from async extension logic to a host's synchronous entry points
//!
//! - [`CommandAdapter`] drives an [`AsyncCommand`] through prepare, process
//!   and finish, one blocking call per phase
//! - [`CompletionAdapter`] turns an [`AsyncCompleter`]'s candidate stream
//!   into a time-boxed list
//!
//! Both run their async code through
//! [`SingleThreadExecutor::run_blocking`](crate::executor::SingleThreadExecutor::run_blocking).

pub mod command;
pub mod completer;

pub use command::{AsyncCommand, CommandAdapter, LifecycleState};
pub use completer::{
    AsyncCompleter, CompletionAdapter, DEFAULT_COMPLETION_TIMEOUT, WordListCompleter,
};
