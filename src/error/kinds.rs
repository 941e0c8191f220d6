use std::{error::Error as StdError, fmt, io};

/// Crate-wide `Result` type using [`ShellextError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ShellextError>;

/// Boxed error produced by user-supplied async routines.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Top-level error type for shellext operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ShellextError {
    /// Caller misuse: bad argument text, missing argument, wrong lifecycle order.
    Usage(UsageError),

    /// Work submitted to an executor that no longer accepts it.
    Scheduling(SchedulingError),

    /// The driven routine observed its cancellation signal and stopped.
    ///
    /// This is a terminal outcome rather than a failure; adapters decide
    /// whether to keep partial results or abort the phase.
    Cancelled,

    /// A lazily produced sequence was consulted after its backing resource
    /// had already been released.
    StaleResource(String),

    /// Failure raised by a user-supplied routine, carried verbatim.
    Operation(BoxError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),
}

/// Usage-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A required argument was absent.
    NullArgument(&'static str),

    /// Text could not be parsed as the requested kind.
    InvalidFormat { kind: &'static str, value: String },

    /// An operation was invoked in a lifecycle state that does not allow it.
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// The object was already disposed.
    Disposed,
}

/// Scheduling-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingError {
    /// The executor has finished its routine and closed its queue.
    ExecutorClosed,
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

impl ShellextError {
    /// Wrap an arbitrary routine failure.
    pub fn operation<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ShellextError::Operation(err.into())
    }

    /// Whether this error represents a cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ShellextError::Cancelled)
    }

    /// Whether this error reports a released backing resource.
    pub fn is_stale_resource(&self) -> bool {
        matches!(self, ShellextError::StaleResource(_))
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ShellextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellextError::Usage(e) => write!(f, "Usage error: {e}"),
            ShellextError::Scheduling(e) => write!(f, "Scheduling error: {e}"),
            ShellextError::Cancelled => write!(f, "Operation was cancelled"),
            ShellextError::StaleResource(what) => {
                write!(f, "Resource already released: {what}")
            }
            ShellextError::Operation(e) => write!(f, "{e}"),
            ShellextError::Config(e) => write!(f, "Configuration error: {e}"),
            ShellextError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::NullArgument(name) => write!(f, "Argument '{name}' must not be null"),
            UsageError::InvalidFormat { kind, value } => {
                write!(f, "'{value}' is not a valid {kind}")
            }
            UsageError::InvalidState { operation, state } => {
                write!(f, "Cannot {operation} while {state}")
            }
            UsageError::Disposed => write!(f, "Object has already been disposed"),
        }
    }
}

impl fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingError::ExecutorClosed => {
                write!(f, "Executor is closed and not accepting work")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl StdError for ShellextError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ShellextError::Operation(e) => Some(e.as_ref()),
            ShellextError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl StdError for UsageError {}
impl StdError for SchedulingError {}
impl StdError for ConfigError {}

/* ========================= Conversions to ShellextError ========================= */

impl From<io::Error> for ShellextError {
    fn from(err: io::Error) -> Self {
        ShellextError::Io(err)
    }
}

impl From<UsageError> for ShellextError {
    fn from(err: UsageError) -> Self {
        ShellextError::Usage(err)
    }
}

impl From<SchedulingError> for ShellextError {
    fn from(err: SchedulingError) -> Self {
        ShellextError::Scheduling(err)
    }
}

impl From<ConfigError> for ShellextError {
    fn from(err: ConfigError) -> Self {
        ShellextError::Config(err)
    }
}

impl From<toml::de::Error> for ShellextError {
    fn from(err: toml::de::Error) -> Self {
        ShellextError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for ShellextError {
    fn from(err: toml::ser::Error) -> Self {
        ShellextError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}
