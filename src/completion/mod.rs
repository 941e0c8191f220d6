//! Completion value types
//!
//! - **CompletionRequest**: what the host asked to complete
//! - **WildcardPattern**: the prefix predicate derived from the typed word
//! - **CompletionResult**: a candidate handed back to the host
//!
//! The async-to-sync adapter that produces results lives in
//! [`crate::adapter::completer`].

mod request;
mod result;
mod wildcard;

pub use request::{BoundParameters, CommandAst, CompletionRequest, SyntaxNode};
pub use result::{CompletionResult, CompletionResultType};
pub use wildcard::WildcardPattern;
