//! Completion request context

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::wildcard::WildcardPattern;
use crate::quoting::QuotationStyle;

/// Parameters already bound on the command being completed.
pub type BoundParameters = HashMap<String, serde_json::Value>;

/// Host syntax-tree node for the command invocation being completed.
///
/// The node is owned by the host; requests only borrow it.
pub trait SyntaxNode: fmt::Debug {
    /// Source text of the node.
    fn text(&self) -> &str;
}

/// Minimal command syntax node for hosts without a richer tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandAst {
    /// Full source text of the command invocation
    pub text: String,
}

impl CommandAst {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl SyntaxNode for CommandAst {
    fn text(&self) -> &str {
        &self.text
    }
}

/// Immutable description of one argument-completion request.
///
/// Built once when the completion adapter is invoked and discarded when it
/// returns. The syntax node and bound-parameter map are compared by identity.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    command_name: String,
    parameter_name: String,
    word_to_complete: String,
    word: String,
    quotation: QuotationStyle,
    pattern: WildcardPattern,
    command_ast: &'a dyn SyntaxNode,
    bound_parameters: &'a BoundParameters,
}

impl<'a> CompletionRequest<'a> {
    /// Build a request from the raw host arguments.
    ///
    /// The raw word is split into its quotation style and interior, and the
    /// interior becomes a case-insensitive prefix pattern.
    pub fn new(
        command_name: impl Into<String>,
        parameter_name: impl Into<String>,
        word_to_complete: impl Into<String>,
        command_ast: &'a dyn SyntaxNode,
        bound_parameters: &'a BoundParameters,
    ) -> Self {
        let word_to_complete = word_to_complete.into();
        let (quotation, word) = QuotationStyle::extract(&word_to_complete);
        let word = word.to_string();
        let pattern = WildcardPattern::for_prefix(&word);

        Self {
            command_name: command_name.into(),
            parameter_name: parameter_name.into(),
            word_to_complete,
            word,
            quotation,
            pattern,
            command_ast,
            bound_parameters,
        }
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// Raw word as typed, quotes included.
    pub fn word_to_complete(&self) -> &str {
        &self.word_to_complete
    }

    /// Word with its quoting stripped.
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn quotation(&self) -> QuotationStyle {
        self.quotation
    }

    pub fn pattern(&self) -> &WildcardPattern {
        &self.pattern
    }

    pub fn command_ast(&self) -> &'a dyn SyntaxNode {
        self.command_ast
    }

    pub fn bound_parameters(&self) -> &'a BoundParameters {
        self.bound_parameters
    }

    /// Whether `candidate` matches the typed prefix.
    pub fn matches(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }

    fn ast_addr(&self) -> *const () {
        self.command_ast as *const _ as *const ()
    }

    fn bound_addr(&self) -> *const () {
        self.bound_parameters as *const _ as *const ()
    }
}

impl PartialEq for CompletionRequest<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.command_name == other.command_name
            && self.parameter_name == other.parameter_name
            && self.word_to_complete == other.word_to_complete
            && self.word == other.word
            && self.quotation == other.quotation
            && self.pattern == other.pattern
            && self.ast_addr() == other.ast_addr()
            && self.bound_addr() == other.bound_addr()
    }
}

impl Eq for CompletionRequest<'_> {}

impl Hash for CompletionRequest<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.command_name.hash(state);
        self.parameter_name.hash(state);
        self.word_to_complete.hash(state);
        self.quotation.hash(state);
        self.ast_addr().hash(state);
        self.bound_addr().hash(state);
    }
}

impl fmt::Display for CompletionRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -{} {} (pattern '{}', quotation {}, {} bound)",
            self.command_name,
            self.parameter_name,
            self.word_to_complete,
            self.pattern,
            self.quotation,
            self.bound_parameters.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(request: &CompletionRequest<'_>) -> u64 {
        let mut hasher = DefaultHasher::new();
        request.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_request_unwraps_quoted_word() {
        let ast = CommandAst::new("Get-Thing -Name 'wor");
        let bound = BoundParameters::new();
        let request = CompletionRequest::new("Get-Thing", "Name", "'wor", &ast, &bound);

        assert_eq!(request.word(), "wor");
        assert_eq!(request.word_to_complete(), "'wor");
        assert_eq!(request.quotation(), QuotationStyle::SingleQuote);
        assert_eq!(request.pattern().as_str(), "wor*");
        assert!(request.matches("World"));
        assert!(!request.matches("sword"));
    }

    #[test]
    fn test_equality_uses_identity_for_borrowed_fields() {
        let ast = CommandAst::new("Get-Thing");
        let same_text_ast = CommandAst::new("Get-Thing");
        let bound = BoundParameters::new();

        let a = CompletionRequest::new("Get-Thing", "Name", "x", &ast, &bound);
        let b = CompletionRequest::new("Get-Thing", "Name", "x", &ast, &bound);
        let c = CompletionRequest::new("Get-Thing", "Name", "x", &same_text_ast, &bound);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_summary() {
        let ast = CommandAst::new("Get-Thing -Name ab");
        let mut bound = BoundParameters::new();
        bound.insert("Path".to_string(), serde_json::json!("/tmp"));
        let request = CompletionRequest::new("Get-Thing", "Name", "ab", &ast, &bound);

        let summary = request.to_string();
        assert!(summary.starts_with("Get-Thing -Name ab"));
        assert!(summary.contains("1 bound"));
        assert_eq!(request.bound_parameters()["Path"], "/tmp");
    }
}
