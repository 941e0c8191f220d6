//! Completion results returned to the host

use serde::{Deserialize, Serialize};

use crate::quoting::QuotationStyle;

/// Kind of value a completion result inserts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionResultType {
    /// Argument value for a parameter
    #[default]
    ParameterValue,
    /// Free text
    Text,
    /// Item from a provider such as a path
    ProviderItem,
    /// Command name
    Command,
}

/// One completion candidate handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Text inserted into the command line, already quoted
    pub completion_text: String,
    /// Text shown in the completion list
    pub list_item_text: String,
    /// Kind of value
    pub result_type: CompletionResultType,
    /// Tooltip shown next to the list item
    pub tooltip: String,
}

impl CompletionResult {
    pub fn new(
        completion_text: impl Into<String>,
        list_item_text: impl Into<String>,
        result_type: CompletionResultType,
        tooltip: impl Into<String>,
    ) -> Self {
        Self {
            completion_text: completion_text.into(),
            list_item_text: list_item_text.into(),
            result_type,
            tooltip: tooltip.into(),
        }
    }

    /// Parameter-value result for `value`, re-quoted in `style`.
    ///
    /// The bare value doubles as list text and tooltip.
    pub fn from_value(style: QuotationStyle, value: &str) -> Self {
        Self::new(
            style.quote(value),
            value,
            CompletionResultType::ParameterValue,
            value,
        )
    }

    /// Replace the tooltip.
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }
}
