//! Quotation style of shell tokens
//!
//! A token typed at the shell may be bare, single-quoted or double-quoted.
//! Completion has to strip that quoting to match candidates, then apply the
//! same quoting to whatever it hands back, so that the inserted text lexes
//! the way the user started typing it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UsageError};

/// Escape leader used inside double-quoted strings.
const ESCAPE_LEADER: char = '`';

/// How a shell token is quoted.
///
/// Variants are ordered `None < SingleQuote < DoubleQuote`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum QuotationStyle {
    /// Bare word
    #[default]
    None,
    /// `'verbatim'`
    SingleQuote,
    /// `"expandable"`
    DoubleQuote,
}

impl QuotationStyle {
    /// All styles in ascending order.
    pub const ALL: [QuotationStyle; 3] = [
        QuotationStyle::None,
        QuotationStyle::SingleQuote,
        QuotationStyle::DoubleQuote,
    ];

    /// Parse a style from its name (case-insensitive) or its quote character.
    ///
    /// Accepts `None`, `SingleQuote`, `DoubleQuote`, `'`, `"` and the empty
    /// string. An absent input is a [`UsageError::NullArgument`]; anything
    /// else is a [`UsageError::InvalidFormat`].
    pub fn parse(text: Option<&str>) -> Result<Self> {
        let text = text.ok_or(UsageError::NullArgument("text"))?;
        Self::match_text(text).ok_or_else(|| {
            UsageError::InvalidFormat {
                kind: "quotation style",
                value: text.to_string(),
            }
            .into()
        })
    }

    /// Non-failing variant of [`QuotationStyle::parse`].
    pub fn try_parse(text: Option<&str>) -> Option<Self> {
        text.and_then(Self::match_text)
    }

    fn match_text(text: &str) -> Option<Self> {
        match text {
            "" => Some(QuotationStyle::None),
            "'" => Some(QuotationStyle::SingleQuote),
            "\"" => Some(QuotationStyle::DoubleQuote),
            _ => Self::ALL
                .into_iter()
                .find(|style| style.name().eq_ignore_ascii_case(text)),
        }
    }

    /// Split a raw token into its quotation style and unquoted interior.
    ///
    /// The first character decides the style. A missing closing quote is
    /// tolerated, so `"abc` yields `(DoubleQuote, "abc")`. Tokens that do not
    /// start with a quote come back verbatim with style `None`; blank input
    /// yields `(None, "")`.
    pub fn extract(text: &str) -> (Self, &str) {
        if text.trim().is_empty() {
            return (QuotationStyle::None, "");
        }

        let style = match text.chars().next() {
            Some('\'') => QuotationStyle::SingleQuote,
            Some('"') => QuotationStyle::DoubleQuote,
            _ => return (QuotationStyle::None, text),
        };

        // Both quote characters are one byte wide
        let interior = &text[1..];
        let interior = style
            .quote_char()
            .and_then(|quote| interior.strip_suffix(quote))
            .unwrap_or(interior);

        (style, interior)
    }

    /// Wrap `text` so the shell lexes it back as `text` under this style.
    ///
    /// `None` leaves pure word text (letters, digits, underscore) bare and
    /// otherwise falls back to single quotes.
    pub fn quote(&self, text: &str) -> String {
        match self {
            QuotationStyle::None if is_word(text) => text.to_string(),
            QuotationStyle::None | QuotationStyle::SingleQuote => single_quote(text),
            QuotationStyle::DoubleQuote => double_quote(text),
        }
    }

    /// The quote character for this style, if any.
    pub fn quote_char(&self) -> Option<char> {
        match self {
            QuotationStyle::None => None,
            QuotationStyle::SingleQuote => Some('\''),
            QuotationStyle::DoubleQuote => Some('"'),
        }
    }

    /// Display name of the style.
    pub fn name(&self) -> &'static str {
        match self {
            QuotationStyle::None => "None",
            QuotationStyle::SingleQuote => "SingleQuote",
            QuotationStyle::DoubleQuote => "DoubleQuote",
        }
    }
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn single_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        if c == '\'' {
            quoted.push('\'');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

fn double_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    // One pass: the leader itself is escaped as it is met, so escapes
    // introduced here are never escaped a second time.
    for c in text.chars() {
        let escaped = match c {
            ESCAPE_LEADER => Some(ESCAPE_LEADER),
            '$' => Some('$'),
            '\r' => Some('r'),
            '\n' => Some('n'),
            '\t' => Some('t'),
            '"' => Some('"'),
            '\u{07}' => Some('a'),
            '\u{08}' => Some('b'),
            '\u{1b}' => Some('e'),
            '\u{0c}' => Some('f'),
            '\u{0b}' => Some('v'),
            _ => None,
        };
        match escaped {
            Some(code) => {
                quoted.push(ESCAPE_LEADER);
                quoted.push(code);
            }
            None => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for QuotationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuotationStyle {
    type Err = crate::error::ShellextError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Some(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellextError;

    #[test]
    fn test_parse_names_case_insensitive() {
        assert_eq!(
            QuotationStyle::parse(Some("singlequote")).unwrap(),
            QuotationStyle::SingleQuote
        );
        assert_eq!(
            QuotationStyle::parse(Some("DOUBLEQUOTE")).unwrap(),
            QuotationStyle::DoubleQuote
        );
        assert_eq!(
            QuotationStyle::parse(Some("None")).unwrap(),
            QuotationStyle::None
        );
    }

    #[test]
    fn test_parse_quote_characters() {
        assert_eq!(
            QuotationStyle::parse(Some("'")).unwrap(),
            QuotationStyle::SingleQuote
        );
        assert_eq!(
            QuotationStyle::parse(Some("\"")).unwrap(),
            QuotationStyle::DoubleQuote
        );
        assert_eq!(QuotationStyle::parse(Some("")).unwrap(), QuotationStyle::None);
    }

    #[test]
    fn test_parse_rejects_unknown_and_absent() {
        let err = QuotationStyle::parse(Some("Backtick")).unwrap_err();
        assert!(matches!(
            err,
            ShellextError::Usage(UsageError::InvalidFormat { .. })
        ));

        // Surrounding whitespace is not one of the accepted spellings
        for padded in [" None ", "SingleQuote\n", " '"] {
            assert!(QuotationStyle::parse(Some(padded)).is_err(), "{padded:?}");
            assert_eq!(QuotationStyle::try_parse(Some(padded)), None);
        }

        let err = QuotationStyle::parse(None).unwrap_err();
        assert!(matches!(
            err,
            ShellextError::Usage(UsageError::NullArgument("text"))
        ));
    }

    #[test]
    fn test_try_parse() {
        assert_eq!(QuotationStyle::try_parse(None), None);
        assert_eq!(QuotationStyle::try_parse(Some("``")), None);
        assert_eq!(
            QuotationStyle::try_parse(Some("'")),
            Some(QuotationStyle::SingleQuote)
        );
    }

    #[test]
    fn test_display_round_trip() {
        for spelling in ["None", "singlequote", "DoubleQuote", "'", "\"", ""] {
            let style = QuotationStyle::try_parse(Some(spelling)).unwrap();
            let reparsed: QuotationStyle = style.to_string().parse().unwrap();
            assert_eq!(reparsed, style);
        }
    }

    #[test]
    fn test_ordering() {
        assert!(QuotationStyle::None < QuotationStyle::SingleQuote);
        assert!(QuotationStyle::SingleQuote < QuotationStyle::DoubleQuote);
    }

    #[test]
    fn test_extract() {
        assert_eq!(
            QuotationStyle::extract("'abc'"),
            (QuotationStyle::SingleQuote, "abc")
        );
        assert_eq!(
            QuotationStyle::extract("\"abc"),
            (QuotationStyle::DoubleQuote, "abc")
        );
        assert_eq!(
            QuotationStyle::extract("abc'"),
            (QuotationStyle::None, "abc'")
        );
        assert_eq!(
            QuotationStyle::extract("'abc\""),
            (QuotationStyle::SingleQuote, "abc\"")
        );
        assert_eq!(QuotationStyle::extract("'"), (QuotationStyle::SingleQuote, ""));
        assert_eq!(QuotationStyle::extract("   "), (QuotationStyle::None, ""));
        assert_eq!(QuotationStyle::extract(""), (QuotationStyle::None, ""));
    }

    #[test]
    fn test_quote_examples() {
        assert_eq!(QuotationStyle::None.quote("abc123"), "abc123");
        assert_eq!(QuotationStyle::None.quote("a b"), "'a b'");
        assert_eq!(QuotationStyle::None.quote(""), "''");
        assert_eq!(QuotationStyle::SingleQuote.quote("it's"), "'it''s'");
        assert_eq!(QuotationStyle::SingleQuote.quote("abc"), "'abc'");
        assert_eq!(QuotationStyle::DoubleQuote.quote("a$b"), "\"a`$b\"");
    }

    #[test]
    fn test_double_quote_escapes() {
        assert_eq!(QuotationStyle::DoubleQuote.quote("a`b"), "\"a``b\"");
        assert_eq!(
            QuotationStyle::DoubleQuote.quote("x\r\n\t\"y"),
            "\"x`r`n`t`\"y\""
        );
        assert_eq!(
            QuotationStyle::DoubleQuote.quote("\u{07}\u{08}\u{1b}\u{0c}\u{0b}"),
            "\"`a`b`e`f`v\""
        );
        // Already escaped input is escaped once more, never collapsed
        assert_eq!(QuotationStyle::DoubleQuote.quote("`$"), "\"```$\"");
    }

    #[test]
    fn test_extract_then_quote_is_stable() {
        for style in QuotationStyle::ALL {
            for s in ["plain", "two words", "dollar$sign", "tab\there"] {
                let quoted = style.quote(s);
                let (_, interior) = QuotationStyle::extract(&quoted);
                // Interior is the escaped form; re-quoting must not double up
                // when there are no characters needing escape.
                if !s.contains(['$', '\t', '\'']) {
                    assert_eq!(style.quote(interior), quoted, "style {style}, input {s}");
                }
            }
        }
    }

    #[test]
    fn test_serde_by_name() {
        let json = serde_json::to_string(&QuotationStyle::DoubleQuote).unwrap();
        assert_eq!(json, "\"DoubleQuote\"");
        let style: QuotationStyle = serde_json::from_str("\"SingleQuote\"").unwrap();
        assert_eq!(style, QuotationStyle::SingleQuote);
    }
}
