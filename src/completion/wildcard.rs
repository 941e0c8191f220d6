//! Wildcard match predicate for completion candidates
//!
//! Supports the shell's wildcard dialect: `*` matches any run of characters,
//! `?` matches exactly one, `[abc]` and `[a-z]` match a set or range, and the
//! backtick escapes the next character. An unterminated `[` is literal.

use std::fmt;

const ESCAPE: char = '`';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    AnySequence,
    Set(Vec<SetItem>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SetItem {
    Char(char),
    Range(char, char),
}

/// Compiled wildcard pattern.
#[derive(Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    source: String,
    tokens: Vec<Token>,
    ignore_case: bool,
}

impl WildcardPattern {
    /// Compile `pattern`.
    pub fn new(pattern: &str, ignore_case: bool) -> Self {
        Self {
            source: pattern.to_string(),
            tokens: compile(pattern),
            ignore_case,
        }
    }

    /// Case-insensitive "starts with `prefix`" predicate.
    ///
    /// Wildcard characters the user typed in `prefix` keep their meaning.
    pub fn for_prefix(prefix: &str) -> Self {
        Self::new(&format!("{prefix}*"), true)
    }

    /// Pattern text this predicate was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `candidate` matches the whole pattern.
    pub fn is_match(&self, candidate: &str) -> bool {
        let text: Vec<char> = candidate.chars().collect();
        let tokens = &self.tokens;

        let (mut t, mut p) = (0usize, 0usize);
        // Position after the last `*` seen and the text index it resumed at
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            if p < tokens.len() {
                match &tokens[p] {
                    Token::AnySequence => {
                        backtrack = Some((p + 1, t));
                        p += 1;
                        continue;
                    }
                    token if self.matches_one(token, text[t]) => {
                        p += 1;
                        t += 1;
                        continue;
                    }
                    _ => {}
                }
            }
            match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            }
        }

        tokens[p..].iter().all(|token| *token == Token::AnySequence)
    }

    fn matches_one(&self, token: &Token, c: char) -> bool {
        match token {
            Token::AnyChar => true,
            Token::AnySequence => false,
            Token::Literal(l) => self.char_eq(*l, c),
            Token::Set(items) => items.iter().any(|item| match item {
                SetItem::Char(l) => self.char_eq(*l, c),
                SetItem::Range(lo, hi) => {
                    (*lo..=*hi).contains(&c)
                        || (self.ignore_case && {
                            let folded = fold(c);
                            (fold(*lo)..=fold(*hi)).contains(&folded)
                        })
                }
            }),
        }
    }

    fn char_eq(&self, a: char, b: char) -> bool {
        a == b || (self.ignore_case && fold(a) == fold(b))
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn compile(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ESCAPE if i + 1 < chars.len() => {
                tokens.push(Token::Literal(chars[i + 1]));
                i += 2;
            }
            '*' => {
                // Collapse runs of stars
                if tokens.last() != Some(&Token::AnySequence) {
                    tokens.push(Token::AnySequence);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '[' => match compile_set(&chars[i + 1..]) {
                Some((items, consumed)) => {
                    tokens.push(Token::Set(items));
                    i += consumed + 1;
                }
                None => {
                    tokens.push(Token::Literal('['));
                    i += 1;
                }
            },
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }

    tokens
}

/// Parse a bracket set body; returns the items and the number of characters
/// consumed including the closing `]`.
fn compile_set(chars: &[char]) -> Option<(Vec<SetItem>, usize)> {
    let mut items = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = match chars[i] {
            ']' if !items.is_empty() => return Some((items, i + 1)),
            ESCAPE if i + 1 < chars.len() => {
                i += 1;
                chars[i]
            }
            c => c,
        };

        if i + 2 < chars.len() && chars[i + 1] == '-' && chars[i + 2] != ']' {
            items.push(SetItem::Range(c, chars[i + 2]));
            i += 3;
        } else {
            items.push(SetItem::Char(c));
            i += 1;
        }
    }

    None
}

impl fmt::Debug for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WildcardPattern")
            .field("pattern", &self.source)
            .field("ignore_case", &self.ignore_case)
            .finish()
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_ignores_case() {
        let pattern = WildcardPattern::for_prefix("get-");
        assert!(pattern.is_match("Get-ChildItem"));
        assert!(pattern.is_match("get-"));
        assert!(!pattern.is_match("Set-Item"));
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let pattern = WildcardPattern::for_prefix("");
        assert!(pattern.is_match(""));
        assert!(pattern.is_match("anything at all"));
    }

    #[test]
    fn test_question_mark_and_star() {
        let pattern = WildcardPattern::new("a?c*z", false);
        assert!(pattern.is_match("abcz"));
        assert!(pattern.is_match("abc123z"));
        assert!(!pattern.is_match("ac123z"));
        assert!(!pattern.is_match("ABCZ"));
    }

    #[test]
    fn test_star_backtracking() {
        let pattern = WildcardPattern::new("*ab*ab", true);
        assert!(pattern.is_match("xxabyyab"));
        assert!(pattern.is_match("abab"));
        assert!(!pattern.is_match("abba"));
    }

    #[test]
    fn test_sets_and_ranges() {
        let pattern = WildcardPattern::new("file[0-9].[ct]xt", true);
        assert!(pattern.is_match("file7.txt"));
        assert!(pattern.is_match("FILE1.CXT"));
        assert!(!pattern.is_match("fileA.txt"));
    }

    #[test]
    fn test_escape_and_unterminated_bracket() {
        let escaped = WildcardPattern::new("a`*b", false);
        assert!(escaped.is_match("a*b"));
        assert!(!escaped.is_match("axb"));

        let literal = WildcardPattern::for_prefix("[abc");
        assert!(literal.is_match("[abcdef"));
    }
}
