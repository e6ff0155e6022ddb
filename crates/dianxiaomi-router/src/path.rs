//! Route pattern matching.

use regex::{Regex, RegexBuilder};

use crate::error::{Result, RouterError};

/// A compiled route pattern.
///
/// Patterns are regular expressions with named captures, for example
/// `/orders/(?P<id>\d+)`. They are anchored at both ends and matched
/// case-insensitively.
///
/// `\d` and `\D` are ASCII-only: `\d` means `[0-9]`, so a path such as
/// `/orders/١٢` does not match a digit capture. Everything else keeps the
/// `regex` crate's Unicode semantics.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    /// The original pattern string.
    pattern: String,
    /// Compiled, anchored regex.
    regex: Regex,
}

impl RoutePattern {
    /// Compiles a route pattern.
    ///
    /// # Example
    ///
    /// ```
    /// use dianxiaomi_router::RoutePattern;
    ///
    /// let pattern = RoutePattern::new(r"/orders/(?P<id>\d+)/notes").unwrap();
    /// let captures = pattern.match_path("/orders/42/notes").unwrap();
    /// assert_eq!(captures, vec![("id".to_string(), "42".to_string())]);
    /// assert!(pattern.match_path("/orders/abc/notes").is_none());
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        let source = ascii_digit_classes(pattern);
        let regex = RegexBuilder::new(&format!("^(?:{source})$"))
            .case_insensitive(true)
            .build()
            .map_err(|source| RouterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Matches a decoded path against this pattern.
    ///
    /// Returns the named captures in pattern order. Unnamed groups and
    /// named groups that did not participate in the match are skipped.
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(path)?;

        let captures = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Some(captures)
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Rewrites `\d` to `[0-9]` and `\D` to `[^0-9]`.
///
/// Inside a bracket class `\d` becomes the range `0-9`. `\D` inside a
/// class is left to the regex engine.
fn ascii_digit_classes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut class_depth = 0usize;
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('d') if class_depth > 0 => out.push_str("0-9"),
                Some('d') => out.push_str("[0-9]"),
                Some('D') if class_depth == 0 => out.push_str("[^0-9]"),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '[' => {
                class_depth += 1;
                out.push(c);
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}
