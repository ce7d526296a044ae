//! Glob-style key patterns.
//!
//! Patterns support `*` as a wildcard matching any sequence of characters
//! (including the empty string). Every other character matches literally.
//! A pattern is compiled once to an anchored regular expression and can
//! then be tested against any number of keys.

use regex::Regex;

use super::{CacheError, Result};

/// A compiled glob pattern over cache keys.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    /// Compiles a glob pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use inscribe_core::cache::KeyPattern;
    ///
    /// let pattern = KeyPattern::compile("Career|list:*").unwrap();
    /// assert!(pattern.matches("Career|list:query|{}"));
    /// assert!(!pattern.matches("Career|id|7"));
    /// assert!(!pattern.matches("Student|list:all|{}"));
    /// ```
    pub fn compile(pattern: &str) -> Result<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex =
            Regex::new(&format!("(?s)^{body}$")).map_err(|e| CacheError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Checks a single key against a glob pattern.
///
/// Prefer [`KeyPattern::compile`] when testing many keys.
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    KeyPattern::compile(pattern).is_ok_and(|p| p.matches(key))
}
