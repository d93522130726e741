//! Locating the substring of a URL to increment.
//!
//! [`find_selection`] never fails: when nothing suitable is found it returns
//! [`SelectionResult::none`]. Custom patterns that do not compile or do not
//! match fall back to the [`SelectionStrategy::Prefixes`] chain.

mod custom;

pub use custom::CustomSelection;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// How the selection is located in a URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SelectionStrategy {
    /// `page=`, then `p=`/`id=`/`next=`, then a number after `=` or `/`,
    /// then the last number.
    #[default]
    #[serde(alias = "smart")]
    Prefixes,
    /// The last run of digits.
    LastNumber,
    /// The first run of digits.
    FirstNumber,
    /// A user-supplied regular expression.
    Custom(CustomSelection),
}

/// A located selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionResult {
    /// The selected substring, empty when nothing was found.
    pub selection: String,
    /// Byte offset of the selection in the URL.
    pub selection_start: Option<usize>,
}

impl SelectionResult {
    /// Creates a result for a selection found at `start`.
    #[must_use]
    pub fn new(selection: impl Into<String>, start: usize) -> Self {
        Self {
            selection: selection.into(),
            selection_start: Some(start),
        }
    }

    /// The empty result.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a selection was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        !self.selection.is_empty() && self.selection_start.is_some()
    }
}

#[allow(clippy::expect_used)]
static PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)page=([0-9]+)").expect("page pattern is valid"));

#[allow(clippy::expect_used)]
static TERMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:p|id|next)=([0-9]+)").expect("terms pattern is valid"));

#[allow(clippy::expect_used)]
static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[=/]([0-9]+)").expect("prefix pattern is valid"));

#[allow(clippy::expect_used)]
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("number pattern is valid"));

fn first_group(re: &Regex, url: &str) -> Option<SelectionResult> {
    let group = re.captures(url)?.get(1)?;
    Some(SelectionResult::new(group.as_str(), group.start()))
}

fn last_group(re: &Regex, url: &str) -> Option<SelectionResult> {
    let group = re.captures_iter(url).last()?.get(1)?;
    Some(SelectionResult::new(group.as_str(), group.start()))
}

fn last_number(url: &str) -> Option<SelectionResult> {
    let m = NUMBER_RE.find_iter(url).last()?;
    Some(SelectionResult::new(m.as_str(), m.start()))
}

fn first_number(url: &str) -> Option<SelectionResult> {
    let m = NUMBER_RE.find(url)?;
    Some(SelectionResult::new(m.as_str(), m.start()))
}

fn prefixes(url: &str) -> Option<SelectionResult> {
    first_group(&PAGE_RE, url)
        .or_else(|| first_group(&TERMS_RE, url))
        .or_else(|| last_group(&PREFIX_RE, url))
        .or_else(|| last_number(url))
}

/// Finds the selection in `url` using the given strategy.
#[must_use]
pub fn find_selection(url: &str, strategy: &SelectionStrategy) -> SelectionResult {
    let found = match strategy {
        SelectionStrategy::Prefixes => prefixes(url),
        SelectionStrategy::LastNumber => last_number(url),
        SelectionStrategy::FirstNumber => first_number(url),
        SelectionStrategy::Custom(custom) => match custom.validate(url) {
            Ok(result) => Some(result),
            Err(error) => {
                debug!(pattern = %custom.pattern, %error, "Custom selection failed, using prefixes");
                prefixes(url)
            }
        },
    };
    found.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_outranks_id() {
        let result = find_selection("http://x.com/page=5&id=9", &SelectionStrategy::Prefixes);
        assert_eq!(result, SelectionResult::new("5", 18));
    }

    #[test]
    fn test_page_is_case_insensitive() {
        let result = find_selection("http://x.com/?PAGE=12", &SelectionStrategy::Prefixes);
        assert_eq!(result, SelectionResult::new("12", 19));
    }

    #[test]
    fn test_terms_then_prefix_then_last() {
        let url = "http://x.com/a/7/b?id=42&q=3";
        assert_eq!(find_selection(url, &SelectionStrategy::Prefixes).selection, "42");

        let url = "http://x.com/a/7/b/x8";
        assert_eq!(
            find_selection(url, &SelectionStrategy::Prefixes),
            SelectionResult::new("7", 15)
        );

        let url = "http://x.com/file-2.html";
        assert_eq!(find_selection(url, &SelectionStrategy::Prefixes).selection, "2");
    }

    #[test]
    fn test_last_prefix_match_wins() {
        let url = "http://x.com/2019/10/post";
        assert_eq!(
            find_selection(url, &SelectionStrategy::Prefixes),
            SelectionResult::new("10", 18)
        );
    }

    #[test]
    fn test_first_and_last_number() {
        let url = "http://x.com/12/34/56";
        assert_eq!(
            find_selection(url, &SelectionStrategy::FirstNumber),
            SelectionResult::new("12", 13)
        );
        assert_eq!(
            find_selection(url, &SelectionStrategy::LastNumber),
            SelectionResult::new("56", 19)
        );
    }

    #[test]
    fn test_no_digits() {
        let result = find_selection("http://example.com/", &SelectionStrategy::Prefixes);
        assert_eq!(result, SelectionResult::none());
        assert!(!result.is_found());
    }

    #[test]
    fn test_custom_falls_back_to_prefixes() {
        let strategy = SelectionStrategy::Custom(CustomSelection::new("(unclosed", 1));
        let result = find_selection("http://x.com/?page=3", &strategy);
        assert_eq!(result.selection, "3");
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: SelectionStrategy =
            serde_json::from_value(serde_json::json!({"type": "smart"})).unwrap();
        assert_eq!(strategy, SelectionStrategy::Prefixes);

        let strategy: SelectionStrategy = serde_json::from_value(serde_json::json!({
            "type": "custom",
            "pattern": "v(\\d+)",
            "group": 1
        }))
        .unwrap();
        assert!(matches!(strategy, SelectionStrategy::Custom(c) if c.group == 1));
    }
}
