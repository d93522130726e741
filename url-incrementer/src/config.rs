//! Settings the incrementer is configured from.
//!
//! [`Settings`] mirrors the persisted option values the engine consumes. Every
//! field has a serde default so partial documents load cleanly.

use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;
use crate::instance::ToolkitTool;
use crate::links::{LinkDirection, LinkQuery, LinkRule, RuleKind};
use crate::mutator::{ErrorCode, ErrorCodeSet};
use crate::selection::SelectionStrategy;
use crate::transform::{Base, BaseCase, Direction, TransformParams};

/// Largest accepted shuffle limit.
pub const MAX_SHUFFLE_LIMIT: usize = 5000;

/// Largest accepted auto step count and toolkit quantity.
pub const MAX_SEQUENCE_TIMES: u32 = 10_000;

/// A named, non-numeric base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedBase {
    /// Use `base_date_format`.
    Date,
    /// Roman numerals.
    Roman,
    /// Use `base_custom`.
    Custom,
}

/// The configured base: a radix or a named base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseSetting {
    /// Numeric radix 2-36.
    Radix(u32),
    /// Date, roman or custom alphabet.
    Named(NamedBase),
}

impl Default for BaseSetting {
    fn default() -> Self {
        Self::Radix(10)
    }
}

/// Incrementer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Step size.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Pad results when the selection has leading zeros.
    #[serde(default = "default_true")]
    pub leading_zeros_pad_by_detection: bool,
    /// Number of URLs generated for shuffle mode.
    #[serde(default = "default_shuffle_limit")]
    pub shuffle_limit: usize,
    /// Base of the selection.
    #[serde(default)]
    pub base: BaseSetting,
    /// Letter case for alphanumeric bases.
    #[serde(default)]
    pub base_case: BaseCase,
    /// Token format for date bases.
    #[serde(default = "default_date_format")]
    pub base_date_format: String,
    /// Alphabet for custom bases.
    #[serde(default = "default_base_custom")]
    pub base_custom: String,
    /// How the selection is located.
    #[serde(default)]
    pub selection_strategy: SelectionStrategy,
    /// Number of error responses to skip past.
    #[serde(default)]
    pub error_skip: u32,
    /// Status classes that count as errors.
    #[serde(default = "default_error_codes")]
    pub error_codes: Vec<ErrorCode>,
    /// Exact status codes that count as errors when `CUS` is enabled.
    #[serde(default)]
    pub error_codes_custom: Vec<u16>,
    /// Rule kind used for next links.
    #[serde(default)]
    pub next_type: RuleKind,
    /// Selector rule for next links.
    #[serde(default = "default_next_selector")]
    pub next_selector: String,
    /// XPath rule for next links.
    #[serde(default = "default_next_xpath")]
    pub next_xpath: String,
    /// Attribute path read from the next rule's element.
    #[serde(default = "default_attribute")]
    pub next_attribute: Vec<String>,
    /// Rule kind used for prev links.
    #[serde(default)]
    pub prev_type: RuleKind,
    /// Selector rule for prev links.
    #[serde(default = "default_prev_selector")]
    pub prev_selector: String,
    /// XPath rule for prev links.
    #[serde(default = "default_prev_xpath")]
    pub prev_xpath: String,
    /// Attribute path read from the prev rule's element.
    #[serde(default = "default_attribute")]
    pub prev_attribute: Vec<String>,
    /// Fall back to keyword inference when the rule finds nothing.
    #[serde(default = "default_true")]
    pub next_prev_keywords_enabled: bool,
    /// Keywords for next links, highest priority first.
    #[serde(default = "default_next_keywords")]
    pub next_keywords: Vec<String>,
    /// Keywords for prev links, highest priority first.
    #[serde(default = "default_prev_keywords")]
    pub prev_keywords: Vec<String>,
    /// Only accept links on the document's host.
    #[serde(default = "default_true")]
    pub next_prev_same_domain_policy: bool,
    /// Percent-decode candidate link URLs.
    #[serde(default)]
    pub decode_uri_enabled: bool,
    /// Direction of auto mode.
    #[serde(default)]
    pub auto_action: Direction,
    /// Number of auto steps.
    #[serde(default = "default_times")]
    pub auto_times: u32,
    /// Toolkit tool.
    #[serde(default)]
    pub toolkit_tool: ToolkitTool,
    /// Direction of toolkit generation.
    #[serde(default)]
    pub toolkit_action: Direction,
    /// Number of toolkit URLs.
    #[serde(default = "default_times")]
    pub toolkit_quantity: u32,
}

fn default_interval() -> u64 {
    1
}

fn default_true() -> bool {
    true
}

fn default_shuffle_limit() -> usize {
    100
}

fn default_date_format() -> String {
    "yyyy/mm/dd".to_string()
}

fn default_base_custom() -> String {
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz".to_string()
}

fn default_error_codes() -> Vec<ErrorCode> {
    vec![ErrorCode::NotFound, ErrorCode::Redirection]
}

fn default_next_selector() -> String {
    r#"[rel="next"]"#.to_string()
}

fn default_next_xpath() -> String {
    r#"//*[@rel="next"]"#.to_string()
}

fn default_prev_selector() -> String {
    r#"[rel="prev"],[rel="previous"]"#.to_string()
}

fn default_prev_xpath() -> String {
    r#"//*[@rel="prev"]|//*[@rel="previous"]"#.to_string()
}

fn default_attribute() -> Vec<String> {
    vec!["href".to_string()]
}

fn default_next_keywords() -> Vec<String> {
    [
        "pnnext", "nextpage", "next-page", "next_page", "next>", "next»", "next→", "next",
        "moreresults", "olderposts", "olderpost", "older", "forward", "下一页", "次のページ",
        "次", "&gt;", ">", "›", "→", "»",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_prev_keywords() -> Vec<String> {
    [
        "pnprev", "previouspage", "prevpage", "prev-page", "prev_page", "<prev", "«prev",
        "←prev", "prev", "previous", "newerposts", "newerpost", "newer", "上一页", "前のページ",
        "前", "&lt;", "<", "‹", "←", "«",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_times() -> u32 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            leading_zeros_pad_by_detection: true,
            shuffle_limit: default_shuffle_limit(),
            base: BaseSetting::default(),
            base_case: BaseCase::default(),
            base_date_format: default_date_format(),
            base_custom: default_base_custom(),
            selection_strategy: SelectionStrategy::default(),
            error_skip: 0,
            error_codes: default_error_codes(),
            error_codes_custom: Vec::new(),
            next_type: RuleKind::default(),
            next_selector: default_next_selector(),
            next_xpath: default_next_xpath(),
            next_attribute: default_attribute(),
            prev_type: RuleKind::default(),
            prev_selector: default_prev_selector(),
            prev_xpath: default_prev_xpath(),
            prev_attribute: default_attribute(),
            next_prev_keywords_enabled: true,
            next_keywords: default_next_keywords(),
            prev_keywords: default_prev_keywords(),
            next_prev_same_domain_policy: true,
            decode_uri_enabled: false,
            auto_action: Direction::default(),
            auto_times: default_times(),
            toolkit_tool: ToolkitTool::default(),
            toolkit_action: Direction::default(),
            toolkit_quantity: default_times(),
        }
    }
}

impl Settings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects out-of-range values.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.interval == 0 {
            return Err(SettingsError::invalid("interval", "must be positive"));
        }
        if let BaseSetting::Radix(radix) = self.base {
            if !(2..=36).contains(&radix) {
                return Err(SettingsError::invalid(
                    "base",
                    format!("radix {radix} is outside 2..=36"),
                ));
            }
        }
        if !(1..=MAX_SHUFFLE_LIMIT).contains(&self.shuffle_limit) {
            return Err(SettingsError::invalid(
                "shuffle_limit",
                format!("must be between 1 and {MAX_SHUFFLE_LIMIT}"),
            ));
        }
        for (field, value) in [
            ("auto_times", self.auto_times),
            ("toolkit_quantity", self.toolkit_quantity),
        ] {
            if !(1..=MAX_SEQUENCE_TIMES).contains(&value) {
                return Err(SettingsError::invalid(
                    field,
                    format!("must be between 1 and {MAX_SEQUENCE_TIMES}"),
                ));
            }
        }
        if self.base == BaseSetting::Named(NamedBase::Date) && self.base_date_format.is_empty() {
            return Err(SettingsError::invalid("base_date_format", "must not be empty"));
        }
        if self.base == BaseSetting::Named(NamedBase::Custom) && self.base_custom.chars().count() < 2
        {
            return Err(SettingsError::invalid(
                "base_custom",
                "needs at least two characters",
            ));
        }
        Ok(())
    }

    /// Sets the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the base.
    #[must_use]
    pub fn with_base(mut self, base: BaseSetting) -> Self {
        self.base = base;
        self
    }

    /// Sets the selection strategy.
    #[must_use]
    pub fn with_selection_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selection_strategy = strategy;
        self
    }

    /// Sets the error-skip budget.
    #[must_use]
    pub fn with_error_skip(mut self, error_skip: u32) -> Self {
        self.error_skip = error_skip;
        self
    }

    /// Resolves the configured base.
    #[must_use]
    pub fn resolved_base(&self) -> Base {
        match self.base {
            BaseSetting::Radix(radix) => Base::Numeric(radix),
            BaseSetting::Named(NamedBase::Date) => Base::Date(self.base_date_format.clone()),
            BaseSetting::Named(NamedBase::Roman) => Base::Roman,
            BaseSetting::Named(NamedBase::Custom) => Base::Custom(self.base_custom.clone()),
        }
    }

    /// Transform parameters for a freshly located selection.
    ///
    /// Leading zeros are enabled when detection is on and the selection
    /// starts with `0` and is longer than one character.
    #[must_use]
    pub fn transform_params(&self, selection: &str) -> TransformParams {
        let leading_zeros = self.leading_zeros_pad_by_detection
            && selection.starts_with('0')
            && selection.chars().count() > 1;
        TransformParams::new(self.interval)
            .with_base(self.resolved_base())
            .with_case(self.base_case)
            .with_leading_zeros(leading_zeros)
    }

    /// The configured error code set.
    #[must_use]
    pub fn error_code_set(&self) -> ErrorCodeSet {
        ErrorCodeSet::new(self.error_codes.iter().copied())
            .with_custom(self.error_codes_custom.iter().copied())
    }

    /// Keywords for a link direction.
    #[must_use]
    pub fn keywords(&self, direction: LinkDirection) -> &[String] {
        match direction {
            LinkDirection::Next => &self.next_keywords,
            LinkDirection::Prev => &self.prev_keywords,
        }
    }

    /// The configured rule for a link direction.
    #[must_use]
    pub fn link_rule(&self, direction: LinkDirection) -> LinkRule {
        let (kind, selector, xpath, attribute) = match direction {
            LinkDirection::Next => (
                self.next_type,
                &self.next_selector,
                &self.next_xpath,
                &self.next_attribute,
            ),
            LinkDirection::Prev => (
                self.prev_type,
                &self.prev_selector,
                &self.prev_xpath,
                &self.prev_attribute,
            ),
        };
        let query = match kind {
            RuleKind::Selector => selector.clone(),
            RuleKind::XPath => xpath.clone(),
        };
        LinkRule::new(kind, query).with_attribute_path(attribute.clone())
    }

    /// A complete link query for a direction.
    #[must_use]
    pub fn link_query(&self, direction: LinkDirection) -> LinkQuery {
        LinkQuery::new(direction)
            .with_rule(self.link_rule(direction))
            .with_keywords(self.next_prev_keywords_enabled, self.keywords(direction).to_vec())
            .with_same_domain_only(self.next_prev_same_domain_policy)
            .with_decode_uri(self.decode_uri_enabled)
    }
}
