//! Error types for the URL incrementer.
//!
//! Each component owns a narrow error enum. Pure functions return these
//! errors; component boundaries convert them into empty results, sentinels,
//! or untouched instances so that no error corrupts an [`Instance`].
//!
//! [`Instance`]: crate::instance::Instance

use std::collections::HashMap;
use thiserror::Error;

/// The umbrella error type for incrementer operations.
#[derive(Debug, Error)]
pub enum IncrementerError {
    /// A value transformation failed.
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// A custom selection could not be validated.
    #[error("{0}")]
    Selection(#[from] SelectionError),

    /// A URL mutation could not be applied.
    #[error("{0}")]
    Mutation(#[from] MutationError),

    /// A network existence check failed.
    #[error("{0}")]
    Probe(#[from] ProbeError),

    /// Settings were invalid or could not be loaded.
    #[error("{0}")]
    Settings(#[from] SettingsError),

    /// A link rule could not be evaluated.
    #[error("{0}")]
    Link(#[from] LinkError),
}

/// Errors raised while transforming a selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The selection is empty.
    #[error("Cannot transform an empty selection")]
    EmptySelection,

    /// The selection is not a number in the requested base.
    #[error("Selection '{selection}' is not a valid base {radix} number")]
    InvalidNumber {
        /// The offending selection.
        selection: String,
        /// The radix it was parsed in.
        radix: u32,
    },

    /// The numeric base is outside 2..=36.
    #[error("Unsupported numeric base: {0}")]
    UnsupportedRadix(u32),

    /// The date format could not be tokenized or aligned with the selection.
    #[error("Invalid date format '{format}': {reason}")]
    DateFormat {
        /// The date format.
        format: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The selection does not hold a valid date for the format.
    #[error("Invalid date value '{selection}': {reason}")]
    DateValue {
        /// The offending selection.
        selection: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The selection is not a canonical roman numeral.
    #[error("Selection '{0}' is not a valid roman numeral")]
    InvalidRoman(String),

    /// The custom alphabet cannot form a numeral system.
    #[error("Invalid custom alphabet: {0}")]
    InvalidAlphabet(String),
}

impl TransformError {
    /// Creates a date format error.
    #[must_use]
    pub fn date_format(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DateFormat {
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// Creates a date value error.
    #[must_use]
    pub fn date_value(selection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DateValue {
            selection: selection.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised when validating a custom selection pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The pattern failed to compile.
    #[error("Invalid selection pattern: {0}")]
    InvalidPattern(String),

    /// The pattern is empty or did not match the URL.
    #[error("Selection pattern did not match the URL")]
    NoMatch,

    /// The requested capture group did not participate in the match.
    #[error("Capture group {0} did not match")]
    GroupNotMatched(usize),

    /// The offset leaves nothing of the group.
    #[error("Offset {offset} is outside the matched group '{group}'")]
    OffsetOutOfRange {
        /// The character offset.
        offset: usize,
        /// The matched group text.
        group: String,
    },
}

/// Errors raised while mutating an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// No selection is available to mutate.
    #[error("Instance has no selection to mutate")]
    NoSelection,

    /// The recorded selection no longer addresses the URL.
    #[error("Selection '{selection}' is not at offset {start} of the URL")]
    SelectionMismatch {
        /// The recorded selection.
        selection: String,
        /// The recorded offset.
        start: usize,
    },

    /// A multi-part action referenced a part that is not configured.
    #[error("Multi part {0} is not configured")]
    UnknownPart(u8),

    /// There is no precomputed URL to step to.
    #[error("No precomputed URLs to step through")]
    EmptyUrlList,

    /// The transformation of the selection failed.
    #[error("{0}")]
    Transform(#[from] TransformError),
}

/// Errors raised by a network existence check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The request could not be completed.
    #[error("Transport error for {url}: {reason}")]
    Transport {
        /// The URL that was checked.
        url: String,
        /// The transport failure.
        reason: String,
    },

    /// The request timed out.
    #[error("Timed out checking {0}")]
    Timeout(String),

    /// The probe client could not be configured.
    #[error("Invalid probe configuration: {0}")]
    InvalidConfig(String),
}

impl ProbeError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        match self {
            Self::Transport { url, reason } => {
                map.insert("type".to_string(), serde_json::json!("Transport"));
                map.insert("url".to_string(), serde_json::json!(url));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
            Self::Timeout(url) => {
                map.insert("type".to_string(), serde_json::json!("Timeout"));
                map.insert("url".to_string(), serde_json::json!(url));
            }
            Self::InvalidConfig(_) => {
                map.insert("type".to_string(), serde_json::json!("InvalidConfig"));
            }
        }
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Errors raised while evaluating a next/prev link rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The CSS selector did not parse.
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector text.
        selector: String,
        /// Parser message.
        reason: String,
    },

    /// The XPath expression is outside the supported subset.
    #[error("Unsupported XPath '{expression}' at byte {position}")]
    UnsupportedXPath {
        /// The expression text.
        expression: String,
        /// Where translation stopped.
        position: usize,
    },
}

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings document could not be parsed.
    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A setting holds an out-of-range value.
    #[error("Invalid setting '{field}': {reason}")]
    Invalid {
        /// The setting name.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl SettingsError {
    /// Creates an invalid-setting error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
