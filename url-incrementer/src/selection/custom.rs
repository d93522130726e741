//! User-supplied selection patterns.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::SelectionResult;
use crate::errors::SelectionError;

/// A regular expression locating the selection.
///
/// `flags` uses the JavaScript letters: `i`, `m`, `s` and `x` change matching;
/// `g`, `u`, `y` and `d` are accepted and have no effect.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomSelection {
    /// The pattern.
    pub pattern: String,
    /// Pattern flags.
    #[serde(default)]
    pub flags: String,
    /// Capture group holding the selection; 0 is the whole match.
    #[serde(default)]
    pub group: usize,
    /// Characters to skip at the start of the group.
    #[serde(default)]
    pub offset: usize,
}

impl CustomSelection {
    /// Creates a selection over the given capture group.
    #[must_use]
    pub fn new(pattern: impl Into<String>, group: usize) -> Self {
        Self {
            pattern: pattern.into(),
            group,
            ..Default::default()
        }
    }

    /// Sets the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Sets the character offset into the group.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Compiles the pattern with its flags.
    pub fn compile(&self) -> Result<Regex, SelectionError> {
        let mut builder = RegexBuilder::new(&self.pattern);
        for flag in self.flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                'g' | 'u' | 'y' | 'd' => {}
                other => {
                    return Err(SelectionError::InvalidPattern(format!(
                        "unsupported flag '{other}'"
                    )))
                }
            }
        }
        builder
            .build()
            .map_err(|e| SelectionError::InvalidPattern(e.to_string()))
    }

    /// Locates the selection in `url`, reporting why it could not.
    pub fn validate(&self, url: &str) -> Result<SelectionResult, SelectionError> {
        if self.pattern.is_empty() {
            return Err(SelectionError::NoMatch);
        }
        let regex = self.compile()?;
        let captures = regex.captures(url).ok_or(SelectionError::NoMatch)?;
        let group = captures
            .get(self.group)
            .filter(|m| !m.as_str().is_empty())
            .ok_or(SelectionError::GroupNotMatched(self.group))?;

        let text = group.as_str();
        let skip = text
            .char_indices()
            .nth(self.offset)
            .map(|(idx, _)| idx)
            .ok_or_else(|| SelectionError::OffsetOutOfRange {
                offset: self.offset,
                group: text.to_string(),
            })?;

        Ok(SelectionResult::new(&text[skip..], group.start() + skip))
    }
}
