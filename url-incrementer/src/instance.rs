//! The per-context incrementing state.
//!
//! An [`Instance`] is created once per navigation context (for example one
//! browser tab) and mutated by each action. It is a plain value: callers own
//! it and pass it by `&mut` to [`UrlMutator::apply`](crate::mutator::UrlMutator::apply),
//! [`navigate::perform`](crate::navigate::perform) and [`sequence::step`](crate::sequence::step).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Settings;
use crate::mutator::ErrorCodeSet;
use crate::selection::{find_selection, SelectionResult};
use crate::transform::{Direction, TransformParams};

/// Highest multi-part index.
pub const MAX_MULTI_PARTS: u8 = 3;

/// A user action.
///
/// `part` addresses one multi-part selection; `None` means the whole URL
/// (every active part when multi mode is on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Step forward.
    Increment {
        /// Multi part, 1-3.
        #[serde(default)]
        part: Option<u8>,
    },
    /// Step backward.
    Decrement {
        /// Multi part, 1-3.
        #[serde(default)]
        part: Option<u8>,
    },
}

impl Action {
    /// Increment with no part.
    #[must_use]
    pub const fn increment() -> Self {
        Self::Increment { part: None }
    }

    /// Decrement with no part.
    #[must_use]
    pub const fn decrement() -> Self {
        Self::Decrement { part: None }
    }

    /// Creates an action from a direction and optional part.
    #[must_use]
    pub const fn new(direction: Direction, part: Option<u8>) -> Self {
        match direction {
            Direction::Increment => Self::Increment { part },
            Direction::Decrement => Self::Decrement { part },
        }
    }

    /// The step direction.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Increment { .. } => Direction::Increment,
            Self::Decrement { .. } => Direction::Decrement,
        }
    }

    /// The addressed multi part.
    #[must_use]
    pub const fn part(self) -> Option<u8> {
        match self {
            Self::Increment { part } | Self::Decrement { part } => part,
        }
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        Self::new(direction, None)
    }
}

/// One independently stepped region of a multi-part URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPart {
    /// The region's current text.
    pub selection: String,
    /// Byte offset of the region in the URL.
    pub selection_start: usize,
    /// How the region is stepped.
    pub params: TransformParams,
}

impl MultiPart {
    /// Creates a part.
    #[must_use]
    pub fn new(selection: impl Into<String>, selection_start: usize, params: TransformParams) -> Self {
        Self {
            selection: selection.into(),
            selection_start,
            params,
        }
    }
}

/// A precomputed URL and the selection it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    /// The URL.
    #[serde(rename = "urlmod")]
    pub url: String,
    /// The selection inside it; empty for literal list entries.
    #[serde(rename = "selectionmod")]
    pub selection: String,
}

impl UrlEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(url: impl Into<String>, selection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selection: selection.into(),
        }
    }

    /// Wraps a literal URL.
    #[must_use]
    pub fn literal(url: impl Into<String>) -> Self {
        Self::new(url, String::new())
    }
}

/// Toolkit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolkitTool {
    /// Produce a list of links, starting with the current URL.
    GenerateLinks,
    /// Visit generated URLs.
    #[default]
    Crawl,
}

/// Incrementing state for one navigation context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Instance {
    /// Current URL.
    pub url: String,
    /// Substring of `url` being stepped.
    pub selection: String,
    /// Byte offset of `selection` in `url`.
    pub selection_start: Option<usize>,
    /// How `selection` is stepped.
    pub params: TransformParams,

    /// Step the `multi` parts instead of `selection`.
    pub multi_enabled: bool,
    /// Number of active parts, 0-3.
    pub multi_count: u8,
    /// Parts keyed 1-3.
    pub multi: BTreeMap<u8, MultiPart>,

    /// Precomputed URLs.
    pub urls: Vec<UrlEntry>,
    /// Position in `urls`; `None` is before the first entry.
    pub urls_current_index: Option<usize>,

    /// Browse a shuffled list around the current URL.
    pub shuffle_urls: bool,
    /// Size of the shuffled list.
    pub shuffle_limit: usize,
    /// Browse `custom_url_list`.
    pub custom_urls: bool,
    /// Literal URLs for custom list mode.
    pub custom_url_list: Vec<String>,

    /// Toolkit generation is active.
    pub toolkit_enabled: bool,
    /// Toolkit operation.
    pub toolkit_tool: ToolkitTool,
    /// Direction of toolkit generation.
    pub toolkit_action: Direction,
    /// Number of toolkit URLs.
    pub toolkit_quantity: u32,

    /// Auto mode is active.
    pub auto_enabled: bool,
    /// Direction auto mode moves in.
    pub auto_action: Direction,
    /// Number of auto steps.
    pub auto_times: u32,
    /// Completed auto repeats.
    pub auto_repeat_count: u32,

    /// Error responses to skip past per action.
    pub error_skip: u32,
    /// Responses that count as errors.
    pub error_codes: ErrorCodeSet,
}

impl Instance {
    /// Builds an instance for `url` from settings.
    pub fn new(url: impl Into<String>, settings: &Settings) -> Self {
        let url = url.into();
        let SelectionResult {
            selection,
            selection_start,
        } = find_selection(&url, &settings.selection_strategy);
        let params = settings.transform_params(&selection);

        tracing::debug!(url = %url, selection = %selection, ?selection_start, "Created instance");

        Self {
            url,
            selection,
            selection_start,
            params,
            shuffle_limit: settings.shuffle_limit,
            toolkit_tool: settings.toolkit_tool,
            toolkit_action: settings.toolkit_action,
            toolkit_quantity: settings.toolkit_quantity,
            auto_action: settings.auto_action,
            auto_times: settings.auto_times,
            error_skip: settings.error_skip,
            error_codes: settings.error_code_set(),
            ..Default::default()
        }
    }

    /// Builds an instance with an explicit selection.
    #[must_use]
    pub fn with_selection(
        url: impl Into<String>,
        selection: impl Into<String>,
        selection_start: usize,
        params: TransformParams,
    ) -> Self {
        Self {
            url: url.into(),
            selection: selection.into(),
            selection_start: Some(selection_start),
            params,
            shuffle_limit: 100,
            ..Default::default()
        }
    }

    /// Whether `selection` sits at `selection_start` in `url`.
    #[must_use]
    pub fn selection_is_valid(&self) -> bool {
        self.selection_start.is_some_and(|start| {
            !self.selection.is_empty()
                && self
                    .url
                    .get(start..start + self.selection.len())
                    .is_some_and(|found| found == self.selection)
        })
    }

    /// Adds a multi part, enabling multi mode. Returns the new part index,
    /// or `None` when all parts are in use.
    pub fn add_multi_part(&mut self, part: MultiPart) -> Option<u8> {
        if self.multi_count >= MAX_MULTI_PARTS {
            return None;
        }
        self.multi_count += 1;
        self.multi.insert(self.multi_count, part);
        self.multi_enabled = true;
        Some(self.multi_count)
    }

    /// Whether a precomputed list drives navigation.
    #[must_use]
    pub fn uses_url_list(&self) -> bool {
        (self.custom_urls || self.shuffle_urls) && !self.urls.is_empty()
    }
}
