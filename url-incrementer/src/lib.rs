//! # URL Incrementer
//!
//! The core of a URL incrementing browser tool, as a library.
//!
//! Given a URL, the crate:
//!
//! - **Locates a selection**: the numeric (or custom-pattern) part of the URL to step
//! - **Transforms it**: numeric bases 2-36, dates, roman numerals and custom alphabets
//! - **Rewrites the URL**: single selections or up to three independent parts,
//!   optionally skipping pages that answer with error statuses
//! - **Precomputes sequences**: shuffled, custom-list, toolkit and auto-mode URL lists
//! - **Infers next/prev links**: rule-based, then keyword-based, over a page's links
//!
//! ## Quick Start
//!
//! ```rust
//! use url_incrementer::prelude::*;
//!
//! let settings = Settings::default();
//! let mut instance = Instance::new("http://example.com/page=9", &settings);
//!
//! let mutation = navigate::perform(Action::increment(), &mut instance).unwrap();
//! assert_eq!(mutation.url, "http://example.com/page=10");
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod events;
pub mod instance;
pub mod links;
pub mod mutator;
pub mod navigate;
pub mod observability;
pub mod selection;
pub mod sequence;
pub mod testing;
pub mod transform;


/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BaseSetting, NamedBase, Settings};
    pub use crate::errors::{
        IncrementerError, LinkError, MutationError, ProbeError, SelectionError, SettingsError,
        TransformError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::instance::{Action, Instance, MultiPart, ToolkitTool, UrlEntry};
    pub use crate::links::{
        find_link, Document, LinkDirection, LinkElement, LinkMatch, LinkQuery, LinkRule, RuleKind,
    };
    #[cfg(feature = "html")]
    pub use crate::links::HtmlDocument;
    #[cfg(feature = "http-probe")]
    pub use crate::mutator::{ProbeConfig, ReqwestProbe};
    pub use crate::mutator::{
        apply_with_error_skip, ErrorCode, ErrorCodeSet, ErrorSkipReport, HeadProbe, Mutation,
        SkipOutcome, UrlMutator,
    };
    pub use crate::navigate;
    pub use crate::selection::{find_selection, CustomSelection, SelectionResult, SelectionStrategy};
    pub use crate::sequence::{precompute, Precomputed};
    pub use crate::transform::{transform, Base, BaseCase, Direction, TransformParams};
}
