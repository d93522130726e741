//! Fixtures for instances and documents.

use std::collections::HashMap;

use crate::errors::LinkError;
use crate::instance::Instance;
use crate::links::{Document, LinkElement};
use crate::transform::TransformParams;

/// An instance at `http://x.com/{n}` selecting `n` in decimal, interval 1.
#[must_use]
pub fn numbered_instance(n: u64) -> Instance {
    let url = format!("http://x.com/{n}");
    Instance::with_selection(url, n.to_string(), 13, TransformParams::new(1))
}

/// A hand-built document.
///
/// Selector queries are answered by exact lookup of the selector text, so
/// tests register the elements a rule should find with
/// [`with_element`](Self::with_element).
#[derive(Debug, Clone, Default)]
pub struct StaticDocument {
    url: String,
    links: Vec<LinkElement>,
    selectors: HashMap<String, LinkElement>,
}

impl StaticDocument {
    /// Creates an empty document at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Appends a link-like element.
    #[must_use]
    pub fn with_link(mut self, element: LinkElement) -> Self {
        self.links.push(element);
        self
    }

    /// Registers the element returned for `selector`.
    #[must_use]
    pub fn with_element(mut self, selector: impl Into<String>, element: LinkElement) -> Self {
        self.selectors.insert(selector.into(), element);
        self
    }
}

impl Document for StaticDocument {
    fn url(&self) -> &str {
        &self.url
    }

    fn query_selector(&self, selector: &str) -> Result<Option<LinkElement>, LinkError> {
        Ok(self.selectors.get(selector).cloned())
    }

    fn link_elements(&self) -> Vec<LinkElement> {
        self.links.clone()
    }
}
