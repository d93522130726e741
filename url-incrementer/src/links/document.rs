//! The document seen by link inference.

use serde::{Deserialize, Serialize};

use super::xpath;
use crate::errors::LinkError;

/// Elements that can carry a navigable URL.
pub const LINK_ELEMENT_SELECTOR: &str =
    "link[href], a[href], area[href], form[action], button[formaction]";

/// A snapshot of one element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkElement {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes in document order; names lowercase.
    pub attributes: Vec<(String, String)>,
    /// Visible text.
    pub text: String,
    /// Inner markup.
    pub inner_html: String,
}

impl LinkElement {
    /// Creates an element with no attributes or content.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Sets the visible text, and the inner markup when none was set.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        if self.inner_html.is_empty() {
            self.inner_html.clone_from(&self.text);
        }
        self
    }

    /// Sets the inner markup.
    #[must_use]
    pub fn with_inner_html(mut self, inner_html: impl Into<String>) -> Self {
        self.inner_html = inner_html.into();
        self
    }

    /// Looks up an attribute by name, ignoring case.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The URL the element navigates to: `href`, then a form's `action`,
    /// then a button's `formaction`.
    pub fn natural_url(&self) -> Option<&str> {
        self.natural_link().map(|(_, url)| url)
    }

    /// Like [`natural_url`](Self::natural_url), also naming the attribute
    /// the URL came from.
    pub fn natural_link(&self) -> Option<(&'static str, &str)> {
        let fallbacks: [(&'static str, Option<&str>); 3] =
            [("href", None), ("action", Some("form")), ("formaction", Some("button"))];
        fallbacks.into_iter().find_map(|(attribute, tag)| {
            if tag.is_some_and(|tag| tag != self.name) {
                return None;
            }
            self.attribute(attribute)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (attribute, value))
        })
    }
}

/// Read access to a parsed page.
pub trait Document {
    /// The page's own URL.
    fn url(&self) -> &str;

    /// The first element matching a CSS selector list, in document order.
    fn query_selector(&self, selector: &str) -> Result<Option<LinkElement>, LinkError>;

    /// The first element matching an XPath expression.
    ///
    /// The default translates the supported subset to CSS.
    fn evaluate_xpath(&self, expression: &str) -> Result<Option<LinkElement>, LinkError> {
        let selector = xpath::to_css(expression)?;
        self.query_selector(&selector)
    }

    /// Every element matching [`LINK_ELEMENT_SELECTOR`], in document order.
    fn link_elements(&self) -> Vec<LinkElement>;
}
