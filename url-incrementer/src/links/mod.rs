//! Next and previous link inference.
//!
//! [`find_link`] looks for the link a page offers for moving one page
//! forward or back. A configured selector or XPath rule is tried first and
//! wins outright. Failing that, every link-like element is scored against an
//! ordered keyword list; see the `inference` module for the bucket order.
//!
//! Not finding a link is a normal outcome and yields `None`.

mod decode;
mod document;
#[cfg(feature = "html")]
mod html;
mod inference;
mod xpath;

pub use decode::decode_uri_component;
pub use document::{Document, LinkElement, LINK_ELEMENT_SELECTOR};
#[cfg(feature = "html")]
pub use html::HtmlDocument;
pub use xpath::to_css as xpath_to_css;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use url::Url;

use inference::{valid_url, Buckets};

/// Which way a link leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// The following page.
    Next,
    /// The preceding page.
    Prev,
}

impl fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Next => "next",
            Self::Prev => "prev",
        })
    }
}

/// How a rule's query is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleKind {
    /// A CSS selector list.
    #[default]
    #[serde(rename = "selector")]
    Selector,
    /// An XPath expression.
    #[serde(rename = "xpath")]
    XPath,
}

/// An explicit rule locating the link element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRule {
    /// Query language.
    pub kind: RuleKind,
    /// The selector or expression.
    pub query: String,
    /// Attribute to read the URL from. Only the first name is read;
    /// the remainder is kept for display.
    pub attribute_path: Vec<String>,
}

impl LinkRule {
    /// Creates a rule that reads `href`.
    #[must_use]
    pub fn new(kind: RuleKind, query: impl Into<String>) -> Self {
        Self {
            kind,
            query: query.into(),
            attribute_path: vec!["href".to_string()],
        }
    }

    /// Replaces the attribute path.
    #[must_use]
    pub fn with_attribute_path(mut self, attribute_path: Vec<String>) -> Self {
        self.attribute_path = attribute_path;
        self
    }

    /// The rule as shown in match diagnostics: query, then the dotted path.
    pub fn describe(&self) -> String {
        let mut out = self.query.clone();
        for attribute in &self.attribute_path {
            out.push('.');
            out.push_str(attribute);
        }
        out
    }
}

/// Everything [`find_link`] needs besides the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkQuery {
    /// Link direction.
    pub direction: LinkDirection,
    /// Explicit rule, tried first.
    pub rule: Option<LinkRule>,
    /// Fall back to keyword inference.
    pub keywords_enabled: bool,
    /// Keywords in priority order.
    pub keywords: Vec<String>,
    /// Reject links to other hostnames.
    pub same_domain_only: bool,
    /// Percent-decode candidate URLs.
    pub decode_uri: bool,
}

impl LinkQuery {
    /// A query with no rule or keywords, restricted to the page's host.
    #[must_use]
    pub fn new(direction: LinkDirection) -> Self {
        Self {
            direction,
            rule: None,
            keywords_enabled: true,
            keywords: Vec::new(),
            same_domain_only: true,
            decode_uri: false,
        }
    }

    /// Sets the explicit rule.
    #[must_use]
    pub fn with_rule(mut self, rule: LinkRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Sets keyword inference and its keywords.
    #[must_use]
    pub fn with_keywords(mut self, enabled: bool, keywords: Vec<String>) -> Self {
        self.keywords_enabled = enabled;
        self.keywords = keywords;
        self
    }

    /// Sets the same-hostname restriction.
    #[must_use]
    pub fn with_same_domain_only(mut self, same_domain_only: bool) -> Self {
        self.same_domain_only = same_domain_only;
        self
    }

    /// Sets percent-decoding.
    #[must_use]
    pub fn with_decode_uri(mut self, decode_uri: bool) -> Self {
        self.decode_uri = decode_uri;
        self
    }
}

/// Which normalized text a keyword matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// An attribute value.
    Attribute,
    /// Visible text.
    Text,
    /// Inner markup.
    Markup,
}

/// How a keyword matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSubtype {
    /// Exact match on a `rel` attribute.
    Rel,
    /// Exact match.
    Equals,
    /// Prefix match.
    StartsWith,
    /// Substring match.
    Includes,
}

/// How a link was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MatchMethod {
    /// The explicit rule matched.
    Rule {
        /// Query language of the rule.
        kind: RuleKind,
    },
    /// Keyword inference matched.
    Keyword {
        /// Where the keyword was found.
        source: TextSource,
        /// How it matched.
        subtype: MatchSubtype,
        /// The keyword.
        keyword: String,
    },
}

/// A found link and how it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMatch {
    /// Absolute URL of the link.
    pub url: String,
    /// Match method.
    #[serde(flatten)]
    pub method: MatchMethod,
    /// The rule, for rule matches.
    pub rule: Option<String>,
    /// Tag name of the matched element.
    pub element: String,
    /// Attribute the match came from, if any.
    pub attribute: Option<String>,
}

fn find_by_rule(document: &dyn Document, base: &Url, rule: &LinkRule, query: &LinkQuery) -> Option<LinkMatch> {
    if rule.query.trim().is_empty() {
        return None;
    }
    let found = match rule.kind {
        RuleKind::Selector => document.query_selector(&rule.query),
        RuleKind::XPath => document.evaluate_xpath(&rule.query),
    };
    let element = match found {
        Ok(Some(element)) => element,
        Ok(None) => return None,
        Err(error) => {
            debug!(%error, rule = %rule.query, "Link rule could not be evaluated");
            return None;
        }
    };

    let configured = rule.attribute_path.first().and_then(|name| {
        element
            .attribute(name)
            .filter(|value| !value.trim().is_empty())
            .map(|value| (name.as_str(), value))
    });
    let (attribute, raw) = configured.or_else(|| element.natural_link())?;
    let url = valid_url(base, raw, query.same_domain_only, query.decode_uri)?;

    debug!(direction = %query.direction, rule = %rule.query, %url, "Link found by rule");
    Some(LinkMatch {
        url,
        method: MatchMethod::Rule { kind: rule.kind },
        rule: Some(rule.describe()),
        element: element.name.clone(),
        attribute: Some(attribute.to_string()),
    })
}

/// Finds the page's next or previous link.
pub fn find_link(document: &dyn Document, query: &LinkQuery) -> Option<LinkMatch> {
    let base = match Url::parse(document.url()) {
        Ok(base) => base,
        Err(error) => {
            debug!(url = %document.url(), %error, "Document URL does not parse");
            return None;
        }
    };

    if let Some(found) = query
        .rule
        .as_ref()
        .and_then(|rule| find_by_rule(document, &base, rule, query))
    {
        return Some(found);
    }
    if !query.keywords_enabled {
        return None;
    }

    let mut buckets = Buckets::default();
    for element in document.link_elements() {
        let Some(raw) = element.natural_url() else {
            continue;
        };
        if let Some(url) = valid_url(&base, raw, query.same_domain_only, query.decode_uri) {
            buckets.record_element(&element, &url, &query.keywords);
        }
    }
    debug!(direction = %query.direction, hits = buckets.len(), "Collected keyword hits");
    buckets.resolve(&query.keywords)
}
