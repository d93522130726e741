//! Keyword inference over a page's link elements.
//!
//! Each element with a usable URL is normalized three ways (attribute
//! values, visible text, inner markup) and compared against every keyword.
//! Hits are bucketed by source and match kind; the first element to land in
//! a bucket for a keyword keeps it. Resolution walks the buckets in a fixed
//! priority order, keywords outermost.

use std::collections::HashMap;
use tracing::{debug, trace};
use url::Url;

use super::{LinkElement, LinkMatch, MatchMethod, MatchSubtype, TextSource};

/// Bucket priority. Within a group keywords are tried first, then subtypes.
const RESOLUTION_ORDER: &[(TextSource, &[MatchSubtype])] = &[
    (TextSource::Attribute, &[MatchSubtype::Rel]),
    (TextSource::Attribute, &[MatchSubtype::Equals]),
    (TextSource::Text, &[MatchSubtype::Equals]),
    (TextSource::Markup, &[MatchSubtype::Equals]),
    (
        TextSource::Attribute,
        &[MatchSubtype::StartsWith, MatchSubtype::Includes],
    ),
    (TextSource::Text, &[MatchSubtype::StartsWith, MatchSubtype::Includes]),
    (TextSource::Markup, &[MatchSubtype::StartsWith, MatchSubtype::Includes]),
];

#[derive(Debug, Clone)]
struct Candidate {
    url: String,
    element: String,
    attribute: Option<String>,
}

/// Lowercases and removes all whitespace.
pub(super) fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Keyword hits keyed by source, subtype and keyword.
#[derive(Debug, Default)]
pub(super) struct Buckets {
    hits: HashMap<(TextSource, MatchSubtype, String), Candidate>,
}

impl Buckets {
    /// Records every keyword hit for `element`, reachable at `url`.
    pub(super) fn record_element(&mut self, element: &LinkElement, url: &str, keywords: &[String]) {
        let candidate = Candidate {
            url: url.to_string(),
            element: element.name.clone(),
            attribute: None,
        };
        self.record(TextSource::Text, &normalize(&element.text), &candidate, keywords);
        self.record(TextSource::Markup, &normalize(&element.inner_html), &candidate, keywords);
        for (name, value) in &element.attributes {
            let candidate = Candidate {
                attribute: Some(name.clone()),
                ..candidate.clone()
            };
            self.record(TextSource::Attribute, &normalize(value), &candidate, keywords);
        }
    }

    fn record(&mut self, source: TextSource, text: &str, candidate: &Candidate, keywords: &[String]) {
        let is_rel = source == TextSource::Attribute && candidate.attribute.as_deref() == Some("rel");
        for keyword in keywords.iter().filter(|k| !k.is_empty()) {
            let subtype = if text == keyword {
                if is_rel {
                    MatchSubtype::Rel
                } else {
                    MatchSubtype::Equals
                }
            } else if text.starts_with(keyword.as_str()) {
                MatchSubtype::StartsWith
            } else if text.contains(keyword.as_str()) {
                MatchSubtype::Includes
            } else {
                continue;
            };
            self.hits
                .entry((source, subtype, keyword.clone()))
                .or_insert_with(|| candidate.clone());
        }
    }

    /// Number of recorded hits.
    pub(super) fn len(&self) -> usize {
        self.hits.len()
    }

    /// The highest-priority hit.
    pub(super) fn resolve(&self, keywords: &[String]) -> Option<LinkMatch> {
        for (source, subtypes) in RESOLUTION_ORDER {
            for keyword in keywords {
                for subtype in *subtypes {
                    let key = (*source, *subtype, keyword.clone());
                    if let Some(candidate) = self.hits.get(&key) {
                        debug!(?source, ?subtype, %keyword, url = %candidate.url, "Inferred link");
                        return Some(LinkMatch {
                            url: candidate.url.clone(),
                            method: MatchMethod::Keyword {
                                source: *source,
                                subtype: *subtype,
                                keyword: keyword.clone(),
                            },
                            rule: None,
                            element: candidate.element.clone(),
                            attribute: candidate.attribute.clone(),
                        });
                    }
                }
            }
        }
        trace!(hits = self.hits.len(), "No keyword hit resolved");
        None
    }
}

/// Resolves `raw` against the page URL and checks it is a usable link.
///
/// The URL must parse, differ from the page URL and, when
/// `same_domain_only` is set, share its hostname. With `decode` set, escapes
/// are decoded first; a failed decode keeps the raw URL.
pub(super) fn valid_url(base: &Url, raw: &str, same_domain_only: bool, decode: bool) -> Option<String> {
    let resolved = base.join(raw.trim()).ok()?;
    let mut url = resolved.to_string();
    if decode {
        if let Some(decoded) = super::decode::decode_uri_component(&url) {
            url = decoded;
        }
    }
    let parsed = Url::parse(&url).ok()?;
    if parsed.as_str() == base.as_str() {
        return None;
    }
    if same_domain_only && parsed.host_str() != base.host_str() {
        return None;
    }
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" Next\n Page "), "nextpage");
        assert_eq!(normalize("NEXT »"), "next»");
    }

    #[test]
    fn test_first_writer_wins() {
        let words = keywords(&["next"]);
        let mut buckets = Buckets::default();
        buckets.record_element(&LinkElement::new("a").with_text("next"), "http://x.com/2", &words);
        buckets.record_element(&LinkElement::new("a").with_text("Next"), "http://x.com/3", &words);

        let found = buckets.resolve(&words).unwrap();
        assert_eq!(found.url, "http://x.com/2");
    }

    #[test]
    fn test_keyword_order_beats_subtype_within_group() {
        let words = keywords(&["nextpage", "next"]);
        let mut buckets = Buckets::default();
        buckets.record_element(&LinkElement::new("a").with_text("go next"), "http://x.com/a", &words);
        buckets.record_element(&LinkElement::new("a").with_text("nextpage!"), "http://x.com/b", &words);

        let found = buckets.resolve(&words).unwrap();
        assert_eq!(found.url, "http://x.com/b");
        assert!(matches!(
            found.method,
            MatchMethod::Keyword { subtype: MatchSubtype::StartsWith, .. }
        ));
    }

    #[test]
    fn test_rel_bucket() {
        let words = keywords(&["next"]);
        let mut buckets = Buckets::default();
        let link = LinkElement::new("link").with_attribute("rel", "Next");
        buckets.record_element(&link, "http://x.com/2", &words);

        let found = buckets.resolve(&words).unwrap();
        assert_eq!(found.attribute.as_deref(), Some("rel"));
        assert!(matches!(
            found.method,
            MatchMethod::Keyword { source: TextSource::Attribute, subtype: MatchSubtype::Rel, .. }
        ));
    }

    #[test]
    fn test_valid_url() {
        let base = Url::parse("http://x.com/page/2").unwrap();
        assert_eq!(
            valid_url(&base, "/page/3", true, false).as_deref(),
            Some("http://x.com/page/3")
        );
        assert_eq!(valid_url(&base, "", true, false), None);
        assert_eq!(valid_url(&base, "http://x.com/page/2", true, false), None);
        assert_eq!(valid_url(&base, "http://y.com/page/3", true, false), None);
        assert_eq!(
            valid_url(&base, "http://y.com/page/3", false, false).as_deref(),
            Some("http://y.com/page/3")
        );
    }

    #[test]
    fn test_valid_url_decodes() {
        let base = Url::parse("http://x.com/").unwrap();
        assert_eq!(
            valid_url(&base, "/a%20b", true, true).as_deref(),
            Some("http://x.com/a b")
        );
        assert_eq!(
            valid_url(&base, "/100%25", true, true).as_deref(),
            Some("http://x.com/100%")
        );
    }
}
