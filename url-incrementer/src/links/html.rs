//! [`Document`] over static HTML, backed by `scraper`.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::document::{Document, LinkElement, LINK_ELEMENT_SELECTOR};
use crate::errors::LinkError;

/// A parsed HTML page and the URL it was loaded from.
pub struct HtmlDocument {
    url: String,
    html: Html,
}

impl std::fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDocument").field("url", &self.url).finish_non_exhaustive()
    }
}

impl HtmlDocument {
    /// Parses a full HTML document.
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            html: Html::parse_document(html),
        }
    }

    /// Every element matching a CSS selector list, in document order.
    pub fn select_all(&self, selector: &str) -> Result<Vec<LinkElement>, LinkError> {
        let parsed = parse_selector(selector)?;
        Ok(self.html.select(&parsed).map(|el| snapshot(&el)).collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, LinkError> {
    Selector::parse(selector).map_err(|e| LinkError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn snapshot(element: &ElementRef<'_>) -> LinkElement {
    let value = element.value();
    LinkElement {
        name: value.name().to_ascii_lowercase(),
        attributes: value
            .attrs()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
            .collect(),
        text: element.text().collect(),
        inner_html: element.inner_html(),
    }
}

impl Document for HtmlDocument {
    fn url(&self) -> &str {
        &self.url
    }

    fn query_selector(&self, selector: &str) -> Result<Option<LinkElement>, LinkError> {
        let parsed = parse_selector(selector)?;
        Ok(self.html.select(&parsed).next().map(|el| snapshot(&el)))
    }

    fn link_elements(&self) -> Vec<LinkElement> {
        self.select_all(LINK_ELEMENT_SELECTOR).unwrap_or_else(|error| {
            warn!(%error, "Link element selector rejected");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><head><link rel="next" href="/page/3"></head>
        <body>
          <div class="nav"><a href="/page/1" class="prev">Older <b>posts</b></a></div>
          <form action="/search?p=3"><button formaction="/go">Go</button></form>
          <span>plain</span>
        </body></html>"#;

    #[test]
    fn test_link_elements_in_document_order() {
        let document = HtmlDocument::parse("http://x.com/page/2", PAGE);
        let names: Vec<String> = document.link_elements().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["link", "a", "form", "button"]);
    }

    #[test]
    fn test_snapshot_content() {
        let document = HtmlDocument::parse("http://x.com/page/2", PAGE);
        let anchor = document.query_selector("div.nav a").unwrap().unwrap();

        assert_eq!(anchor.attribute("href"), Some("/page/1"));
        assert_eq!(anchor.text, "Older posts");
        assert_eq!(anchor.inner_html, "Older <b>posts</b>");
    }

    #[test]
    fn test_xpath_subset() {
        let document = HtmlDocument::parse("http://x.com/page/2", PAGE);
        let element = document.evaluate_xpath(r#"//*[@rel="next"]"#).unwrap().unwrap();
        assert_eq!(element.name, "link");

        let element = document
            .evaluate_xpath(r#"//div[@class="nav"]/a"#)
            .unwrap()
            .unwrap();
        assert_eq!(element.attribute("class"), Some("prev"));
    }

    #[test]
    fn test_invalid_selector() {
        let document = HtmlDocument::parse("http://x.com/", PAGE);
        assert!(matches!(
            document.query_selector("a[[["),
            Err(LinkError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_select_all_reports_bad_selector() {
        let document = HtmlDocument::parse("http://x.com/", PAGE);
        let anchors = document.select_all("a[href], link").unwrap();
        assert_eq!(anchors.len(), 2);
        assert!(matches!(
            document.select_all("a[[["),
            Err(LinkError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_no_match() {
        let document = HtmlDocument::parse("http://x.com/", PAGE);
        assert_eq!(document.query_selector("table").unwrap(), None);
    }
}
