//! Translation of a small XPath subset into CSS selectors.
//!
//! Supported: `/` and `//` location steps, element names and `*`, the
//! predicates `[@a]`, `[@a="v"]`, `[contains(@a,"v")]` and
//! `[starts-with(@a,"v")]`, and `|` unions. Anything else is rejected.

use crate::errors::LinkError;

/// Translates `expression` into an equivalent CSS selector list.
pub fn to_css(expression: &str) -> Result<String, LinkError> {
    let mut translator = Translator {
        src: expression,
        pos: 0,
    };
    let mut paths = vec![translator.path()?];
    translator.skip_ws();
    while translator.eat("|") {
        paths.push(translator.path()?);
        translator.skip_ws();
    }
    if translator.pos != expression.len() {
        return Err(translator.error());
    }
    Ok(paths.join(", "))
}

struct Translator<'a> {
    src: &'a str,
    pos: usize,
}

impl Translator<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn error(&self) -> LinkError {
        LinkError::UnsupportedXPath {
            expression: self.src.to_string(),
            position: self.pos,
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), LinkError> {
        self.skip_ws();
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn name(&mut self) -> Result<&str, LinkError> {
        let start = self.pos;
        let rest = self.rest();
        if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(self.error());
        }
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        self.pos += len;
        Ok(&self.src[start..self.pos])
    }

    fn literal(&mut self) -> Result<String, LinkError> {
        self.skip_ws();
        let quote = match self.rest().chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error()),
        };
        self.pos += 1;
        let len = self.rest().find(quote).ok_or_else(|| self.error())?;
        let value = self.src[self.pos..self.pos + len]
            .replace('\\', "\\\\")
            .replace('"', "\\\"");
        self.pos += len + 1;
        Ok(value)
    }

    fn path(&mut self) -> Result<String, LinkError> {
        self.skip_ws();
        let mut css = String::new();
        let mut first = true;
        loop {
            let descendant = if self.eat("//") {
                true
            } else if self.eat("/") {
                false
            } else {
                break;
            };
            if !first {
                css.push_str(if descendant { " " } else { " > " });
            }
            css.push_str(&self.step(first && !descendant)?);
            first = false;
        }
        if first {
            return Err(self.error());
        }
        Ok(css)
    }

    fn step(&mut self, root: bool) -> Result<String, LinkError> {
        let mut css = if self.eat("*") {
            "*".to_string()
        } else {
            self.name()?.to_ascii_lowercase()
        };
        if root {
            css.push_str(":root");
        }
        while self.eat("[") {
            css.push_str(&self.predicate()?);
        }
        Ok(css)
    }

    fn predicate(&mut self) -> Result<String, LinkError> {
        self.skip_ws();
        let css = if self.eat("@") {
            let attribute = self.name()?.to_string();
            self.skip_ws();
            if self.eat("=") {
                format!("[{attribute}=\"{}\"]", self.literal()?)
            } else {
                format!("[{attribute}]")
            }
        } else {
            let operator = if self.eat("contains(") {
                "*="
            } else if self.eat("starts-with(") {
                "^="
            } else {
                return Err(self.error());
            };
            self.expect("@")?;
            let attribute = self.name()?.to_string();
            self.expect(",")?;
            let value = self.literal()?;
            self.expect(")")?;
            format!("[{attribute}{operator}\"{value}\"]")
        };
        self.expect("]")?;
        Ok(css)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_rules() {
        assert_eq!(to_css(r#"//*[@rel="next"]"#).unwrap(), r#"*[rel="next"]"#);
        assert_eq!(
            to_css(r#"//*[@rel="prev"]|//*[@rel="previous"]"#).unwrap(),
            r#"*[rel="prev"], *[rel="previous"]"#
        );
    }

    #[test]
    fn test_steps_and_functions() {
        assert_eq!(
            to_css(r#"//div[@class='nav']/a[contains(@href, "page")]"#).unwrap(),
            r#"div[class="nav"] > a[href*="page"]"#
        );
        assert_eq!(to_css("/html/body//a[@href]").unwrap(), "html:root > body a[href]");
        assert_eq!(
            to_css(r#"//A[starts-with(@id,"next")]"#).unwrap(),
            r#"a[id^="next"]"#
        );
    }

    #[test]
    fn test_unsupported() {
        for expression in ["//a[1]", "(//a)[1]", "a", "//a[text()='next']", "//a[@href", ""] {
            assert!(
                matches!(to_css(expression), Err(LinkError::UnsupportedXPath { .. })),
                "{expression} should be rejected"
            );
        }
    }
}
