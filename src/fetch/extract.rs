//! Turning a raw response body into a [`Document`].
//!
//! Extraction is pluggable through [`DocumentExtractor`] so the fetch, rate
//! and retry logic never depends on a particular site layout. The default
//! [`SelectorExtractor`] uses CSS selectors.

use scraper::{Html, Selector};
use thiserror::Error;

use super::outcome::Document;

/// Title used when the page carries no title metadata.
pub const TITLE_NOT_FOUND: &str = "Title not found";

/// Default selector for the title metadata element.
pub const DEFAULT_TITLE_SELECTOR: &str = "meta[property='og:title']";

/// Default selector for the heading element.
pub const DEFAULT_HEADING_SELECTOR: &str = "div.caas-subheadline h2";

/// Default selector for body paragraphs.
pub const DEFAULT_PARAGRAPH_SELECTOR: &str = "div.caas-body p";

/// Errors raised while building an extractor or parsing a body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// A configured CSS selector does not parse.
    #[error("invalid CSS selector `{selector}`: {message}")]
    InvalidSelector {
        /// The selector source text.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// The body is not valid UTF-8.
    #[error("response body is not valid UTF-8")]
    InvalidEncoding,
}

/// Parses raw response bodies into documents.
pub trait DocumentExtractor: Send + Sync {
    /// Parses one response body.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] when the body cannot be interpreted.
    fn parse(&self, raw_body: &[u8]) -> Result<Document, ExtractError>;
}

/// CSS selectors used by [`SelectorExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    /// Element whose `content` attribute holds the title.
    pub title: String,
    /// Element(s) whose text is the heading.
    pub heading: String,
    /// Paragraph elements making up the body.
    pub paragraphs: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_SELECTOR.to_string(),
            heading: DEFAULT_HEADING_SELECTOR.to_string(),
            paragraphs: DEFAULT_PARAGRAPH_SELECTOR.to_string(),
        }
    }
}

/// Extractor driven by compiled CSS selectors.
#[derive(Debug)]
pub struct SelectorExtractor {
    title: Selector,
    heading: Selector,
    paragraphs: Selector,
}

impl SelectorExtractor {
    /// Compiles the given selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSelector`] for the first selector that fails to parse.
    pub fn new(selectors: &SelectorSet) -> Result<Self, ExtractError> {
        Ok(Self {
            title: compile(&selectors.title)?,
            heading: compile(&selectors.heading)?,
            paragraphs: compile(&selectors.paragraphs)?,
        })
    }

    /// Extractor with the default article selectors.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in selectors; the `Result` mirrors [`Self::new`].
    pub fn with_defaults() -> Result<Self, ExtractError> {
        Self::new(&SelectorSet::default())
    }
}

impl DocumentExtractor for SelectorExtractor {
    fn parse(&self, raw_body: &[u8]) -> Result<Document, ExtractError> {
        let html = std::str::from_utf8(raw_body).map_err(|_| ExtractError::InvalidEncoding)?;
        let page = Html::parse_document(html);

        let title = page
            .select(&self.title)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map_or_else(|| TITLE_NOT_FOUND.to_string(), str::to_string);

        let heading: String = page
            .select(&self.heading)
            .flat_map(|node| node.text())
            .collect();

        let body_text = page
            .select(&self.paragraphs)
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Document {
            title,
            heading,
            body_text,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|err| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
    <html><head>
        <meta property="og:title" content="Sony and Yamaha build a cart">
        <title>ignored</title>
    </head>
    <body>
        <div class="caas-subheadline"><h2>It's smarter and longer-lasting.</h2></div>
        <div class="caas-body">
            <p>First paragraph.</p>
            <p>Second <b>bold</b> paragraph.</p>
        </div>
        <p>Outside the body container.</p>
    </body></html>
    "#;

    #[test]
    fn test_parse_extracts_all_fields() {
        let extractor = SelectorExtractor::with_defaults().unwrap();
        let doc = extractor.parse(ARTICLE.as_bytes()).unwrap();
        assert_eq!(doc.title, "Sony and Yamaha build a cart");
        assert_eq!(doc.heading, "It's smarter and longer-lasting.");
        assert_eq!(doc.body_text, "First paragraph.\nSecond bold paragraph.");
    }

    #[test]
    fn test_missing_title_uses_fallback() {
        let extractor = SelectorExtractor::with_defaults().unwrap();
        let doc = extractor
            .parse(b"<html><body><div class=\"caas-body\"><p>x</p></div></body></html>")
            .unwrap();
        assert_eq!(doc.title, TITLE_NOT_FOUND);
        assert_eq!(doc.heading, "");
        assert_eq!(doc.body_text, "x");
    }

    #[test]
    fn test_no_paragraphs_gives_empty_body() {
        let extractor = SelectorExtractor::with_defaults().unwrap();
        let doc = extractor.parse(b"<html><body>plain</body></html>").unwrap();
        assert_eq!(doc.body_text, "");
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let extractor = SelectorExtractor::with_defaults().unwrap();
        let err = extractor.parse(&[0x3c, 0xff, 0xfe, 0x3e]).unwrap_err();
        assert_eq!(err, ExtractError::InvalidEncoding);
    }

    #[test]
    fn test_custom_selectors() {
        let selectors = SelectorSet {
            title: "meta[name='title']".to_string(),
            heading: "h1".to_string(),
            paragraphs: "article p".to_string(),
        };
        let extractor = SelectorExtractor::new(&selectors).unwrap();
        let doc = extractor
            .parse(
                br#"<meta name="title" content="T"><h1>H</h1><article><p>a</p><p>b</p></article>"#,
            )
            .unwrap();
        assert_eq!(doc.title, "T");
        assert_eq!(doc.heading, "H");
        assert_eq!(doc.body_text, "a\nb");
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let selectors = SelectorSet {
            heading: "div[".to_string(),
            ..SelectorSet::default()
        };
        let err = SelectorExtractor::new(&selectors).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSelector { ref selector, .. } if selector == "div["));
    }
}
