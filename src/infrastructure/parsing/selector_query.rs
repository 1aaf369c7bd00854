//! Read-only selector queries over a parsed page
//!
//! Selection has a closed failure taxonomy ([`SelectorError`]): nothing
//! matched, more than one element matched, or the single match is not the
//! kind of element the caller expects. Text and markup extraction add the
//! cleaning pass and a guard against raw markup leaking into plain text.

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use super::validation::{fail, sequence_non_empty, Validation, ValidationErrors};
use crate::domain::NonEmptyVec;
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Character some blog engines leave behind in copied text
const ZERO_WIDTH_SPACE: char = '\u{200B}';

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid `WHITESPACE_RUN`"));

static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br>").expect("invalid `LINE_BREAK_TAG`"));

/// Kinds of element a selection can be asserted against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Any element in the HTML namespace
    Element,
    Anchor,
    Image,
    Paragraph,
    Heading,
}

impl ElementKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Element => "HTMLElement",
            Self::Anchor => "HTMLAnchorElement",
            Self::Image => "HTMLImageElement",
            Self::Paragraph => "HTMLParagraphElement",
            Self::Heading => "HTMLHeadingElement",
        }
    }

    fn matches(self, element: &scraper::node::Element) -> bool {
        if &*element.name.ns != HTML_NAMESPACE {
            return false;
        }
        let tag = element.name();
        match self {
            Self::Element => true,
            Self::Anchor => tag == "a",
            Self::Image => tag == "img",
            Self::Paragraph => tag == "p",
            Self::Heading => matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6"),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Selection failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("No element matches selector: {selector}")]
    NotFound { selector: String },

    #[error("More than one element matches selector: {selector} ({count} matches)")]
    Ambiguous { selector: String, count: usize },

    #[error("Element doesn't have expected type: {expected} (got <{actual_tag} />)")]
    WrongType {
        expected: ElementKind,
        actual_tag: String,
    },
}

/// What an extracted string was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    TextContent,
    InnerMarkup,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextContent => f.write_str("text content"),
            Self::InnerMarkup => f.write_str("inner markup"),
        }
    }
}

/// Extraction failures on top of selection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("No {attribute} attribute for element: {selector}")]
    MissingAttribute { attribute: String, selector: String },

    #[error("{reading} looks like an HTML tag and this might be a problem: {value}")]
    LooksLikeHtmlTag { reading: TextSource, value: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupOptions {
    /// Replace every `<br>` with a newline after cleaning
    pub break_to_newline: bool,
}

/// A compiled CSS selector that remembers its source text for messages
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    selector: Selector,
}

impl Query {
    pub fn parse(source: &str) -> ParsingResult<Self> {
        let selector =
            Selector::parse(source).map_err(|e| ParsingError::invalid_selector(source, e))?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One parsed page. Loading never fails; malformed markup is repaired by the
/// HTML parser and problems only surface through selection.
pub struct DocumentHandle {
    html: Html,
}

impl DocumentHandle {
    /// Parse with scripting disabled so `<noscript>` content becomes elements
    pub fn load(html: &str) -> Self {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        Self {
            html: parse_document(Html::new_document(), opts).one(html),
        }
    }

    /// Exactly one element matching `query`, optionally of the `expected` kind
    pub fn select_one(
        &self,
        query: &Query,
        expected: Option<ElementKind>,
    ) -> Result<Element<'_>, SelectorError> {
        let mut matches = self.html.select(&query.selector);
        let first = matches.next().ok_or_else(|| SelectorError::NotFound {
            selector: query.to_string(),
        })?;

        let others = matches.count();
        if others > 0 {
            return Err(SelectorError::Ambiguous {
                selector: query.to_string(),
                count: others + 1,
            });
        }

        let element = Element(first);
        match expected {
            Some(kind) => element.ensure_kind(kind),
            None => Ok(element),
        }
    }

    /// Every element matching `query`, at least one.
    ///
    /// With an `expected` kind each element is checked on its own and every
    /// mismatch is reported, not only the first.
    pub fn select_all_non_empty(
        &self,
        query: &Query,
        expected: Option<ElementKind>,
    ) -> Validation<NonEmptyVec<Element<'_>>> {
        let elements: Vec<Element<'_>> = self.html.select(&query.selector).map(Element).collect();
        let Some(elements) = NonEmptyVec::from_vec(elements) else {
            return fail(format!("No element matches selector: {query}"));
        };
        let Some(kind) = expected else {
            return Ok(elements);
        };

        sequence_non_empty(elements.map_indexed(|index, element| {
            if element.is(kind) {
                Ok(element)
            } else {
                Err(ValidationErrors::single(format!(
                    "element {index} matching `{query}`: expected `{kind}`, got `<{}>`",
                    element.tag()
                )))
            }
        }))
    }

    /// Cleaned text content of the single element matching `query`
    pub fn extract_text(&self, query: &Query, kind: ElementKind) -> Result<String, ExtractError> {
        self.select_one(query, Some(kind))?.text_content()
    }

    /// Cleaned inner markup of the single element matching `query`
    pub fn extract_markup(
        &self,
        query: &Query,
        kind: ElementKind,
        options: MarkupOptions,
    ) -> Result<String, ExtractError> {
        self.select_one(query, Some(kind))?.inner_markup(options)
    }
}

/// A node of a [`DocumentHandle`]
#[derive(Debug, Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// Lower-case local tag name
    pub fn tag(&self) -> &str {
        self.0.value().name()
    }

    pub fn is(&self, kind: ElementKind) -> bool {
        kind.matches(self.0.value())
    }

    pub fn ensure_kind(self, kind: ElementKind) -> Result<Self, SelectorError> {
        if self.is(kind) {
            Ok(self)
        } else {
            Err(SelectorError::WrongType {
                expected: kind,
                actual_tag: self.tag().to_string(),
            })
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.0.value().attr(name)
    }

    /// Attribute value, failing with a message naming `query` when absent
    pub fn require_attr(&self, name: &str, query: &Query) -> Result<&str, ExtractError> {
        self.attr(name).ok_or_else(|| ExtractError::MissingAttribute {
            attribute: name.to_string(),
            selector: query.to_string(),
        })
    }

    pub fn text_content(&self) -> Result<String, ExtractError> {
        let raw: String = self.0.text().collect();
        guarded(TextSource::TextContent, clean_text(&raw))
    }

    pub fn inner_markup(&self, options: MarkupOptions) -> Result<String, ExtractError> {
        let markup = guarded(TextSource::InnerMarkup, clean_text(&self.0.inner_html()))?;
        if options.break_to_newline {
            Ok(LINE_BREAK_TAG.replace_all(&markup, "\n").into_owned())
        } else {
            Ok(markup)
        }
    }
}

fn guarded(reading: TextSource, value: String) -> Result<String, ExtractError> {
    if looks_like_html_tag(&value) {
        Err(ExtractError::LooksLikeHtmlTag { reading, value })
    } else {
        Ok(value)
    }
}

/// Narrow heuristic for a self-closing tag that ended up in plain text
pub fn looks_like_html_tag(value: &str) -> bool {
    value.starts_with('<') && value.ends_with("/>")
}

/// Canonical cleaning pass: drop zero-width spaces, NFC-normalize, collapse
/// whitespace runs to a single space and trim. Idempotent.
pub fn clean_text(raw: &str) -> String {
    let normalized: String = raw
        .chars()
        .filter(|c| *c != ZERO_WIDTH_SPACE)
        .nfc()
        .collect();
    WHITESPACE_RUN.replace_all(&normalized, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn query(source: &str) -> Query {
        Query::parse(source).unwrap()
    }

    #[test]
    fn test_select_one_outcomes() {
        let doc = DocumentHandle::load(
            r#"<div class="a"><p class="one">x</p><p class="two">y</p><p class="two">z</p></div>"#,
        );

        assert!(matches!(
            doc.select_one(&query("p.missing"), None),
            Err(SelectorError::NotFound { .. })
        ));
        assert!(doc.select_one(&query("p.one"), Some(ElementKind::Paragraph)).is_ok());
        assert!(matches!(
            doc.select_one(&query("p.two"), None),
            Err(SelectorError::Ambiguous { count: 2, .. })
        ));
        assert_eq!(
            doc.select_one(&query("div.a"), Some(ElementKind::Paragraph)).unwrap_err(),
            SelectorError::WrongType {
                expected: ElementKind::Paragraph,
                actual_tag: "div".to_string(),
            }
        );
    }

    #[test]
    fn test_not_found_message_names_selector() {
        let doc = DocumentHandle::load("<p>x</p>");
        let error = doc.select_one(&query("h1.title"), None).unwrap_err();
        assert_eq!(error.to_string(), "No element matches selector: h1.title");
    }

    #[test]
    fn test_foreign_elements_are_not_html_elements() {
        let doc = DocumentHandle::load(r#"<div><svg><circle class="dot"></circle></svg></div>"#);
        let error = doc
            .select_one(&query("circle.dot"), Some(ElementKind::Element))
            .unwrap_err();
        assert!(matches!(error, SelectorError::WrongType { .. }));
    }

    #[test]
    fn test_select_all_non_empty_reports_every_wrong_element() {
        let doc = DocumentHandle::load(
            r#"<div><p class="x">a</p><span class="x">b</span><p class="x">c</p><em class="x">d</em></div>"#,
        );

        let errors = doc
            .select_all_non_empty(&query(".x"), Some(ElementKind::Paragraph))
            .unwrap_err();
        assert_eq!(
            errors.messages(),
            [
                "element 1 matching `.x`: expected `HTMLParagraphElement`, got `<span>`",
                "element 3 matching `.x`: expected `HTMLParagraphElement`, got `<em>`",
            ]
        );

        let all = doc.select_all_non_empty(&query(".x"), None).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_select_all_non_empty_with_no_match() {
        let doc = DocumentHandle::load("<div></div>");
        let errors = doc.select_all_non_empty(&query("p"), None).unwrap_err();
        assert_eq!(errors.messages(), ["No element matches selector: p"]);
    }

    #[test]
    fn test_extract_text_cleans_content() {
        let doc = DocumentHandle::load(
            "<h1 class=\"t\">\n  Le   mythe\u{200B} de la <em>moitie\u{301}</em>  \n</h1>",
        );
        let text = doc.extract_text(&query("h1.t"), ElementKind::Heading).unwrap();
        assert_eq!(text, "Le mythe de la moitié");
    }

    #[test]
    fn test_extract_text_rejects_leaked_tag() {
        let doc = DocumentHandle::load(r#"<p class="d">&lt;img src="x.png" /&gt;</p>"#);
        let error = doc.extract_text(&query("p.d"), ElementKind::Element).unwrap_err();
        assert!(matches!(
            error,
            ExtractError::LooksLikeHtmlTag {
                reading: TextSource::TextContent,
                ..
            }
        ));
    }

    #[test]
    fn test_extract_markup_breaks_to_newline() {
        let doc = DocumentHandle::load(r#"<p class="c"><br>line1<BR>line2</p>"#);
        let with_breaks = doc
            .extract_markup(
                &query("p.c"),
                ElementKind::Paragraph,
                MarkupOptions {
                    break_to_newline: true,
                },
            )
            .unwrap();
        assert_eq!(with_breaks, "\nline1\nline2");

        let raw = doc
            .extract_markup(&query("p.c"), ElementKind::Paragraph, MarkupOptions::default())
            .unwrap();
        assert_eq!(raw, "<br>line1<br>line2");
    }

    #[test]
    fn test_noscript_content_is_selectable() {
        let doc = DocumentHandle::load(
            r#"<div class="c"><noscript><img src="a.png"></noscript></div>"#,
        );
        let img = doc
            .select_one(&query("div.c noscript > img"), Some(ElementKind::Image))
            .unwrap();
        assert_eq!(img.attr("src"), Some("a.png"));
    }

    #[test]
    fn test_require_attr() {
        let doc = DocumentHandle::load(r#"<img class="i" src="a.png">"#);
        let q = query("img.i");
        let img = doc.select_one(&q, Some(ElementKind::Image)).unwrap();
        assert_eq!(img.require_attr("src", &q).unwrap(), "a.png");
        assert_eq!(
            img.require_attr("srcset", &q).unwrap_err().to_string(),
            "No srcset attribute for element: img.i"
        );
    }

    #[test]
    fn test_invalid_selector_is_a_configuration_error() {
        assert!(matches!(
            Query::parse("div >"),
            Err(ParsingError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_looks_like_html_tag() {
        assert!(looks_like_html_tag("<br/>"));
        assert!(looks_like_html_tag("<img src=\"a\" />"));
        assert!(!looks_like_html_tag("<b>bold</b>"));
        assert!(!looks_like_html_tag("a < b />"));
    }

    proptest! {
        #[test]
        fn clean_text_is_idempotent(raw in any::<String>()) {
            let once = clean_text(&raw);
            prop_assert_eq!(clean_text(&once), once);
        }

        #[test]
        fn clean_text_is_idempotent_on_spacing(raw in "[ a\t\n\u{200B}\u{2000}\u{301}e]{0,40}") {
            let once = clean_text(&raw);
            prop_assert_eq!(clean_text(&once), once);
        }
    }
}
