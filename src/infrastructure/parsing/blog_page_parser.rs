//! Listing page parser
//!
//! Discovers post links on the blog's listing pages. Links are resolved
//! against the site's base URL; a page without any post link is a failure.

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::config::ParsingConfig;
use super::context::ListingParseContext;
use super::selector_query::{DocumentHandle, Element, ElementKind, ExtractError, Query};
use super::validation::{named, sequence, sequence_non_empty, Validation};
use super::ContextualParser;
use crate::infrastructure::parsing_error::ParsingResult;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Cannot resolve link {href}: {reason}")]
    Unresolvable { href: String, reason: String },
}

/// Parser for listing pages
#[derive(Debug, Clone)]
pub struct BlogPageParser {
    post_links_selector: Query,
}

impl BlogPageParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            post_links_selector: Query::parse(&config.selectors.post_links)?,
        })
    }

    /// Absolute post links of a single listing page, in document order
    pub fn post_links(&self, html: &str, base_url: &Url) -> Validation<Vec<String>> {
        let context = ListingParseContext {
            page_number: 1,
            base_url: base_url.clone(),
        };
        self.parse_with_context(&DocumentHandle::load(html), &context)
    }

    /// Post links of several listing pages, flattened in page order.
    ///
    /// Every page is parsed; errors are prefixed with `page {n}: ` (1-based).
    pub fn post_links_from_pages(&self, pages: &[String], base_url: &Url) -> Validation<Vec<String>> {
        let context = ListingParseContext {
            page_number: 1,
            base_url: base_url.clone(),
        };

        let per_page = pages.iter().enumerate().map(|(index, html)| {
            let page_number = index + 1;
            self.parse_with_context(&DocumentHandle::load(html), &context.with_page(page_number))
                .map_err(|errors| errors.prefixed(&format!("page {page_number}: ")))
        });

        let links: Vec<String> = sequence(per_page)?.into_iter().flatten().collect();
        debug!("Discovered {} post link(s) on {} page(s)", links.len(), pages.len());
        Ok(links)
    }
}

impl ContextualParser for BlogPageParser {
    type Output = Vec<String>;
    type Context = ListingParseContext;

    fn parse_with_context(
        &self,
        document: &DocumentHandle,
        context: &Self::Context,
    ) -> Validation<Self::Output> {
        let anchors = document
            .select_all_non_empty(&self.post_links_selector, Some(ElementKind::Anchor))
            .map_err(|errors| errors.named("posts"))?;

        let result = sequence_non_empty(anchors.map_indexed(|index, anchor| {
            named(
                &format!("posts[{index}]"),
                resolve_link(&anchor, &self.post_links_selector, &context.base_url),
            )
        }))
        .map(|links| links.into_vec());

        if let Err(errors) = &result {
            warn!(
                "Listing page {} has {} invalid post link(s)",
                context.page_number,
                errors.len()
            );
        }
        result
    }
}

fn resolve_link(anchor: &Element<'_>, query: &Query, base_url: &Url) -> Result<String, LinkError> {
    let href = anchor.require_attr("href", query)?;
    base_url
        .join(href)
        .map(String::from)
        .map_err(|e| LinkError::Unresolvable {
            href: href.to_string(),
            reason: e.to_string(),
        })
}
