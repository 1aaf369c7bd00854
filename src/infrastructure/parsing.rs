//! HTML parsing infrastructure
//!
//! Selector queries over a loaded page, accumulating validation, the `srcset`
//! grammar and the page parsers built on top of them.

pub mod blog_page_parser;
pub mod config;
pub mod context;
pub mod post_parser;
pub mod selector_query;
pub mod srcset;
pub mod validation;

// Re-export public types
pub use blog_page_parser::BlogPageParser;
pub use config::{ParsingConfig, PostSelectors};
pub use context::{ListingParseContext, PostParseContext};
pub use post_parser::PostParser;
pub use selector_query::{DocumentHandle, ElementKind, Query, SelectorError};
pub use srcset::{SrcSetCandidate, SrcSetError, SrcSetMode};
pub use validation::{CombineIndependent, Validation, ValidationErrors};

/// Parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse a loaded page with contextual information, reporting every
    /// failing field rather than the first one
    fn parse_with_context(
        &self,
        document: &DocumentHandle,
        context: &Self::Context,
    ) -> Validation<Self::Output>;
}
