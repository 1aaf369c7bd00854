//! Post page parser
//!
//! Builds one validated [`Post`] from the markup of a post page. The date,
//! title, paragraphs and images are extracted independently and combined
//! without short-circuiting, so a broken page yields a single report naming
//! every failing field and, for paragraphs and images, every failing element.

use thiserror::Error;
use tracing::{debug, warn};

use super::config::ParsingConfig;
use super::context::PostParseContext;
use super::selector_query::{DocumentHandle, Element, ElementKind, ExtractError, MarkupOptions, Query};
use super::srcset::{self, SrcSetCandidate, SrcSetError, SrcSetMode};
use super::validation::{named, pure, sequence_non_empty, CombineIndependent, Validation};
use super::ContextualParser;
use crate::domain::{NonEmptyVec, Post, PostId, PostImage};
use crate::infrastructure::parsing_error::ParsingResult;

/// Failures resolving the URL of one post image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("{source} (srcset: \"{value}\")")]
    InvalidSrcSet {
        value: String,
        #[source]
        source: SrcSetError,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("No file name in image URL: {url}")]
    NoFileName { url: String },
}

/// Parser for post pages
#[derive(Debug, Clone)]
pub struct PostParser {
    date_selector: Query,
    title_selector: Query,
    paragraph_selector: Query,
    image_selector: Query,
    srcset_mode: SrcSetMode,
}

impl PostParser {
    /// Create a parser with the default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    /// Create a parser with custom selectors
    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        let selectors = &config.selectors;
        Ok(Self {
            date_selector: Query::parse(&selectors.date)?,
            title_selector: Query::parse(&selectors.title)?,
            paragraph_selector: Query::parse(&selectors.paragraphs)?,
            image_selector: Query::parse(&selectors.images)?,
            srcset_mode: config.srcset_mode,
        })
    }

    /// Load `html` and extract the post it describes
    pub fn from_page(&self, html: &str, id: PostId, link: &str) -> Validation<Post> {
        let document = DocumentHandle::load(html);
        self.parse_with_context(&document, &PostParseContext::new(id, link))
    }

    /// Date and title accept any HTML element; the selector pins the tag
    fn parse_date(&self, document: &DocumentHandle) -> Validation<String> {
        named(
            "date",
            document.extract_text(&self.date_selector, ElementKind::Element),
        )
    }

    fn parse_title(&self, document: &DocumentHandle) -> Validation<String> {
        named(
            "title",
            document.extract_text(&self.title_selector, ElementKind::Element),
        )
    }

    fn parse_paragraphs(&self, document: &DocumentHandle) -> Validation<NonEmptyVec<String>> {
        let elements = document
            .select_all_non_empty(&self.paragraph_selector, Some(ElementKind::Paragraph))
            .map_err(|errors| errors.named("paragraphs"))?;

        let options = MarkupOptions {
            break_to_newline: true,
        };
        sequence_non_empty(elements.map_indexed(|index, paragraph| {
            named(&format!("paragraphs[{index}]"), paragraph.inner_markup(options))
        }))
    }

    fn parse_images(&self, document: &DocumentHandle) -> Validation<NonEmptyVec<PostImage>> {
        let elements = document
            .select_all_non_empty(&self.image_selector, Some(ElementKind::Image))
            .map_err(|errors| errors.named("images"))?;

        sequence_non_empty(elements.map_indexed(|index, image| {
            let resolved = resolve_image_url(&image, &self.image_selector, self.srcset_mode)
                .and_then(|url| match PostImage::from_url(url.clone()) {
                    Some(image) => Ok(image),
                    None => Err(ImageError::NoFileName { url }),
                });
            named(&format!("images[{index}]"), resolved)
        }))
    }
}

impl ContextualParser for PostParser {
    type Output = Post;
    type Context = PostParseContext;

    fn parse_with_context(
        &self,
        document: &DocumentHandle,
        context: &Self::Context,
    ) -> Validation<Self::Output> {
        debug!("Parsing post {} from: {}", context.id, context.link);

        let result = (
            pure(context.id.clone()),
            pure(context.link.clone()),
            self.parse_date(document),
            self.parse_title(document),
            self.parse_paragraphs(document),
            self.parse_images(document),
        )
            .combine()
            .map(|(id, link, date, title, paragraphs, images)| Post {
                id,
                link,
                date,
                title,
                paragraphs,
                images,
            });

        match &result {
            Ok(post) => debug!(
                "Extracted post {}: {} paragraph(s), {} image(s)",
                post.id,
                post.paragraphs.len(),
                post.images.len()
            ),
            Err(errors) => warn!(
                "Post {} failed validation with {} error(s)",
                context.id,
                errors.len()
            ),
        }

        result
    }
}

/// URL of the best rendition of an image element.
///
/// The widest `srcset` candidate wins (a candidate without width counts as
/// zero, ties go to the earliest); without any candidate the plain `src`
/// attribute is used.
pub fn resolve_image_url(
    image: &Element<'_>,
    query: &Query,
    mode: SrcSetMode,
) -> Result<String, ImageError> {
    let value = image.attr("srcset").unwrap_or_default();
    let candidates = srcset::parse(value, mode).map_err(|source| ImageError::InvalidSrcSet {
        value: value.to_string(),
        source,
    })?;

    match widest_candidate(&candidates) {
        Some(candidate) => Ok(candidate.url.clone()),
        None => Ok(image.require_attr("src", query)?.to_string()),
    }
}

/// First candidate with the largest width, if any
pub fn widest_candidate(candidates: &[SrcSetCandidate]) -> Option<&SrcSetCandidate> {
    candidates.iter().reduce(|best, candidate| {
        if candidate.width.unwrap_or(0) > best.width.unwrap_or(0) {
            candidate
        } else {
            best
        }
    })
}
