//! Parsing context for post and listing pages
//!
//! Carries what a parser needs to know about a page besides its markup.

use url::Url;

use crate::domain::PostId;
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

/// Context for a single post page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostParseContext {
    /// Identifier computed upstream from the post URL
    pub id: PostId,

    /// Canonical link of the post
    pub link: String,
}

impl PostParseContext {
    pub fn new(id: PostId, link: impl Into<String>) -> Self {
        Self {
            id,
            link: link.into(),
        }
    }

    /// Derive the id from the link itself
    pub fn from_link(link: &str) -> ParsingResult<Self> {
        let id = PostId::from_url(link).ok_or_else(|| ParsingError::InvalidPostUrl {
            url: link.to_string(),
        })?;
        Ok(Self::new(id, link))
    }
}

/// Context for a listing page
#[derive(Debug, Clone)]
pub struct ListingParseContext {
    /// 1-based position of the page in the listing
    pub page_number: usize,

    /// Base URL for resolving relative links
    pub base_url: Url,
}

impl ListingParseContext {
    pub fn new(page_number: usize, base_url: &str) -> ParsingResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ParsingError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            page_number,
            base_url,
        })
    }

    /// Same base URL, another page
    pub fn with_page(&self, page_number: usize) -> Self {
        Self {
            page_number,
            base_url: self.base_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_link_derives_id() {
        let context = PostParseContext::from_link("https://maour.eu/2021/09/01/post/").unwrap();
        assert_eq!(context.id.as_str(), "2021_09_01_post");
        assert_eq!(context.link, "https://maour.eu/2021/09/01/post/");
    }

    #[test]
    fn test_from_link_rejects_relative_link() {
        assert!(matches!(
            PostParseContext::from_link("/2021/09/01/post/"),
            Err(ParsingError::InvalidPostUrl { .. })
        ));
    }

    #[test]
    fn test_listing_context_requires_absolute_base() {
        assert!(ListingParseContext::new(1, "maour.eu").is_err());
        let context = ListingParseContext::new(1, "https://maour.eu/").unwrap();
        assert_eq!(context.with_page(3).page_number, 3);
    }
}
