//! Parsing configuration for post extraction
//!
//! Centralized CSS selectors and srcset handling. The defaults describe the
//! markup of the blog the scraper was written for.

use serde::{Deserialize, Serialize};

use super::srcset::SrcSetMode;
use crate::infrastructure::config::defaults;

/// Main parsing configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// How `srcset` attributes of post images are parsed
    pub srcset_mode: SrcSetMode,

    /// Selectors for post and listing pages
    pub selectors: PostSelectors,
}

/// CSS selectors for post and listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostSelectors {
    /// Publication date, a single `<p>`
    pub date: String,

    /// Title, a single heading
    pub title: String,

    /// Body paragraphs, at least one `<p>`
    pub paragraphs: String,

    /// Post images, at least one `<img>`
    pub images: String,

    /// Post links on a listing page, at least one `<a>`
    pub post_links: String,
}

impl Default for PostSelectors {
    fn default() -> Self {
        Self {
            date: defaults::DATE_SELECTOR.to_string(),
            title: defaults::TITLE_SELECTOR.to_string(),
            paragraphs: defaults::PARAGRAPHS_SELECTOR.to_string(),
            images: defaults::IMAGES_SELECTOR.to_string(),
            post_links: defaults::POST_LINKS_SELECTOR.to_string(),
        }
    }
}
