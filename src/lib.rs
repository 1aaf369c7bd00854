//! Maoureu scraper - blog post extraction and validation
//!
//! Turns the markup of a blog post page into a fully validated [`Post`], or
//! into a report listing everything that is wrong with the page.

// Module declarations
pub mod domain;
pub mod infrastructure;

pub use domain::{NonEmptyVec, Post, PostId, PostImage};
pub use infrastructure::parsing::{BlogPageParser, PostParser, SrcSetMode, Validation};
pub use infrastructure::parsing_error::{ParsingError, ParsingResult};
