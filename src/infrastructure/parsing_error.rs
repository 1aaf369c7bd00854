//! Top-level parsing error types
//!
//! Field-level problems are collected as data in [`ValidationErrors`]; the
//! variants here are the fatal conditions handed to the caller once every
//! field has been attempted, plus configuration problems detected up front.

use thiserror::Error;

use super::parsing::validation::ValidationErrors;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("{0}")]
    ValidationFailed(ValidationErrors),

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Cannot derive a post id from URL: {url}")]
    InvalidPostUrl { url: String },

    #[error("Invalid base URL: {url} - {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ParsingError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Accumulated messages, when this is a validation failure
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::ValidationFailed(errors) => Some(errors.messages()),
            _ => None,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
