//! Infrastructure layer for parsing, configuration and logging
//!
//! HTML parsing, configuration persistence and the logging setup used by the
//! command-line driver.

pub mod config; // Configuration file and defaults
pub mod logging; // Logging infrastructure
pub mod parsing; // Selector queries, validation and page parsers
pub mod parsing_error; // Top-level parsing errors

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, LoggingConfig};
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::{BlogPageParser, ParsingConfig, PostParser};
pub use parsing_error::{ParsingError, ParsingResult};
