//! Extract posts and post links from saved pages
//!
//! ```text
//! extract_post [--config <file>] post <page.html> <post-url>
//! extract_post [--config <file>] links <base-url> <listing.html>...
//! ```
//!
//! `post` prints the post as JSON, `links` prints one absolute link per line.
//! A page that fails validation prints the full report and exits non-zero.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use url::Url;

use maoureu_scraper_lib::infrastructure::config::{AppConfig, ConfigManager};
use maoureu_scraper_lib::infrastructure::logging::init_logging_with_config;
use maoureu_scraper_lib::infrastructure::parsing::validation::to_fatal;
use maoureu_scraper_lib::infrastructure::parsing::{BlogPageParser, PostParseContext, PostParser};

/// Extract posts and post links from saved pages
#[derive(Parser, Debug)]
#[command(name = "extract_post")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the per-user config)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one post page as JSON
    Post {
        /// Saved post page
        page: PathBuf,

        /// URL the page was fetched from
        link: String,
    },

    /// Print the post links of listing pages, one per line
    Links {
        /// URL relative links are resolved against
        base_url: String,

        /// Saved listing pages, in page order
        #[arg(required = true, num_args = 1..)]
        pages: Vec<PathBuf>,
    },
}

async fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    manager.load_config().await
}

async fn read_page(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read page: {}", path.display()))
}

async fn extract_post(config: &AppConfig, page: &Path, link: &str) -> Result<()> {
    let html = read_page(page).await?;
    let context = PostParseContext::from_link(link)?;
    let parser = PostParser::with_config(&config.parsing)?;

    let post = to_fatal(parser.from_page(&html, context.id, &context.link))
        .with_context(|| format!("Failed to extract post from {}", page.display()))?;

    println!("{}", serde_json::to_string_pretty(&post)?);
    Ok(())
}

async fn extract_links(config: &AppConfig, base_url: &str, pages: &[PathBuf]) -> Result<()> {
    let base_url =
        Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;
    let parser = BlogPageParser::with_config(&config.parsing)?;

    let mut contents = Vec::with_capacity(pages.len());
    for page in pages {
        contents.push(read_page(page).await?);
    }

    let links = to_fatal(parser.post_links_from_pages(&contents, &base_url))
        .context("Failed to extract post links")?;
    for link in links {
        println!("{link}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config).await?;
    init_logging_with_config(config.logging.clone())?;

    match cli.command {
        Command::Post { page, link } => extract_post(&config, &page, &link).await,
        Command::Links { base_url, pages } => extract_links(&config, &base_url, &pages).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "extract_post",
            "post",
            "page.html",
            "https://maour.eu/2021/09/01/post/",
            "--config",
            "custom.json",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.json")));
        assert!(matches!(
            cli.command,
            Command::Post { ref page, ref link }
                if page == Path::new("page.html") && link == "https://maour.eu/2021/09/01/post/"
        ));
    }

    #[test]
    fn test_links_collects_every_page() {
        let cli = Cli::try_parse_from([
            "extract_post",
            "--config",
            "custom.json",
            "links",
            "https://maour.eu/",
            "page1.html",
            "page2.html",
        ])
        .unwrap();

        match cli.command {
            Command::Links { base_url, pages } => {
                assert_eq!(base_url, "https://maour.eu/");
                assert_eq!(pages, [PathBuf::from("page1.html"), PathBuf::from("page2.html")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_links_requires_a_page() {
        let error = Cli::try_parse_from(["extract_post", "links", "https://maour.eu/"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_help_and_version_are_available() {
        let help = Cli::try_parse_from(["extract_post", "--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let version = Cli::try_parse_from(["extract_post", "--version"]).unwrap_err();
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
    }
}
