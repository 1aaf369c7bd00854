//! Post identifiers derived from post URLs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static URL_PATH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^/]+(.*)$").expect("invalid `URL_PATH_REGEX`"));

static FORBIDDEN_FILE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/?*|\\]"#).expect("invalid `FORBIDDEN_FILE_NAME_CHARS`"));

/// Identifier of a post, safe to use as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derive an id from the path segments of an http(s) post URL.
    ///
    /// `https://maour.eu/2021/09/01/some-post/` becomes `2021_09_01_some-post`.
    /// Returns `None` for anything that is not an absolute http(s) URL.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = URL_PATH_REGEX.captures(url)?.get(1)?.as_str();
        let joined = path
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        Some(Self(clean_file_name(&joined)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remove characters that are not allowed in file names on common platforms
pub fn clean_file_name(value: &str) -> String {
    FORBIDDEN_FILE_NAME_CHARS.replace_all(value, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_joins_path_segments() {
        let url = "https://maour.eu/2021/09/01/le-mythe-de-la-moitie-3-3/";
        assert_eq!(
            PostId::from_url(url),
            Some(PostId::new("2021_09_01_le-mythe-de-la-moitie-3-3"))
        );
    }

    #[test]
    fn test_from_url_rejects_non_http() {
        assert_eq!(PostId::from_url("ftp://maour.eu/a/b"), None);
        assert_eq!(PostId::from_url("/2021/09/01/post"), None);
    }

    #[test]
    fn test_from_url_strips_forbidden_characters() {
        let id = PostId::from_url("http://host/a:b/c?d=1").unwrap();
        assert_eq!(id.as_str(), "ab_cd=1");
    }

    #[test]
    fn test_root_url_gives_empty_id() {
        assert_eq!(PostId::from_url("https://maour.eu/").unwrap().as_str(), "");
    }
}
