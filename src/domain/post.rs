use serde::{Deserialize, Serialize};

use super::non_empty::NonEmptyVec;
use super::post_id::PostId;

/// A fully validated blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub link: String,
    pub date: String,
    pub title: String,
    pub paragraphs: NonEmptyVec<String>,
    pub images: NonEmptyVec<PostImage>,
}

/// An image of a post and the file name it is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    pub url: String,
    pub file_name: String,
}

impl PostImage {
    /// File name is the last non-empty `/`-separated segment of the URL.
    /// Returns `None` when the URL has no such segment.
    pub fn from_url(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        let file_name = url
            .rsplit('/')
            .find(|segment| !segment.is_empty())?
            .to_string();
        Some(Self { url, file_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_is_last_segment() {
        let image = PostImage::from_url("https://cdn.maour.eu/2021/09/photo-1.jpg").unwrap();
        assert_eq!(image.file_name, "photo-1.jpg");
    }

    #[test]
    fn test_trailing_slash_is_skipped() {
        let image = PostImage::from_url("https://cdn.maour.eu/images/cover/").unwrap();
        assert_eq!(image.file_name, "cover");
    }

    #[test]
    fn test_url_without_segment() {
        assert!(PostImage::from_url("").is_none());
        assert!(PostImage::from_url("///").is_none());
    }

    #[test]
    fn test_post_json_shape() {
        let post = Post {
            id: PostId::new("2021_09_01_post"),
            link: "https://maour.eu/2021/09/01/post/".to_string(),
            date: "1 septembre 2021".to_string(),
            title: "Post".to_string(),
            paragraphs: NonEmptyVec::of("Hello".to_string()),
            images: NonEmptyVec::of(PostImage::from_url("https://cdn/a.jpg").unwrap()),
        };

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["id"], "2021_09_01_post");
        assert_eq!(value["paragraphs"][0], "Hello");
        assert_eq!(value["images"][0]["fileName"], "a.jpg");

        let back: Post = serde_json::from_value(value).unwrap();
        assert_eq!(back, post);
    }
}
