//! Post link discovery on listing pages, feeding post extraction
use maoureu_scraper_lib::infrastructure::parsing::{
    BlogPageParser, ListingParseContext, PostParseContext, PostParser,
};
use maoureu_scraper_lib::infrastructure::parsing::{ContextualParser, DocumentHandle};

const LISTING: &str = r#"
<html><body>
  <div class="posts">
    <a class="post" href="/2021/09/01/le-mythe-de-la-moitie-3-3/">Le mythe (3/3)</a>
    <a class="post" href="/2021/08/25/le-mythe-de-la-moitie-2-3/">Le mythe (2/3)</a>
  </div>
  <a class="post" href="/not-in-the-listing/">ignored</a>
</body></html>
"#;

#[test]
fn listing_links_derive_post_ids() {
    let context = ListingParseContext::new(1, "https://maour.eu/").unwrap();
    let parser = BlogPageParser::new().unwrap();

    let links = parser
        .parse_with_context(&DocumentHandle::load(LISTING), &context)
        .unwrap();
    let ids: Vec<String> = links
        .iter()
        .map(|link| PostParseContext::from_link(link).unwrap().id.to_string())
        .collect();

    assert_eq!(
        ids,
        vec![
            "2021_09_01_le-mythe-de-la-moitie-3-3",
            "2021_08_25_le-mythe-de-la-moitie-2-3",
        ]
    );
}

#[test]
fn every_failing_listing_page_is_reported() {
    let context = ListingParseContext::new(1, "https://maour.eu/").unwrap();
    let parser = BlogPageParser::new().unwrap();
    let pages = vec![
        "<p>nothing here</p>".to_string(),
        LISTING.to_string(),
        r#"<div class="posts"><span class="post">not a link</span></div>"#.to_string(),
    ];

    let errors = parser
        .post_links_from_pages(&pages, &context.base_url)
        .unwrap_err();
    assert_eq!(
        errors.messages(),
        [
            "page 1: Failed to decode posts: No element matches selector: div.posts > a.post",
            "page 3: Failed to decode posts: No element matches selector: div.posts > a.post",
        ]
    );
}

#[test]
fn post_parser_reads_context_from_link() {
    let html = r#"
        <div class="post-container">
          <div class="post-header"><h1 class="post-title">T</h1><p class="post-date">D</p></div>
          <div class="post-content"><p>P</p></div>
          <noscript><img src="https://cdn.maour.eu/x.jpg"></noscript>
        </div>"#;
    let context = PostParseContext::from_link("https://maour.eu/2021/09/01/post/").unwrap();

    let post = PostParser::new()
        .unwrap()
        .parse_with_context(&DocumentHandle::load(html), &context)
        .unwrap();
    assert_eq!(post.id.as_str(), "2021_09_01_post");
    assert_eq!(post.images[0].file_name, "x.jpg");
}
