//! Integration tests for the content formatter
//!
//! Exercises the full formatting pipeline on snapshot fixtures: fallback
//! chain, image numbering with alt enrichment, and the output renderings.

use shiori_reader::format::{format_snapshot, tidy_markdown};
use shiori_reader::snapshot::{ImageBrief, PageSnapshot, ParsedArticle};

fn brief(src: &str, alt: Option<&str>) -> ImageBrief {
    ImageBrief {
        src: src.to_string(),
        loaded: true,
        width: 100,
        height: 100,
        natural_width: 400,
        natural_height: 400,
        alt: alt.map(String::from),
    }
}

fn article_snapshot() -> PageSnapshot {
    PageSnapshot {
        title: "Document Title".to_string(),
        href: "https://example.com/post".to_string(),
        html: "<html><body><article><p>Full page body</p></article></body></html>".to_string(),
        text: "Full page body".to_string(),
        parsed: Some(ParsedArticle {
            title: Some("Article Title".to_string()),
            content: Some(
                "<h2>Section</h2>\
                 <p>First paragraph.</p>\
                 <img src=\"https://example.com/a.png\" alt=\"alpha\">\
                 <img src=\"https://example.com/b.png\">"
                    .to_string(),
            ),
            published_time: Some("2024-06-01T12:00:00Z".to_string()),
            ..Default::default()
        }),
        screenshot: None,
        imgs: vec![
            brief("https://example.com/a.png", Some("alpha")),
            brief("https://example.com/b.png", None),
        ],
    }
}

#[tokio::test]
async fn test_images_numbered_in_document_order() {
    let formatted = format_snapshot(&article_snapshot(), None).await;

    // Numbering is positional and 1-based; the unresolved image falls back
    // to the placeholder without disturbing its neighbor's number.
    assert!(formatted
        .content
        .contains("![Image 1: alpha](https://example.com/a.png)"));
    assert!(formatted
        .content
        .contains("![Image 2: Image](https://example.com/b.png)"));
}

#[tokio::test]
async fn test_markdown_structure_from_parsed_content() {
    let formatted = format_snapshot(&article_snapshot(), None).await;

    assert!(formatted.content.contains("## Section"));
    assert!(formatted.content.contains("First paragraph."));
    // The full-page fallback content must not leak in
    assert!(!formatted.content.contains("Full page body"));
}

#[tokio::test]
async fn test_empty_parsed_content_falls_back_to_html() {
    let mut snap = article_snapshot();
    snap.parsed = None;

    let formatted = format_snapshot(&snap, None).await;
    assert!(formatted.content.contains("Full page body"));
}

#[tokio::test]
async fn test_unconvertible_markup_falls_back_to_plain_text() {
    let snap = PageSnapshot {
        title: "T".to_string(),
        href: "https://example.com/".to_string(),
        // Style-only markup converts to nothing at every tier, which must
        // push the pipeline down to the plain-text tier.
        html: "<html><head><style>.a{color:red}</style></head><body></body></html>".to_string(),
        text: "the plain text tier".to_string(),
        parsed: Some(ParsedArticle {
            content: Some("<style>.a{color:red}</style>".to_string()),
            ..Default::default()
        }),
        screenshot: None,
        imgs: vec![],
    };

    let formatted = format_snapshot(&snap, None).await;
    assert_eq!(formatted.content, "the plain text tier");
}

#[tokio::test]
async fn test_everything_empty_yields_empty_content() {
    let snap = PageSnapshot {
        title: "T".to_string(),
        href: "https://example.com/".to_string(),
        html: String::new(),
        text: String::new(),
        parsed: None,
        screenshot: None,
        imgs: vec![],
    };

    let formatted = format_snapshot(&snap, None).await;
    assert!(formatted.content.is_empty());
}

#[tokio::test]
async fn test_plaintext_rendering_shape() {
    let formatted =
        format_snapshot(&article_snapshot(), Some("https://example.com/requested")).await;
    let text = formatted.to_text();

    assert!(text.starts_with("Title: Article Title\n"));
    assert!(text.contains("URL Source: https://example.com/requested"));
    assert!(text.contains("Published Time: 2024-06-01T12:00:00Z"));
    assert!(text.contains("Markdown Content:\n"));
}

#[tokio::test]
async fn test_structured_serialization_shape() {
    let mut formatted = format_snapshot(&article_snapshot(), None).await;
    formatted.screenshot = Some("aGVsbG8=".to_string());

    let json = serde_json::to_value(&formatted).unwrap();
    assert_eq!(json["title"], "Article Title");
    assert_eq!(json["url"], "https://example.com/post");
    assert_eq!(json["publishedTime"], "2024-06-01T12:00:00Z");
    assert_eq!(json["screenshot"], "aGVsbG8=");
}

#[test]
fn test_tidy_collapses_and_trims() {
    let input = "# Title\n\n\n\nBody line.   \n\n\n\nLast.\n\n";
    assert_eq!(tidy_markdown(input), "# Title\n\nBody line.\n\nLast.");
}
