//! Content formatter
//!
//! Turns a page snapshot into [`FormattedContent`]: clean markdown plus
//! document metadata, with image descriptions resolved concurrently before
//! conversion. Formatting is total -- every snapshot produces some output,
//! degrading through the conversion fallback chain rather than failing.

mod images;
mod markdown;

pub use images::resolve_image_alts;
pub use markdown::{convert_snapshot, tidy_markdown};

use crate::snapshot::PageSnapshot;
use serde::Serialize;

/// Terminal output of a crawl
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedContent {
    pub title: String,
    pub url: String,
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl FormattedContent {
    /// Plaintext rendering used for the markdown response mode
    pub fn to_text(&self) -> String {
        let published = match &self.published_time {
            Some(time) => format!("\nPublished Time: {}\n", time),
            None => String::new(),
        };
        format!(
            "Title: {}\n\nURL Source: {}\n{}\nMarkdown Content:\n{}\n",
            self.title, self.url, published, self.content
        )
    }
}

/// Formats a snapshot into markdown content
///
/// The nominal URL, when given, wins over the document's own href so the
/// caller sees the address they asked for rather than a redirect target.
pub async fn format_snapshot(snapshot: &PageSnapshot, nominal_url: Option<&str>) -> FormattedContent {
    let alt_map = resolve_image_alts(&snapshot.imgs).await;
    let content = convert_snapshot(snapshot, &alt_map);
    let content = tidy_markdown(&content);

    let title = snapshot
        .parsed
        .as_ref()
        .and_then(|p| p.title.as_deref())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&snapshot.title)
        .trim()
        .to_string();

    let url = nominal_url
        .map(str::to_string)
        .unwrap_or_else(|| snapshot.href.trim().to_string());

    FormattedContent {
        title,
        url,
        content,
        published_time: snapshot
            .parsed
            .as_ref()
            .and_then(|p| p.published_time.clone()),
        screenshot: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ParsedArticle;

    fn snapshot() -> PageSnapshot {
        PageSnapshot {
            title: "Document Title".to_string(),
            href: "https://example.com/actual".to_string(),
            html: "<html><body><p>Some body text for the page.</p></body></html>".to_string(),
            text: "Some body text for the page.".to_string(),
            parsed: Some(ParsedArticle {
                title: Some("Article Title".to_string()),
                content: Some("<p>Some body text for the page.</p>".to_string()),
                published_time: Some("2024-05-01T00:00:00Z".to_string()),
                ..Default::default()
            }),
            screenshot: None,
            imgs: vec![],
        }
    }

    #[tokio::test]
    async fn test_parsed_title_preferred() {
        let formatted = format_snapshot(&snapshot(), None).await;
        assert_eq!(formatted.title, "Article Title");
    }

    #[tokio::test]
    async fn test_document_title_fallback() {
        let mut snap = snapshot();
        snap.parsed.as_mut().unwrap().title = None;
        let formatted = format_snapshot(&snap, None).await;
        assert_eq!(formatted.title, "Document Title");
    }

    #[tokio::test]
    async fn test_nominal_url_preferred() {
        let formatted =
            format_snapshot(&snapshot(), Some("https://example.com/requested")).await;
        assert_eq!(formatted.url, "https://example.com/requested");

        let formatted = format_snapshot(&snapshot(), None).await;
        assert_eq!(formatted.url, "https://example.com/actual");
    }

    #[tokio::test]
    async fn test_to_text_rendering() {
        let formatted = format_snapshot(&snapshot(), None).await;
        let text = formatted.to_text();

        assert!(text.starts_with("Title: Article Title\n\nURL Source: "));
        assert!(text.contains("\nPublished Time: 2024-05-01T00:00:00Z\n"));
        assert!(text.contains("Markdown Content:\n"));
    }

    #[tokio::test]
    async fn test_to_text_without_published_time() {
        let mut snap = snapshot();
        snap.parsed.as_mut().unwrap().published_time = None;
        let text = format_snapshot(&snap, None).await.to_text();
        assert!(!text.contains("Published Time:"));
    }
}
