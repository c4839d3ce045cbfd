//! Page snapshot data model
//!
//! A [`PageSnapshot`] is the structured result of rendering and extracting
//! one page: document metadata, raw DOM, plain text, an optional
//! parsed-article projection, and image briefs for the formatter. The
//! snapshot is immutable after creation except for the screenshot, which is
//! attached after the base snapshot is produced.

mod article;
mod script;

pub use article::{filter_article_images, parse_article};
pub use script::{SNAPSHOT_BINDING, SNAPSHOT_EXPRESSION, SNAPSHOT_SCRIPT};

use serde::{Deserialize, Serialize};

/// Structured result of rendering and extracting one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    /// Document title
    pub title: String,

    /// Canonical location after redirects
    pub href: String,

    /// Serialized DOM at extraction time
    pub html: String,

    /// Rendered plain text of the body
    pub text: String,

    /// Parsed-article projection, when the page yields one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedArticle>,

    /// Base64-encoded JPEG screenshot, attached after extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,

    /// Briefs for the images referenced by the parsed content
    #[serde(default)]
    pub imgs: Vec<ImageBrief>,
}

impl PageSnapshot {
    /// True when extraction produced no title and no article content,
    /// the signal that the page failed to render meaningfully.
    pub fn is_degenerate(&self) -> bool {
        self.title.trim().is_empty()
            && self
                .parsed
                .as_ref()
                .and_then(|p| p.content.as_deref())
                .map_or(true, |c| c.trim().is_empty())
    }
}

/// Readable-article projection of a rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedArticle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Article body as an HTML fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Article body as plain text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
}

/// Per-image metadata collected in-page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBrief {
    pub src: String,

    /// Whether the browser finished loading the image
    #[serde(default)]
    pub loaded: bool,

    /// Displayed dimensions
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,

    /// Intrinsic dimensions
    #[serde(default)]
    pub natural_width: u32,
    #[serde(default)]
    pub natural_height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Raw object returned by the in-page extraction script
///
/// Images are collected page-wide here; [`filter_article_images`] narrows
/// them to the parsed content before they land in the snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub imgs: Vec<ImageBrief>,
}

impl RawSnapshot {
    /// Builds the full snapshot: projects the parsed article from the raw
    /// DOM and narrows the image briefs to those the article references.
    pub fn into_snapshot(self) -> PageSnapshot {
        let parsed = parse_article(&self.html);
        let imgs = match parsed.as_ref().and_then(|p| p.content.as_deref()) {
            Some(content) => filter_article_images(self.imgs, content, &self.href),
            None => Vec::new(),
        };

        PageSnapshot {
            title: self.title,
            href: self.href,
            html: self.html,
            text: self.text,
            parsed,
            screenshot: None,
            imgs,
        }
    }
}
