//! Readable-article projection
//!
//! Projects a rendered page onto the article shape the formatter consumes:
//! the main content fragment, its plain text, and the usual metadata
//! (byline, language, publish time, excerpt). Selection is heuristic --
//! the first content root with enough text wins.

use crate::snapshot::{ImageBrief, ParsedArticle};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Content roots tried in order of preference
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    "#content",
    ".post-content",
    ".article-body",
    ".entry-content",
];

/// A candidate root must carry at least this much text to count as content
const MIN_CONTENT_CHARS: usize = 140;

/// Projects the parsed-article shape out of a rendered document
///
/// Returns `None` when no content root with enough text exists; the caller
/// treats that as "page did not render meaningfully" together with an
/// empty title.
pub fn parse_article(html: &str) -> Option<ParsedArticle> {
    if html.trim().is_empty() {
        return None;
    }

    let document = Html::parse_document(html);
    let root = select_content_root(&document)?;

    let text_content = collect_text(&root);
    if text_content.len() < MIN_CONTENT_CHARS {
        return None;
    }

    Some(ParsedArticle {
        title: article_title(&document, &root),
        content: Some(root.inner_html()),
        excerpt: meta_content(&document, &["meta[name='description']", "meta[property='og:description']"]),
        byline: meta_content(&document, &["meta[name='author']", "meta[property='article:author']"]),
        lang: document_lang(&document),
        published_time: published_time(&document),
        text_content: Some(text_content),
    })
}

/// Narrows page-wide image briefs to those the article content references
///
/// Sources inside the fragment may be relative; they are resolved against
/// the document href before matching, so briefs (whose `src` is always
/// absolute) line up. Document order of the briefs is preserved.
pub fn filter_article_images(
    imgs: Vec<ImageBrief>,
    content_html: &str,
    base_href: &str,
) -> Vec<ImageBrief> {
    let fragment = Html::parse_fragment(content_html);
    let selector = match Selector::parse("img[src]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let base = Url::parse(base_href).ok();
    let mut referenced: HashSet<String> = HashSet::new();
    for element in fragment.select(&selector) {
        if let Some(src) = element.value().attr("src") {
            let src = src.trim();
            if src.is_empty() {
                continue;
            }
            let absolute = match &base {
                Some(base) => base
                    .join(src)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| src.to_string()),
                None => src.to_string(),
            };
            referenced.insert(absolute);
        }
    }

    imgs.into_iter()
        .filter(|brief| referenced.contains(brief.src.trim()))
        .collect()
}

/// Picks the first content root that holds enough text
fn select_content_root(document: &Html) -> Option<ElementRef<'_>> {
    for selector_str in CONTENT_SELECTORS {
        let selector = Selector::parse(selector_str).ok()?;
        if let Some(element) = document
            .select(&selector)
            .find(|el| collect_text(el).len() >= MIN_CONTENT_CHARS)
        {
            return Some(element);
        }
    }
    None
}

fn collect_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Article title: first heading inside the content root, then og:title
fn article_title(document: &Html, root: &ElementRef<'_>) -> Option<String> {
    if let Ok(selector) = Selector::parse("h1, h2") {
        if let Some(heading) = root.select(&selector).next() {
            let text = collect_text(&heading);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    meta_content(document, &["meta[property='og:title']"])
}

/// First non-empty `content` attribute among the given meta selectors
fn meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        let selector = Selector::parse(selector_str).ok()?;
        if let Some(value) = document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
        {
            return Some(value);
        }
    }
    None
}

fn document_lang(document: &Html) -> Option<String> {
    let selector = Selector::parse("html").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Publish time from article metadata, falling back to a `<time datetime>`
fn published_time(document: &Html) -> Option<String> {
    if let Some(value) = meta_content(
        document,
        &[
            "meta[property='article:published_time']",
            "meta[name='date']",
        ],
    ) {
        return Some(value);
    }

    let selector = Selector::parse("time[datetime]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
