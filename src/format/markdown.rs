//! HTML to markdown conversion
//!
//! Two-tier conversion: a rich converter with image numbering and a small
//! table extension, falling back to the baseline converter, and finally to
//! the page's plain text. Conversion never raises; the worst case is tidy
//! plain text.

use crate::snapshot::PageSnapshot;
use htmd::{Element, HtmlToMarkdown};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Converts the snapshot's best available content to markdown
///
/// Input preference: parsed-article fragment, then the full page HTML,
/// then plain text. A conversion result that is empty or still raw markup
/// (starts with `<` and ends with `>`) triggers the next fallback.
pub fn convert_snapshot(snapshot: &PageSnapshot, alt_map: &HashMap<String, String>) -> String {
    let mut content = match snapshot.parsed.as_ref().and_then(|p| p.content.as_deref()) {
        Some(fragment) if !fragment.trim().is_empty() => convert_html(fragment, alt_map),
        _ => String::new(),
    };

    if content.is_empty() || looks_like_markup(&content) {
        content = convert_html(&snapshot.html, alt_map);
    }

    if content.is_empty() || looks_like_markup(&content) {
        content = snapshot.text.clone();
    }

    content
}

/// Runs the rich converter, retrying with the baseline on failure
fn convert_html(html: &str, alt_map: &HashMap<String, String>) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    match rich_converter(alt_map).convert(html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            tracing::warn!("Rich conversion failed, retrying with baseline: {}", e);
            match htmd::convert(html) {
                Ok(markdown) => markdown.trim().to_string(),
                Err(e2) => {
                    tracing::warn!("Baseline conversion failed, giving up: {}", e2);
                    String::new()
                }
            }
        }
    }
}

/// Builds the rich converter: scripts stripped, images numbered in
/// document order, tables rendered as pipe rows.
fn rich_converter(alt_map: &HashMap<String, String>) -> HtmlToMarkdown {
    let alt_map = alt_map.clone();
    let image_index = AtomicUsize::new(0);

    HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .add_handler(vec!["img"], move |element: Element| {
            let src = attr(&element, "src").unwrap_or_default().trim().to_string();
            if src.is_empty() {
                return Some(String::new());
            }

            // Position-based numbering: the counter advances for every
            // sourced image regardless of how its alt resolved.
            let index = image_index.fetch_add(1, Ordering::SeqCst) + 1;
            let raw_alt = clean_attribute(&attr(&element, "alt").unwrap_or_default());
            let alt = alt_map.get(&src).cloned().unwrap_or(raw_alt);

            Some(format!("![Image {}: {}]({})", index, alt, src))
        })
        .add_handler(vec!["th", "td"], |element: Element| {
            Some(format!("| {} ", collapse_whitespace(element.content.trim())))
        })
        .add_handler(vec!["tr"], |element: Element| {
            let cells = element.content.trim_matches('\n');
            if cells.trim().is_empty() {
                return Some(String::new());
            }
            Some(format!("{}|\n", cells))
        })
        .add_handler(vec!["thead"], |element: Element| {
            let rows = element.content.trim_matches('\n');
            let columns = rows
                .lines()
                .next()
                .map(|row| row.matches('|').count().saturating_sub(1))
                .unwrap_or(0);
            if columns == 0 {
                return Some(rows.to_string());
            }
            Some(format!("{}\n|{}\n", rows, " --- |".repeat(columns)))
        })
        .add_handler(vec!["table"], |element: Element| {
            Some(format!("\n\n{}\n\n", element.content.trim_matches('\n')))
        })
        .build()
}

fn attr(element: &Element, name: &str) -> Option<String> {
    element
        .attrs
        .iter()
        .find(|attribute| attribute.name.local.as_ref() == name)
        .map(|attribute| attribute.value.to_string())
}

/// Flattens an attribute value the way it should appear inside markdown
fn clean_attribute(value: &str) -> String {
    collapse_whitespace(value.trim())
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when converted output is still raw markup rather than markdown
fn looks_like_markup(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

/// Whitespace normalization for the final markdown
///
/// Trailing whitespace is stripped per line, runs of blank lines collapse
/// to a single blank line, and the ends are trimmed.
pub fn tidy_markdown(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ParsedArticle;

    fn snapshot(parsed_content: Option<&str>, html: &str, text: &str) -> PageSnapshot {
        PageSnapshot {
            title: "T".to_string(),
            href: "https://example.com/".to_string(),
            html: html.to_string(),
            text: text.to_string(),
            parsed: parsed_content.map(|c| ParsedArticle {
                content: Some(c.to_string()),
                ..Default::default()
            }),
            screenshot: None,
            imgs: vec![],
        }
    }

    #[test]
    fn test_parsed_content_preferred() {
        let snap = snapshot(
            Some("<h1>Article</h1><p>Body text</p>"),
            "<html><body><p>Full page</p></body></html>",
            "plain",
        );
        let markdown = convert_snapshot(&snap, &HashMap::new());
        assert!(markdown.contains("# Article"));
        assert!(markdown.contains("Body text"));
        assert!(!markdown.contains("Full page"));
    }

    #[test]
    fn test_falls_back_to_full_html() {
        let snap = snapshot(None, "<html><body><p>Full page</p></body></html>", "plain");
        let markdown = convert_snapshot(&snap, &HashMap::new());
        assert!(markdown.contains("Full page"));
    }

    #[test]
    fn test_falls_back_to_plain_text() {
        let snap = snapshot(None, "", "the plain text");
        let markdown = convert_snapshot(&snap, &HashMap::new());
        assert_eq!(markdown, "the plain text");
    }

    #[test]
    fn test_image_numbering_is_positional() {
        let html = "<p><img src=\"https://e.com/a.png\" alt=\"first\">\
                    <img src=\"https://e.com/b.png\">\
                    <img src=\"https://e.com/c.png\" alt=\"third\"></p>";
        let markdown = convert_html(html, &HashMap::new());

        assert!(markdown.contains("![Image 1: first](https://e.com/a.png)"));
        assert!(markdown.contains("![Image 2: ](https://e.com/b.png)"));
        assert!(markdown.contains("![Image 3: third](https://e.com/c.png)"));
    }

    #[test]
    fn test_image_alt_map_overrides_attribute() {
        let mut alt_map = HashMap::new();
        alt_map.insert("https://e.com/a.png".to_string(), "Resolved".to_string());

        let html = "<img src=\"https://e.com/a.png\" alt=\"raw\">";
        let markdown = convert_html(html, &alt_map);
        assert!(markdown.contains("![Image 1: Resolved](https://e.com/a.png)"));
    }

    #[test]
    fn test_sourceless_image_dropped_without_numbering() {
        let html = "<p><img alt=\"no src\"><img src=\"https://e.com/a.png\" alt=\"a\"></p>";
        let markdown = convert_html(html, &HashMap::new());
        assert!(markdown.contains("![Image 1: a](https://e.com/a.png)"));
        assert!(!markdown.contains("no src"));
    }

    #[test]
    fn test_table_rows_rendered() {
        let html = "<table><thead><tr><th>Name</th><th>Age</th></tr></thead>\
                    <tbody><tr><td>Ada</td><td>36</td></tr></tbody></table>";
        let markdown = convert_html(html, &HashMap::new());

        assert!(markdown.contains("| Name | Age |"));
        assert!(markdown.contains("| --- | --- |"));
        assert!(markdown.contains("| Ada | 36 |"));
    }

    #[test]
    fn test_tidy_collapses_blank_runs() {
        let input = "a\n\n\n\nb   \n\n\nc";
        assert_eq!(tidy_markdown(input), "a\n\nb\n\nc");
    }

    #[test]
    fn test_tidy_trims_ends() {
        assert_eq!(tidy_markdown("\n\n  hello  \n\n"), "hello");
    }

    #[test]
    fn test_looks_like_markup() {
        assert!(looks_like_markup("<div>untouched</div>"));
        assert!(!looks_like_markup("# heading"));
        assert!(!looks_like_markup("a < b and b > a"));
    }
}
