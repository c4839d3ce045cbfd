//! Image description resolution
//!
//! Resolves a descriptive alt text for every image brief before markdown
//! conversion. Resolutions run concurrently and are failure-isolated: one
//! failed description falls back to a placeholder without aborting the
//! batch. The formatter waits for the whole batch so image numbering is
//! never partial.

use crate::snapshot::ImageBrief;
use futures::future::join_all;
use std::collections::HashMap;

/// Placeholder used when no description can be produced
const FALLBACK_ALT: &str = "Image";

/// Resolves alt texts for all briefs, keyed by trimmed source URL
pub async fn resolve_image_alts(imgs: &[ImageBrief]) -> HashMap<String, String> {
    let tasks = imgs.iter().map(|img| async move {
        let alt = match describe_image(img).await {
            Ok(alt) => alt,
            Err(e) => {
                tracing::warn!("Failed to get alt text for {}: {}", img.src, e);
                FALLBACK_ALT.to_string()
            }
        };
        (img.src.trim().to_string(), alt)
    });

    join_all(tasks)
        .await
        .into_iter()
        .filter(|(src, _)| !src.is_empty())
        .collect()
}

/// Produces a description for one image
///
/// Today this passes the in-page alt attribute through. The boundary is
/// async and fallible so a captioning model can be dropped in without
/// changing the pipeline shape.
async fn describe_image(img: &ImageBrief) -> anyhow::Result<String> {
    Ok(img
        .alt
        .as_deref()
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .unwrap_or(FALLBACK_ALT)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief(src: &str, alt: Option<&str>) -> ImageBrief {
        ImageBrief {
            src: src.to_string(),
            loaded: true,
            width: 10,
            height: 10,
            natural_width: 10,
            natural_height: 10,
            alt: alt.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_alt_pass_through() {
        let map = resolve_image_alts(&[brief("https://e.com/a.png", Some("A chart"))]).await;
        assert_eq!(map.get("https://e.com/a.png").unwrap(), "A chart");
    }

    #[tokio::test]
    async fn test_missing_alt_falls_back() {
        let map = resolve_image_alts(&[
            brief("https://e.com/a.png", None),
            brief("https://e.com/b.png", Some("   ")),
        ])
        .await;
        assert_eq!(map.get("https://e.com/a.png").unwrap(), "Image");
        assert_eq!(map.get("https://e.com/b.png").unwrap(), "Image");
    }

    #[tokio::test]
    async fn test_empty_src_dropped() {
        let map = resolve_image_alts(&[brief("  ", Some("x"))]).await;
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_src_keys_are_trimmed() {
        let map = resolve_image_alts(&[brief(" https://e.com/a.png ", Some("x"))]).await;
        assert!(map.contains_key("https://e.com/a.png"));
    }
}
