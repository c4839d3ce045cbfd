//! HTTP boundary
//!
//! One route: `GET /` crawls a URL and returns either the plaintext
//! markdown rendering or the structured object, selected by the `markdown`
//! parameter. Bad input is the caller's problem (400); everything that
//! goes wrong past validation is ours (500).

use crate::crawl::{CrawlOptions, Crawler};
use crate::format::format_snapshot;
use crate::url::validate_crawl_url;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Builds the application router around the orchestrator
pub fn router(crawler: Arc<Crawler>) -> Router {
    Router::new()
        .route("/", get(crawl_handler))
        .with_state(crawler)
}

/// Query parameters of the crawl route
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlParams {
    pub url: String,

    #[serde(default)]
    pub use_screenshot: bool,

    #[serde(default)]
    pub use_cache: bool,

    #[serde(default = "default_markdown")]
    pub markdown: bool,
}

fn default_markdown() -> bool {
    true
}

impl CrawlParams {
    fn options(&self) -> CrawlOptions {
        CrawlOptions {
            use_screenshot: self.use_screenshot,
            use_cache: self.use_cache,
            markdown: self.markdown,
        }
    }
}

async fn crawl_handler(
    State(crawler): State<Arc<Crawler>>,
    Query(params): Query<CrawlParams>,
) -> Response {
    let url = match validate_crawl_url(&params.url) {
        Ok(url) => url,
        Err(error) => {
            tracing::error!("Rejected crawl request for {:?}: {}", params.url, error);
            return (StatusCode::BAD_REQUEST, error.to_string()).into_response();
        }
    };

    let snapshot = match crawler.crawl(&url, params.options()).await {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to crawl").into_response();
        }
        Err(error) => {
            tracing::error!("Crawl of {} failed: {}", url, error);
            return (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response();
        }
    };

    let mut formatted = format_snapshot(&snapshot, Some(url.as_str())).await;
    formatted.screenshot = snapshot.screenshot.clone();

    if params.markdown {
        formatted.to_text().into_response()
    } else {
        Json(formatted).into_response()
    }
}
