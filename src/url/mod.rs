//! URL validation and cache-key normalization

mod normalize;

pub use normalize::{cache_key_url, validate_crawl_url};
