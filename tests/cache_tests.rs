//! Integration tests for the cache layer
//!
//! Covers the round-trip and freshness semantics over the real adapters,
//! and the bucket backend against a mock object-storage server.

use shiori_reader::cache::{
    fresh_lookup, url_digest, BucketCache, Cache, CacheEntry, MemoryCache, SqliteCache,
    FRESHNESS_WINDOW_MS,
};
use shiori_reader::config::BucketCacheConfig;
use shiori_reader::snapshot::PageSnapshot;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn snapshot(title: &str) -> PageSnapshot {
    PageSnapshot {
        title: title.to_string(),
        href: "https://example.com/".to_string(),
        html: "<html><body><p>Body</p></body></html>".to_string(),
        text: "Body".to_string(),
        parsed: None,
        screenshot: None,
        imgs: vec![],
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[tokio::test]
async fn test_fragment_and_plain_url_share_a_key() {
    let with_fragment = Url::parse("https://example.com/#frag").unwrap();
    let plain = Url::parse("https://example.com/").unwrap();
    assert_eq!(url_digest(&with_fragment), url_digest(&plain));

    // Saving under one digest is visible under the other
    let cache = MemoryCache::new(60_000);
    cache
        .save(plain.as_str(), &url_digest(&plain), &snapshot("shared"))
        .await
        .unwrap();

    let entry = cache.get(&url_digest(&with_fragment)).await.unwrap();
    assert_eq!(entry.unwrap().snapshot.title, "shared");
}

#[tokio::test]
async fn test_sqlite_round_trip_preserves_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let cache = SqliteCache::new(dir.path().join("cache.db"), 42_000).unwrap();

    let original = snapshot("round trip");
    cache
        .save("https://example.com/", "digest", &original)
        .await
        .unwrap();

    let entry = cache.get("digest").await.unwrap().unwrap();
    assert_eq!(entry.snapshot, original);
    assert_eq!(entry.expire_at - entry.created_at, 42_000);
}

#[tokio::test]
async fn test_stale_entry_is_a_miss_despite_future_expiry() {
    let cache = MemoryCache::new(60_000);
    let now = now_ms();

    cache.insert(CacheEntry {
        url: "https://example.com/".to_string(),
        created_at: now - FRESHNESS_WINDOW_MS - 1,
        expire_at: now + 1_000_000,
        url_digest: "stale".to_string(),
        snapshot: snapshot("stale"),
    });

    assert!(fresh_lookup(&cache, "stale").await.is_none());
    // Not expired, so the entry itself stays in the backend
    assert!(cache.get("stale").await.unwrap().is_some());
}

#[tokio::test]
async fn test_fresh_entry_is_a_hit() {
    let cache = MemoryCache::new(60_000);
    let now = now_ms();

    cache.insert(CacheEntry {
        url: "https://example.com/".to_string(),
        created_at: now - 1_000,
        expire_at: now + 59_000,
        url_digest: "fresh".to_string(),
        snapshot: snapshot("fresh"),
    });

    let hit = fresh_lookup(&cache, "fresh").await.unwrap();
    assert_eq!(hit.title, "fresh");
}

#[tokio::test]
async fn test_expired_entry_is_deleted_on_read() {
    let cache = MemoryCache::new(60_000);
    let now = now_ms();

    cache.insert(CacheEntry {
        url: "https://example.com/".to_string(),
        created_at: now - 10_000,
        expire_at: now - 1,
        url_digest: "expired".to_string(),
        snapshot: snapshot("expired"),
    });

    assert!(fresh_lookup(&cache, "expired").await.is_none());
    // Deletion is a side effect of the read that discovered the expiry
    assert!(cache.get("expired").await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_key_is_a_miss() {
    let cache = MemoryCache::new(60_000);
    assert!(fresh_lookup(&cache, "absent").await.is_none());
}

fn bucket_config(server: &MockServer) -> BucketCacheConfig {
    BucketCacheConfig {
        endpoint: server.uri(),
        access_key: "test-key".to_string(),
        bucket: "snaps".to_string(),
    }
}

#[tokio::test]
async fn test_bucket_round_trip() {
    let server = MockServer::start().await;

    let entry = CacheEntry {
        url: "https://example.com/".to_string(),
        created_at: now_ms(),
        expire_at: now_ms() + 60_000,
        url_digest: "abc".to_string(),
        snapshot: snapshot("bucketed"),
    };

    Mock::given(method("PUT"))
        .and(path("/object/snaps/abc.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/object/snaps/abc.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&entry))
        .mount(&server)
        .await;

    let cache = BucketCache::new(&bucket_config(&server), 60_000).unwrap();

    cache
        .save("https://example.com/", "abc", &snapshot("bucketed"))
        .await
        .unwrap();

    let fetched = cache.get("abc").await.unwrap().unwrap();
    assert_eq!(fetched.snapshot.title, "bucketed");
    assert_eq!(fetched.url_digest, "abc");
}

#[tokio::test]
async fn test_bucket_missing_object_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let cache = BucketCache::new(&bucket_config(&server), 60_000).unwrap();
    assert!(cache.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_bucket_server_error_surfaces_as_cache_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cache = BucketCache::new(&bucket_config(&server), 60_000).unwrap();
    assert!(cache.get("key").await.is_err());
}

#[tokio::test]
async fn test_bucket_read_failure_degrades_to_miss_in_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cache = BucketCache::new(&bucket_config(&server), 60_000).unwrap();
    // The read path swallows backend failures
    assert!(fresh_lookup(&cache, "key").await.is_none());
}

#[tokio::test]
async fn test_bucket_remove_tolerates_missing_object() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let cache = BucketCache::new(&bucket_config(&server), 60_000).unwrap();
    assert!(cache.remove("gone").await.is_ok());
}
