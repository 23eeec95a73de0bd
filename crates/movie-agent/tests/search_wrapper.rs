//! Search wrapper behaviour under the configured TTL and rate limit.

use std::sync::Arc;
use std::time::Duration;

use movie_agent::search::Snippet;
use movie_agent::{MockSearchProvider, SearchErrorKind, SearchOutcome, SearchWrapper, Settings};
use tokio::time::Instant;

fn settings(pairs: &[(&str, &str)]) -> Settings {
    let pairs: Vec<(String, String)> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let s = Settings::from_lookup(|key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())).unwrap();
    s.validate().unwrap();
    s
}

#[tokio::test(start_paused = true)]
async fn repeated_query_within_ttl_is_served_from_cache() {
    let s = settings(&[("SEARCH_CACHE_TTL", "3600"), ("SEARCH_RATE_LIMIT_DELAY", "1.0")]);
    let provider = Arc::new(
        MockSearchProvider::new().with_reply("inception", vec![Snippet::new("Leonardo DiCaprio as Cobb")]),
    );
    let wrapper = SearchWrapper::new(provider.clone(), &s.search);

    let first = wrapper.search("Inception cast").await;
    tokio::time::advance(Duration::from_millis(100)).await;
    let start = Instant::now();
    let second = wrapper.search("Inception cast").await;

    assert!(start.elapsed() < Duration::from_millis(1));
    assert_eq!(first.text(), Some("- Leonardo DiCaprio as Cobb"));
    assert_eq!(first.text(), second.text());
    assert!(matches!(second, SearchOutcome::Success { cached: true, .. }));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_triggers_new_provider_call() {
    let s = settings(&[("SEARCH_CACHE_TTL", "3600")]);
    let provider = Arc::new(MockSearchProvider::always("Leonardo DiCaprio"));
    let wrapper = SearchWrapper::new(provider.clone(), &s.search);

    wrapper.search("Inception cast").await;
    wrapper.search("Inception cast").await;
    assert_eq!(provider.calls(), 1);

    tokio::time::advance(Duration::from_secs(3601)).await;
    let third = wrapper.search("inception CAST").await;
    assert!(matches!(third, SearchOutcome::Success { cached: false, .. }));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn cache_misses_are_throttled() {
    let s = settings(&[("SEARCH_RATE_LIMIT_DELAY", "1.0")]);
    let provider = Arc::new(MockSearchProvider::always("result"));
    let wrapper = SearchWrapper::new(provider.clone(), &s.search);

    let start = Instant::now();
    wrapper.search("Heat cast").await;
    assert_eq!(start.elapsed(), Duration::ZERO);

    wrapper.search("Ronin cast").await;
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert_eq!(provider.calls(), 2);

    // A hit never waits, even right after a provider call.
    let before_hit = Instant::now();
    wrapper.search("Ronin cast").await;
    assert_eq!(before_hit.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn timeout_is_reported_not_raised() {
    let s = settings(&[("SEARCH_TIMEOUT", "2")]);
    let provider = Arc::new(MockSearchProvider::always("x").hang_on("heath ledger"));
    let wrapper = SearchWrapper::new(provider, &s.search);

    let start = Instant::now();
    let out = wrapper.search("Heath Ledger movies").await;
    assert_eq!(out.error_kind(), Some(SearchErrorKind::Timeout));
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}
