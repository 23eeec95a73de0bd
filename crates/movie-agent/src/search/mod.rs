//! Search wrapper: sanitized queries, TTL cache, rate limiting, uniform outcomes.
//!
//! ```text
//! search(q) → sanitize → cache hit? ──yes──→ Success { cached: true }
//!                          │ no
//!                          └→ rate limiter → provider (timeout) → Success | Failure
//! ```
//!
//! Failures never escape as errors: every call returns a `SearchOutcome`.

pub mod cache;
pub mod provider;
pub mod rate_limit;
pub mod sanitize;

pub use cache::{CacheEntry, TtlCache};
pub use provider::{DuckDuckGoProvider, MockSearchProvider, ProviderError, SearchProvider, Snippet};
pub use rate_limit::RateLimiter;
pub use sanitize::{cache_key, sanitize_query, MAX_QUERY_CHARS};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;

/// Why a search produced no usable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorKind {
    /// Nothing left after sanitization.
    InvalidQuery,
    Timeout,
    /// Transport, HTTP status or decoding failure.
    ProviderError,
    EmptyResult,
}

impl fmt::Display for SearchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchErrorKind::InvalidQuery => "invalid query",
            SearchErrorKind::Timeout => "timeout",
            SearchErrorKind::ProviderError => "provider error",
            SearchErrorKind::EmptyResult => "empty result",
        };
        f.write_str(s)
    }
}

/// Result of one `SearchWrapper::search` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Success {
        query: String,
        text: String,
        /// Served from the cache without a provider call.
        cached: bool,
    },
    Failure {
        query: String,
        kind: SearchErrorKind,
        message: String,
    },
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SearchOutcome::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SearchOutcome::Success { text, .. } => Some(text),
            SearchOutcome::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<SearchErrorKind> {
        match self {
            SearchOutcome::Failure { kind, .. } => Some(*kind),
            SearchOutcome::Success { .. } => None,
        }
    }

    fn failure(query: &str, kind: SearchErrorKind, message: impl Into<String>) -> Self {
        SearchOutcome::Failure {
            query: query.to_string(),
            kind,
            message: message.into(),
        }
    }
}

/// Mutable search state: result cache and last-call timestamp.
///
/// Owned by one `SearchWrapper`; callers sharing the wrapper share this context.
#[derive(Debug)]
pub struct SearchContext {
    pub cache: TtlCache,
    pub limiter: RateLimiter,
}

impl SearchContext {
    pub fn new(ttl: Duration, delay: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
            limiter: RateLimiter::new(delay),
        }
    }
}

/// Renders snippets as the tool text handed to the model.
pub fn format_snippets(snippets: &[Snippet]) -> String {
    snippets
        .iter()
        .map(|s| match &s.title {
            Some(title) => format!("- {}: {}", title, s.text),
            None => format!("- {}", s.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cached, throttled access to a `SearchProvider`.
///
/// The context lock is held for the whole call, so concurrent callers are served one
/// at a time and the throttle stays process-wide for this wrapper.
///
/// **Interaction**: Used by `MovieTools` for the `search_movie_info` tool and by the
/// diagnose binary.
pub struct SearchWrapper {
    provider: Arc<dyn SearchProvider>,
    context: Mutex<SearchContext>,
    timeout: Duration,
    max_results: usize,
}

impl SearchWrapper {
    pub fn new(provider: Arc<dyn SearchProvider>, config: &SearchConfig) -> Self {
        Self {
            provider,
            context: Mutex::new(SearchContext::new(config.cache_ttl(), config.rate_limit_delay())),
            timeout: config.timeout(),
            max_results: config.max_results,
        }
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let sanitized = sanitize_query(query);
        if sanitized.is_empty() {
            warn!(query, "search query empty after sanitization");
            return SearchOutcome::failure(query, SearchErrorKind::InvalidQuery, "invalid or empty search query");
        }
        let key = cache_key(&sanitized);

        let mut ctx = self.context.lock().await;
        if let Some(text) = ctx.cache.get(&key) {
            debug!(query = %sanitized, "search cache hit");
            return SearchOutcome::Success {
                query: sanitized,
                text,
                cached: true,
            };
        }

        ctx.limiter.acquire().await;
        info!(query = %sanitized, provider = self.provider.name(), "performing search");
        let call = self.provider.search(&sanitized, self.max_results);
        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => {
                warn!(query = %sanitized, timeout_s = self.timeout.as_secs_f64(), "search timed out");
                SearchOutcome::failure(
                    &sanitized,
                    SearchErrorKind::Timeout,
                    format!("search request timed out after {:?}", self.timeout),
                )
            }
            Ok(Err(e)) => {
                warn!(query = %sanitized, error = %e, "search provider failed");
                SearchOutcome::failure(&sanitized, SearchErrorKind::ProviderError, e.to_string())
            }
            Ok(Ok(snippets)) if snippets.is_empty() => {
                debug!(query = %sanitized, "search returned no results");
                SearchOutcome::failure(&sanitized, SearchErrorKind::EmptyResult, "no results found")
            }
            Ok(Ok(snippets)) => {
                let text = format_snippets(&snippets);
                ctx.cache.insert(key, text.clone());
                SearchOutcome::Success {
                    query: sanitized,
                    text,
                    cached: false,
                }
            }
        }
    }

    /// Drops every cached result.
    pub async fn clear_cache(&self) {
        self.context.lock().await.cache.clear();
        info!("search cache cleared");
    }

    pub async fn cache_len(&self) -> usize {
        self.context.lock().await.cache.len()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SearchConfig {
        SearchConfig {
            max_results: 3,
            timeout_secs: 2,
            rate_limit_delay_secs: 1.0,
            cache_ttl_secs: 60,
        }
    }

    #[test]
    fn snippets_render_as_bullets() {
        let text = format_snippets(&[Snippet::titled("Cast", "Heath Ledger"), Snippet::new("Gary Oldman")]);
        assert_eq!(text, "- Cast: Heath Ledger\n- Gary Oldman");
    }

    #[tokio::test]
    async fn invalid_query_touches_nothing() {
        let provider = Arc::new(MockSearchProvider::always("x"));
        let wrapper = SearchWrapper::new(provider.clone(), &config());
        let out = wrapper.search(" site:imdb.com <> ").await;
        assert_eq!(out.error_kind(), Some(SearchErrorKind::InvalidQuery));
        assert_eq!(provider.calls(), 0);
        assert_eq!(wrapper.cache_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_result_is_not_cached() {
        let provider = Arc::new(MockSearchProvider::new());
        let wrapper = SearchWrapper::new(provider.clone(), &config());
        assert_eq!(wrapper.search("nothing").await.error_kind(), Some(SearchErrorKind::EmptyResult));
        assert_eq!(wrapper.search("nothing").await.error_kind(), Some(SearchErrorKind::EmptyResult));
        assert_eq!(provider.calls(), 2);
        assert_eq!(wrapper.cache_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_error_and_timeout_become_failures() {
        let provider = Arc::new(
            MockSearchProvider::always("ok")
                .with_failure("broken", ProviderError::Transport("connection refused".into()))
                .hang_on("slow"),
        );
        let wrapper = SearchWrapper::new(provider.clone(), &config());

        let out = wrapper.search("broken query").await;
        assert_eq!(out.error_kind(), Some(SearchErrorKind::ProviderError));
        let out = wrapper.search("slow query").await;
        assert_eq!(out.error_kind(), Some(SearchErrorKind::Timeout));
        assert_eq!(wrapper.cache_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cache_forces_new_call() {
        let provider = Arc::new(MockSearchProvider::always("- result"));
        let wrapper = SearchWrapper::new(provider.clone(), &config());
        assert!(wrapper.search("Heat cast").await.is_success());
        wrapper.clear_cache().await;
        assert!(wrapper.search("Heat cast").await.is_success());
        assert_eq!(provider.calls(), 2);
    }
}
