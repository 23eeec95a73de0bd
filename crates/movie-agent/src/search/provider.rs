//! Search providers: the external service behind `SearchWrapper`.
//!
//! - `DuckDuckGoProvider`: DuckDuckGo instant-answer JSON API, no key required
//! - `MockSearchProvider`: scripted replies for tests and offline diagnostics

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub const DUCKDUCKGO_API_URL: &str = "https://api.duckduckgo.com/";

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub title: Option<String>,
    pub text: String,
}

impl Snippet {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            title: None,
            text: text.into(),
        }
    }

    pub fn titled(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            text: text.into(),
        }
    }
}

/// Transport or decoding failure reported by a provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("unreadable response: {0}")]
    Decode(String),
}

/// Plain-text query in, ranked snippets out.
///
/// **Interaction**: Called by `SearchWrapper::search` under the search timeout, after
/// the rate limiter.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// At most `max_results` snippets, best first. An empty list is not an error here.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>, ProviderError>;
}

/// DuckDuckGo instant-answer provider.
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    /// Client with a transport timeout; the wrapper enforces its own timeout too.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        Self::with_endpoint(DUCKDUCKGO_API_URL, timeout)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "Answer")]
    answer: String,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Topics")]
    topics: Vec<RelatedTopic>,
}

fn collect_topics(topics: &[RelatedTopic], group: Option<&str>, out: &mut Vec<Snippet>) {
    for topic in topics {
        if let Some(text) = topic.text.as_deref().filter(|t| !t.trim().is_empty()) {
            out.push(Snippet {
                title: group.map(str::to_string),
                text: text.trim().to_string(),
            });
        }
        if !topic.topics.is_empty() {
            collect_topics(&topic.topics, topic.name.as_deref(), out);
        }
    }
}

impl InstantAnswer {
    fn into_snippets(self, max_results: usize) -> Vec<Snippet> {
        let mut out = Vec::new();
        if !self.answer.trim().is_empty() {
            out.push(Snippet::new(self.answer.trim()));
        }
        if !self.abstract_text.trim().is_empty() {
            let title = Some(self.heading.trim().to_string()).filter(|h| !h.is_empty());
            out.push(Snippet {
                title,
                text: self.abstract_text.trim().to_string(),
            });
        }
        collect_topics(&self.related_topics, None, &mut out);
        out.truncate(max_results);
        out
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>, ProviderError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let answer: InstantAnswer =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(answer.into_snippets(max_results))
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(Vec<Snippet>),
    Fail(ProviderError),
    Hang,
}

/// Scripted provider: the first rule whose pattern occurs in the (lowercased) query
/// decides the reply; without a match it returns the fallback snippets.
#[derive(Debug, Default)]
pub struct MockSearchProvider {
    rules: Vec<(String, Scripted)>,
    fallback: Vec<Snippet>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies `text` for every query.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            fallback: vec![Snippet::new(text)],
            ..Self::default()
        }
    }

    pub fn with_reply(mut self, pattern: &str, snippets: Vec<Snippet>) -> Self {
        self.rules.push((pattern.to_lowercase(), Scripted::Reply(snippets)));
        self
    }

    pub fn with_failure(mut self, pattern: &str, error: ProviderError) -> Self {
        self.rules.push((pattern.to_lowercase(), Scripted::Fail(error)));
        self
    }

    /// Queries matching `pattern` never complete.
    pub fn hang_on(mut self, pattern: &str) -> Self {
        self.rules.push((pattern.to_lowercase(), Scripted::Hang));
        self
    }

    pub fn with_fallback(mut self, snippets: Vec<Snippet>) -> Self {
        self.fallback = snippets;
        self
    }

    /// Number of `search` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut q) = self.queries.lock() {
            q.push(query.to_string());
        }
        let lower = query.to_lowercase();
        let rule = self
            .rules
            .iter()
            .find(|(pattern, _)| lower.contains(pattern.as_str()))
            .map(|(_, r)| r.clone());
        match rule {
            Some(Scripted::Reply(mut snippets)) => {
                snippets.truncate(max_results);
                Ok(snippets)
            }
            Some(Scripted::Fail(e)) => Err(e),
            Some(Scripted::Hang) => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
            None => Ok(self.fallback.iter().take(max_results).cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_answer_collects_abstract_and_nested_topics() {
        let body = serde_json::json!({
            "Heading": "The Dark Knight",
            "AbstractText": "2008 superhero film directed by Christopher Nolan.",
            "Answer": "",
            "RelatedTopics": [
                { "Text": "Christian Bale - English actor" },
                { "Name": "Cast", "Topics": [ { "Text": "Heath Ledger - Australian actor" } ] },
                { "Text": "   " }
            ]
        });
        let answer: InstantAnswer = serde_json::from_value(body).unwrap();
        let snippets = answer.into_snippets(10);
        assert_eq!(snippets.len(), 3);
        assert_eq!(snippets[0].title.as_deref(), Some("The Dark Knight"));
        assert_eq!(snippets[1], Snippet::new("Christian Bale - English actor"));
        assert_eq!(snippets[2], Snippet::titled("Cast", "Heath Ledger - Australian actor"));
    }

    #[test]
    fn instant_answer_respects_max_results_and_missing_fields() {
        let answer: InstantAnswer = serde_json::from_value(serde_json::json!({
            "RelatedTopics": [ { "Text": "a" }, { "Text": "b" }, { "Text": "c" } ]
        }))
        .unwrap();
        assert_eq!(answer.into_snippets(2).len(), 2);

        let empty: InstantAnswer = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.into_snippets(10).is_empty());
    }

    #[tokio::test]
    async fn mock_matches_rules_in_order() {
        let mock = MockSearchProvider::always("fallback")
            .with_reply("bale", vec![Snippet::new("Batman Begins")])
            .with_failure("ledger", ProviderError::Status(503));
        assert_eq!(mock.search("Christian Bale films", 5).await.unwrap()[0].text, "Batman Begins");
        assert_eq!(mock.search("Heath Ledger films", 5).await, Err(ProviderError::Status(503)));
        assert_eq!(mock.search("Inception", 5).await.unwrap()[0].text, "fallback");
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.queries()[2], "Inception");
    }
}
