//! Movie analysis agent: finds a movie's lead cast and each lead actor's recent films
//! with a local language model and web search.
//!
//! - `config`: settings from the environment
//! - `search`: sanitized, cached, rate-limited web search
//! - `calculator`: restricted arithmetic evaluator
//! - `tools`: the tool set offered to the model
//! - `analysis`: the two-pass orchestrator, answer parsers and report

pub mod analysis;
pub mod calculator;
pub mod config;
pub mod logging;
pub mod search;
pub mod tools;

pub use analysis::{
    format_report, AgentInfo, AnalysisError, AnalysisResult, CastMember, Filmography, FilmographyStatus,
    MovieAnalysisAgent,
};
pub use calculator::{evaluate, EvalError};
pub use config::{AgentConfig, ConfigError, ModelConfig, SearchConfig, Settings};
pub use search::{
    DuckDuckGoProvider, MockSearchProvider, SearchErrorKind, SearchOutcome, SearchProvider, SearchWrapper,
};
pub use tools::{MovieTools, ToolId};

use langgraph::{ChatOllama, LlmError, OllamaConfig};

/// Ollama client configured from the model settings.
pub fn ollama_client(config: &ModelConfig) -> Result<ChatOllama, LlmError> {
    let mut ollama = OllamaConfig::new(config.name.clone());
    ollama.base_url = config.base_url.clone();
    ollama.temperature = config.temperature;
    ollama.timeout = config.timeout();
    ollama.max_tokens = config.max_tokens;
    ChatOllama::new(ollama)
}
