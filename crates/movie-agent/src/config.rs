//! Settings: model, search and agent options read from the environment.
//!
//! **Interaction**: The binaries call `dotenv::dotenv().ok()`, then `Settings::load()`
//! and `Settings::validate()` before building any client. Tests use
//! `Settings::from_lookup` with a map instead of the process environment.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MODEL_NAME: &str = "mistral";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

const LOG_LEVELS: [&str; 7] = ["TRACE", "DEBUG", "INFO", "WARN", "WARNING", "ERROR", "CRITICAL"];

/// Largest accepted `AGENT_MAX_ITERATIONS`.
pub const MAX_ITERATIONS: usize = 1000;
/// Largest accepted `SEARCH_RATE_LIMIT_DELAY`, in seconds.
pub const MAX_RATE_LIMIT_DELAY_SECS: f64 = 60.0;

/// Invalid or unparsable settings. Fatal at startup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// An environment value could not be converted to the field's type.
    #[error("{key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    /// A parsed value lies outside its allowed range.
    #[error("{key} {reason} (got {value})")]
    OutOfRange {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Language model options.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub base_url: String,
    pub max_tokens: Option<u32>,
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            temperature: 0.1,
            timeout_secs: 30,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: None,
        }
    }
}

/// Search wrapper options.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub max_results: usize,
    pub timeout_secs: u64,
    /// Minimum seconds between two provider calls.
    pub rate_limit_delay_secs: f64,
    /// Seconds a cached result stays valid; 0 disables caching.
    pub cache_ttl_secs: i64,
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Zero for negative or non-finite values, which `validate` rejects.
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.rate_limit_delay_secs).unwrap_or(Duration::ZERO)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.max(0) as u64)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout_secs: 10,
            rate_limit_delay_secs: 1.0,
            cache_ttl_secs: 3600,
        }
    }
}

/// Agent behaviour options.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Model invocations allowed per conversation run.
    pub max_iterations: usize,
    pub enable_logging: bool,
    pub log_level: String,
    /// Write the conversation graph as Mermaid text to `graph.mmd`.
    pub graph_visualization: bool,
    /// Films kept per actor.
    pub max_films: usize,
}

impl AgentConfig {
    /// `log_level` as a `tracing` directive (`WARNING` → `warn`, `CRITICAL` → `error`).
    pub fn tracing_level(&self) -> &'static str {
        match self.log_level.trim().to_ascii_uppercase().as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "WARN" | "WARNING" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            enable_logging: true,
            log_level: "INFO".to_string(),
            graph_visualization: true,
            max_films: 5,
        }
    }
}

/// Immutable settings snapshot, built once per process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub model: ModelConfig,
    pub search: SearchConfig,
    pub agent: AgentConfig,
}

impl Settings {
    /// Reads the process environment. Does not validate ranges; call `validate`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; absent or blank keys take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let d = Settings::default();

        let model = ModelConfig {
            name: get("MODEL_NAME").unwrap_or(d.model.name),
            temperature: parse(&get, "MODEL_TEMPERATURE", d.model.temperature)?,
            timeout_secs: parse(&get, "MODEL_TIMEOUT", d.model.timeout_secs)?,
            base_url: get("MODEL_BASE_URL").unwrap_or(d.model.base_url),
            max_tokens: match get("MODEL_MAX_TOKENS") {
                Some(raw) => Some(convert("MODEL_MAX_TOKENS", &raw)?),
                None => None,
            },
        };
        let search = SearchConfig {
            max_results: parse(&get, "SEARCH_MAX_RESULTS", d.search.max_results)?,
            timeout_secs: parse(&get, "SEARCH_TIMEOUT", d.search.timeout_secs)?,
            rate_limit_delay_secs: parse(&get, "SEARCH_RATE_LIMIT_DELAY", d.search.rate_limit_delay_secs)?,
            cache_ttl_secs: parse(&get, "SEARCH_CACHE_TTL", d.search.cache_ttl_secs)?,
        };
        let agent = AgentConfig {
            max_iterations: parse(&get, "AGENT_MAX_ITERATIONS", d.agent.max_iterations)?,
            enable_logging: parse_bool(&get, "AGENT_ENABLE_LOGGING", d.agent.enable_logging)?,
            log_level: get("AGENT_LOG_LEVEL").unwrap_or(d.agent.log_level),
            graph_visualization: parse_bool(&get, "AGENT_GRAPH_VISUALIZATION", d.agent.graph_visualization)?,
            max_films: parse(&get, "AGENT_MAX_FILMS", d.agent.max_films)?,
        };
        Ok(Self { model, search, agent })
    }

    /// Checks every range and enumeration; the first violation is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.model;
        if m.name.trim().is_empty() {
            return out_of_range("MODEL_NAME", &m.name, "must not be empty");
        }
        if !(0.0..=2.0).contains(&m.temperature) {
            return out_of_range("MODEL_TEMPERATURE", m.temperature, "must be between 0 and 2");
        }
        if m.timeout_secs == 0 {
            return out_of_range("MODEL_TIMEOUT", m.timeout_secs, "must be positive");
        }
        if !(m.base_url.starts_with("http://") || m.base_url.starts_with("https://")) {
            return out_of_range("MODEL_BASE_URL", &m.base_url, "must start with http:// or https://");
        }
        if m.max_tokens == Some(0) {
            return out_of_range("MODEL_MAX_TOKENS", 0, "must be positive");
        }

        let s = &self.search;
        if !(1..=50).contains(&s.max_results) {
            return out_of_range("SEARCH_MAX_RESULTS", s.max_results, "must be between 1 and 50");
        }
        if s.timeout_secs == 0 {
            return out_of_range("SEARCH_TIMEOUT", s.timeout_secs, "must be positive");
        }
        if !(0.0..=MAX_RATE_LIMIT_DELAY_SECS).contains(&s.rate_limit_delay_secs) {
            return out_of_range(
                "SEARCH_RATE_LIMIT_DELAY",
                s.rate_limit_delay_secs,
                "must be between 0 and 60 seconds",
            );
        }
        if s.cache_ttl_secs < 0 {
            return out_of_range("SEARCH_CACHE_TTL", s.cache_ttl_secs, "must not be negative");
        }

        let a = &self.agent;
        if !(1..=MAX_ITERATIONS).contains(&a.max_iterations) {
            return out_of_range("AGENT_MAX_ITERATIONS", a.max_iterations, "must be between 1 and 1000");
        }
        if a.max_films == 0 {
            return out_of_range("AGENT_MAX_FILMS", 0, "must be at least 1");
        }
        let level = a.log_level.trim().to_ascii_uppercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return out_of_range(
                "AGENT_LOG_LEVEL",
                &a.log_level,
                "must be one of TRACE, DEBUG, INFO, WARN, WARNING, ERROR, CRITICAL",
            );
        }
        Ok(())
    }

    /// `load` followed by `validate`.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let settings = Self::load()?;
        settings.validate()?;
        Ok(settings)
    }
}

fn convert<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => convert(key, &raw),
        None => Ok(default),
    }
}

fn parse_bool<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a boolean (true/false, 1/0, yes/no, on/off)".into(),
        }),
    }
}

fn out_of_range(key: &'static str, value: impl Display, reason: &'static str) -> Result<(), ConfigError> {
    Err(ConfigError::OutOfRange {
        key,
        value: value.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_for_absent_keys() {
        let s = settings_from(&[]).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.model.name, "mistral");
        assert_eq!(s.search.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(s.search.rate_limit_delay(), Duration::from_secs(1));
        assert_eq!(s.agent.max_iterations, 10);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn values_are_coerced() {
        let s = settings_from(&[
            ("MODEL_NAME", "llama3"),
            ("MODEL_TEMPERATURE", "0.7"),
            ("MODEL_MAX_TOKENS", "512"),
            ("SEARCH_RATE_LIMIT_DELAY", "0.25"),
            ("AGENT_ENABLE_LOGGING", "off"),
            ("AGENT_GRAPH_VISUALIZATION", "YES"),
        ])
        .unwrap();
        assert_eq!(s.model.name, "llama3");
        assert!((s.model.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(s.model.max_tokens, Some(512));
        assert_eq!(s.search.rate_limit_delay(), Duration::from_millis(250));
        assert!(!s.agent.enable_logging);
        assert!(s.agent.graph_visualization);
    }

    #[test]
    fn blank_value_takes_default() {
        let s = settings_from(&[("MODEL_TEMPERATURE", "  ")]).unwrap();
        assert!((s.model.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn unparsable_values_fail_at_load() {
        let e = settings_from(&[("MODEL_TEMPERATURE", "hot")]).unwrap_err();
        assert!(matches!(e, ConfigError::Invalid { key: "MODEL_TEMPERATURE", .. }));
        let e = settings_from(&[("AGENT_ENABLE_LOGGING", "maybe")]).unwrap_err();
        assert!(matches!(e, ConfigError::Invalid { key: "AGENT_ENABLE_LOGGING", .. }));
        let e = settings_from(&[("SEARCH_MAX_RESULTS", "-3")]).unwrap_err();
        assert!(matches!(e, ConfigError::Invalid { key: "SEARCH_MAX_RESULTS", .. }));
    }

    #[test]
    fn temperature_above_two_is_rejected() {
        let s = settings_from(&[("MODEL_TEMPERATURE", "3.0")]).unwrap();
        let e = s.validate().unwrap_err();
        assert!(matches!(e, ConfigError::OutOfRange { key: "MODEL_TEMPERATURE", .. }));
        assert!(e.to_string().contains("between 0 and 2"));
    }

    #[test]
    fn range_checks() {
        for (key, value) in [
            ("SEARCH_CACHE_TTL", "-1"),
            ("SEARCH_RATE_LIMIT_DELAY", "-0.5"),
            ("SEARCH_RATE_LIMIT_DELAY", "NaN"),
            ("SEARCH_MAX_RESULTS", "0"),
            ("SEARCH_MAX_RESULTS", "51"),
            ("SEARCH_TIMEOUT", "0"),
            ("MODEL_TIMEOUT", "0"),
            ("MODEL_BASE_URL", "localhost:11434"),
            ("SEARCH_RATE_LIMIT_DELAY", "1e20"),
            ("SEARCH_RATE_LIMIT_DELAY", "inf"),
            ("AGENT_MAX_ITERATIONS", "0"),
            ("AGENT_MAX_ITERATIONS", "1001"),
            ("AGENT_MAX_ITERATIONS", "18446744073709551615"),
            ("AGENT_MAX_FILMS", "0"),
            ("AGENT_LOG_LEVEL", "VERBOSE"),
        ] {
            let s = settings_from(&[(key, value)]).unwrap();
            match s.validate() {
                Err(ConfigError::OutOfRange { key: k, .. }) => assert_eq!(k, key, "{}={}", key, value),
                other => panic!("{}={} should be out of range, got {:?}", key, value, other),
            }
        }
    }

    #[test]
    fn upper_bounds_are_inclusive() {
        let s = settings_from(&[("AGENT_MAX_ITERATIONS", "1000"), ("SEARCH_RATE_LIMIT_DELAY", "60")]).unwrap();
        assert!(s.validate().is_ok());
        assert_eq!(s.search.rate_limit_delay(), Duration::from_secs(60));
    }

    #[test]
    fn graph_visualization_on_by_default() {
        assert!(settings_from(&[]).unwrap().agent.graph_visualization);
        let s = settings_from(&[("AGENT_GRAPH_VISUALIZATION", "false")]).unwrap();
        assert!(!s.agent.graph_visualization);
    }

    #[test]
    fn log_levels_map_to_tracing() {
        let mut a = AgentConfig::default();
        for (level, directive) in [("warning", "warn"), ("CRITICAL", "error"), ("Debug", "debug"), ("INFO", "info")] {
            a.log_level = level.to_string();
            assert_eq!(a.tracing_level(), directive);
        }
        let s = settings_from(&[("AGENT_LOG_LEVEL", "warning")]).unwrap();
        assert!(s.validate().is_ok());
    }
}
