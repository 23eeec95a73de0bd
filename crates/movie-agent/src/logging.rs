//! Logging setup for the binaries.
//!
//! Logs go to stderr so stdout carries only the report. `RUST_LOG` overrides the
//! level from `AGENT_LOG_LEVEL`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AgentConfig;

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(config: &AgentConfig) -> String {
    let level = config.tracing_level();
    format!("movie_agent={level},langgraph={level}")
}

/// Installs the global subscriber. Does nothing when logging is disabled or a
/// subscriber is already installed.
pub fn init(config: &AgentConfig) {
    if !config.enable_logging {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_uses_agent_level() {
        let mut config = AgentConfig::default();
        assert_eq!(default_directive(&config), "movie_agent=info,langgraph=info");
        config.log_level = "WARNING".into();
        assert_eq!(default_directive(&config), "movie_agent=warn,langgraph=warn");
    }
}
