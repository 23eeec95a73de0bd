//! Movie analysis: a cast pass, then one filmography pass per actor.
//!
//! Each pass is a fresh `ReactAgent` run. Failures of a single actor's pass are
//! recorded in the result; only an unusable cast pass fails the analysis.

mod parse;
mod prompts;
mod report;
mod result;

pub use parse::{parse_cast, parse_films, CastParse, ParseError};
pub use prompts::{cast_prompt, filmography_prompt, SYSTEM_PROMPT};
pub use report::format_report;
pub use result::{AgentInfo, AnalysisResult, CastMember, Filmography, FilmographyStatus};

use std::sync::Arc;

use langgraph::{AgentError, ConversationState, LlmClient, ReactAgent, ToolSource};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;

/// Why an analysis produced no result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Please provide a valid movie name.")]
    EmptyTitle,
    /// The cast answer held no character/actor pair.
    #[error("no lead cast found for {title:?} ({} unparsed line(s))", .failures.len())]
    NoCastFound {
        title: String,
        answer: String,
        failures: Vec<ParseError>,
    },
    /// The cast run failed or stopped without an answer.
    #[error("cast lookup for {title:?} failed: {reason}")]
    CastRunFailed { title: String, reason: String },
}

/// Two-pass movie analysis over one conversation graph.
///
/// **Interaction**: Built by the `movie-agent` binary from `Settings`, an
/// `LlmClient` and a `ToolSource` (usually `MovieTools`).
pub struct MovieAnalysisAgent {
    agent: ReactAgent,
    model: String,
    temperature: f32,
    max_films: usize,
}

impl MovieAnalysisAgent {
    pub async fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolSource>,
        settings: &Settings,
    ) -> Result<Self, AgentError> {
        let model = llm.model_name().to_string();
        let agent = ReactAgent::new(llm, tools, settings.agent.max_iterations).await?;
        info!(model = %model, tools = agent.tools().len(), "movie analysis agent ready");
        Ok(Self {
            agent,
            model,
            temperature: settings.model.temperature,
            max_films: settings.agent.max_films,
        })
    }

    pub fn info(&self) -> AgentInfo {
        AgentInfo {
            model: self.model.clone(),
            temperature: self.temperature,
            tools: self.agent.tools().iter().map(|t| t.name.clone()).collect(),
        }
    }

    /// Mermaid text of the conversation graph.
    pub fn graph_mermaid(&self) -> String {
        self.agent.graph().draw_mermaid()
    }

    pub async fn analyze(&self, title: &str) -> Result<AnalysisResult, AnalysisError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AnalysisError::EmptyTitle);
        }
        info!(title, "starting analysis");

        let cast_failed = |reason: String| AnalysisError::CastRunFailed {
            title: title.to_string(),
            reason,
        };
        let state = self
            .agent
            .run(SYSTEM_PROMPT, cast_prompt(title))
            .await
            .map_err(|e| cast_failed(e.to_string()))?;
        let Some(answer) = state.final_answer() else {
            return Err(cast_failed(self.no_answer_reason(&state)));
        };

        let parsed = parse_cast(answer);
        for failure in &parsed.failures {
            debug!(line_no = failure.line_no, line = %failure.line, reason = %failure.reason, "unparsed cast line");
        }
        if parsed.cast.is_empty() {
            warn!(title, unparsed = parsed.failures.len(), "no lead cast found");
            return Err(AnalysisError::NoCastFound {
                title: title.to_string(),
                answer: answer.to_string(),
                failures: parsed.failures,
            });
        }
        info!(title, cast = parsed.cast.len(), "lead cast identified");

        let mut filmographies = Vec::new();
        for actor in parsed.actors() {
            filmographies.push(self.filmography(&actor).await);
        }

        let result = AnalysisResult {
            title: title.to_string(),
            cast: parsed.cast,
            filmographies,
            parse_failures: parsed.failures,
        };
        info!(
            title,
            actors = result.filmographies.len(),
            failed = result.failed_actors().count(),
            "analysis completed"
        );
        Ok(result)
    }

    /// One actor's pass. Never fails: problems become `FilmographyStatus::Failed`.
    async fn filmography(&self, actor: &str) -> Filmography {
        let state = match self
            .agent
            .run(SYSTEM_PROMPT, filmography_prompt(actor, self.max_films))
            .await
        {
            Ok(state) => state,
            Err(e) => {
                warn!(actor, error = %e, "filmography run failed");
                return Filmography::failed(actor, format!("model error: {}", e));
            }
        };

        let films = state
            .final_answer()
            .map(|a| parse_films(a, self.max_films))
            .unwrap_or_default();
        if !films.is_empty() {
            debug!(actor, films = films.len(), "filmography found");
            return Filmography::found(actor, films);
        }

        let reason = if state.final_answer().is_none() {
            self.no_answer_reason(&state)
        } else {
            let tool_errors = tool_failures(&state);
            if tool_errors.is_empty() {
                "no films found in the model's answer".to_string()
            } else {
                format!("no films found; tool failures: {}", tool_errors.join("; "))
            }
        };
        warn!(actor, reason = %reason, "filmography unavailable");
        Filmography::failed(actor, reason)
    }

    fn no_answer_reason(&self, state: &ConversationState) -> String {
        if state.hit_iteration_limit() {
            format!(
                "iteration limit exceeded after {} model calls",
                self.agent.max_iterations()
            )
        } else {
            "the model gave no final answer".to_string()
        }
    }
}

fn tool_failures(state: &ConversationState) -> Vec<String> {
    state
        .tool_results()
        .filter(|r| !r.success)
        .map(|r| format!("{}: {}", r.name, r.error.as_deref().unwrap_or("failed")))
        .collect()
}
