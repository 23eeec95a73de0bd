//! Tool registry: the search wrapper and the calculator exposed to the model.
//!
//! Dispatch goes through the closed `ToolId` enumeration; a name outside it is
//! `ToolSourceError::NotFound`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use langgraph::{check_arguments, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::calculator::{evaluate, format_number};
use crate::search::{SearchOutcome, SearchWrapper};

/// Every tool the agent can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    SearchMovieInfo,
    Calculator,
}

impl ToolId {
    pub const ALL: [ToolId; 2] = [ToolId::SearchMovieInfo, ToolId::Calculator];

    pub fn name(self) -> &'static str {
        match self {
            ToolId::SearchMovieInfo => "search_movie_info",
            ToolId::Calculator => "calculator",
        }
    }

    /// The single string argument each tool takes.
    pub fn argument(self) -> &'static str {
        match self {
            ToolId::SearchMovieInfo => "query",
            ToolId::Calculator => "expression",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ToolId::SearchMovieInfo => {
                "Search the web for movie information: cast, characters, and actor \
                 filmographies. Use it to find the lead characters of a movie and the \
                 latest films of an actor."
            }
            ToolId::Calculator => {
                "Evaluate an arithmetic expression with numbers, + - * / and parentheses. \
                 Names and functions are not supported."
            }
        }
    }

    fn argument_description(self) -> &'static str {
        match self {
            ToolId::SearchMovieInfo => "Plain-text search query, e.g. \"The Dark Knight cast\"",
            ToolId::Calculator => "Arithmetic expression, e.g. \"(2008 - 1974) * 2\"",
        }
    }

    pub fn spec(self) -> ToolSpec {
        let arg = self.argument();
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    arg: { "type": "string", "description": self.argument_description() }
                },
                "required": [arg]
            }),
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolId {
    type Err = ToolSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolId::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ToolSourceError::NotFound(s.to_string()))
    }
}

/// Pulls the tool's string argument out of the call arguments.
///
/// Accepts a bare JSON string (models sometimes skip the object); anything else must
/// satisfy the tool's declared schema.
fn string_argument(tool: ToolId, arguments: &Value) -> Result<String, ToolSourceError> {
    if let Value::String(s) = arguments {
        return Ok(s.clone());
    }
    check_arguments(&tool.spec(), arguments)?;
    arguments
        .get(tool.argument())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ToolSourceError::InvalidInput(format!("{}: missing required field: {}", tool, tool.argument()))
        })
}

/// The agent's tool set.
///
/// **Interaction**: Implements `langgraph::ToolSource`; `ToolNode` calls it, the
/// orchestrator and the diagnose binary build it.
pub struct MovieTools {
    search: Arc<SearchWrapper>,
}

impl MovieTools {
    pub fn new(search: Arc<SearchWrapper>) -> Self {
        Self { search }
    }

    pub fn search(&self) -> &Arc<SearchWrapper> {
        &self.search
    }

    pub fn specs() -> Vec<ToolSpec> {
        ToolId::ALL.into_iter().map(ToolId::spec).collect()
    }

    pub fn names() -> Vec<&'static str> {
        ToolId::ALL.into_iter().map(ToolId::name).collect()
    }

    /// Runs one tool with its already extracted argument.
    pub async fn dispatch(&self, tool: ToolId, argument: &str) -> Result<String, ToolSourceError> {
        match tool {
            ToolId::SearchMovieInfo => match self.search.search(argument).await {
                SearchOutcome::Success { text, .. } => Ok(text),
                SearchOutcome::Failure { kind, message, .. } => Err(ToolSourceError::Execution(format!(
                    "search failed ({}): {}",
                    kind, message
                ))),
            },
            ToolId::Calculator => {
                info!(expression = argument, "calculating");
                let value = evaluate(argument).map_err(|e| {
                    ToolSourceError::Execution(format!("invalid mathematical expression: {}", e))
                })?;
                Ok(format_number(value))
            }
        }
    }
}

#[async_trait]
impl ToolSource for MovieTools {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(Self::specs())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        let tool: ToolId = name.parse()?;
        let argument = string_argument(tool, &arguments)?;
        debug!(tool = %tool, argument = %argument, "dispatching tool");
        let text = self.dispatch(tool, &argument).await?;
        Ok(ToolCallContent { text })
    }
}
