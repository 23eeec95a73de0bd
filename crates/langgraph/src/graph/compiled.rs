//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile`. One compiled graph can serve many independent
//! runs; each `invoke` owns its state.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use tracing::debug;

use crate::error::AgentError;

use super::state_graph::{Router, END, START};
use super::Next;
use super::Node;

/// Default maximum number of node steps per `invoke`.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Outgoing edge of a node.
pub(super) enum Edge<S> {
    Fixed(String),
    Conditional {
        router: Router<S>,
        targets: Vec<String>,
    },
}

/// Compiled graph: immutable structure, supports invoke only.
///
/// Runs from the `START` edge; after each node uses its returned `Next` (and the
/// node's outgoing edge for `Next::Continue`) to pick the next node until `END`.
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Box<dyn Node<S>>>,
    pub(super) edges: BTreeMap<String, Edge<S>>,
    pub(super) recursion_limit: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Runs the graph with the given state and returns the final state.
    ///
    /// Returns `AgentError::RecursionLimit` when more than `recursion_limit` node steps
    /// would run, and propagates node errors unchanged.
    pub async fn invoke(&self, state: S) -> Result<S, AgentError> {
        let mut state = state;
        let mut current = self.follow(START, &state)?;
        let mut steps = 0usize;

        while current != END {
            if steps >= self.recursion_limit {
                return Err(AgentError::RecursionLimit(self.recursion_limit));
            }
            steps += 1;
            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| AgentError::UnknownNode(current.clone()))?;
            debug!(node = %current, step = steps, "running node");
            let (new_state, next) = node.run(state).await?;
            state = new_state;

            current = match next {
                Next::End => END.to_string(),
                Next::Node(id) => id,
                Next::Continue => self.follow(&current, &state)?,
            };
        }
        debug!(steps, "graph finished");
        Ok(state)
    }

    /// Resolves the outgoing edge of `from`; no edge means `END`.
    fn follow(&self, from: &str, state: &S) -> Result<String, AgentError> {
        match self.edges.get(from) {
            None => Ok(END.to_string()),
            Some(Edge::Fixed(to)) => Ok(to.clone()),
            Some(Edge::Conditional { router, targets }) => {
                let to = router(state);
                if to == END || targets.iter().any(|t| t == &to) {
                    debug!(from, to = %to, "conditional edge");
                    Ok(to)
                } else {
                    Err(AgentError::UnknownNode(to))
                }
            }
        }
    }

    /// Maximum node steps per invoke.
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Renders the graph as a Mermaid flowchart. Conditional edges are dotted.
    pub fn draw_mermaid(&self) -> String {
        let mut out = String::from("graph TD;\n");
        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort();
        let _ = writeln!(out, "    {START}([START]);");
        for id in ids {
            let _ = writeln!(out, "    {id}({id});");
        }
        let _ = writeln!(out, "    {END}([END]);");
        for (from, edge) in &self.edges {
            match edge {
                Edge::Fixed(to) => {
                    let _ = writeln!(out, "    {from} --> {to};");
                }
                Edge::Conditional { targets, .. } => {
                    for to in targets {
                        let _ = writeln!(out, "    {from} -.-> {to};");
                    }
                }
            }
        }
        out
    }
}
