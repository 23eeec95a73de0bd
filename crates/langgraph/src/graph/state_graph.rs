//! State graph builder.
//!
//! Add nodes with `add_node`, connect them with `add_edge` (fixed) or
//! `add_conditional_edges` (routed by a function of the state), then `compile`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, Edge, DEFAULT_RECURSION_LIMIT};
use crate::graph::node::Node;

/// Virtual entry node id.
pub const START: &str = "__start__";
/// Virtual exit node id.
pub const END: &str = "__end__";

/// Routing function for a conditional edge: returns the next node id or `END`.
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// State graph: nodes plus outgoing edges. Generic over state type `S`.
///
/// Each source has at most one outgoing edge. A node without an outgoing edge ends
/// the run when it returns `Next::Continue`.
///
/// **Interaction**: Accepts `Box<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    edges: BTreeMap<String, Edge<S>>,
    duplicate: Option<String>,
    recursion_limit: usize,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: BTreeMap::new(),
            duplicate: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Adds a node; replaces any node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Box<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds a fixed edge `from → to`. Use `START` as `from` for the entry edge and
    /// `END` as `to` to finish.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.insert_edge(from.into(), Edge::Fixed(to.into()));
        self
    }

    /// Adds a conditional edge from `from`: after the node runs, `router(&state)` picks
    /// the next node. `targets` lists every id the router may return (`END` included
    /// when it can finish); other ids fail the run with `AgentError::UnknownNode`.
    pub fn add_conditional_edges<F, I, T>(
        &mut self,
        from: impl Into<String>,
        router: F,
        targets: I,
    ) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let edge = Edge::Conditional {
            router: Arc::new(router),
            targets: targets.into_iter().map(Into::into).collect(),
        };
        self.insert_edge(from.into(), edge);
        self
    }

    /// Maximum node steps per invoke (default `DEFAULT_RECURSION_LIMIT`).
    pub fn with_recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    fn insert_edge(&mut self, from: String, edge: Edge<S>) {
        if self.edges.contains_key(&from) && self.duplicate.is_none() {
            self.duplicate = Some(from.clone());
        }
        self.edges.insert(from, edge);
    }

    /// Builds the executable graph.
    ///
    /// Fails when a node uses a reserved id, no edge leaves `START`, a source got two
    /// outgoing edges, or any edge endpoint is not a registered node.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        for id in self.nodes.keys() {
            if id == START || id == END {
                return Err(CompilationError::ReservedId(id.clone()));
            }
        }
        if let Some(from) = self.duplicate {
            return Err(CompilationError::DuplicateEdge(from));
        }
        if !self.edges.contains_key(START) {
            return Err(CompilationError::MissingEntry);
        }
        let known = |id: &str| id == END || self.nodes.contains_key(id);
        for (from, edge) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            let targets: Vec<&String> = match edge {
                Edge::Fixed(to) => vec![to],
                Edge::Conditional { targets, .. } => targets.iter().collect(),
            };
            if let Some(missing) = targets.into_iter().find(|t| !known(t)) {
                return Err(CompilationError::NodeNotFound(missing.clone()));
            }
        }
        Ok(CompiledStateGraph {
            nodes: self.nodes,
            edges: self.edges,
            recursion_limit: self.recursion_limit,
        })
    }
}
