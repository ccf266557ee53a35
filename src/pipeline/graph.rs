//! Build-time wiring of stages into a single linear chain.
//!
//! Stages are registered by name and connected with explicit edges between the `START` and
//! `END` sentinels. [`PipelineBuilder::compile`] checks that the edges describe exactly one path
//! through every registered stage and freezes the result into an ordered [`Pipeline`].

use crate::pipeline::stage::Stage;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Entry sentinel; the first edge must leave from here.
pub const START: &str = "__start__";
/// Exit sentinel; the last edge must arrive here.
pub const END: &str = "__end__";

/// Reasons a set of stages and edges cannot be compiled into a chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// Two stages were registered under the same name.
    #[error("Stage '{0}' registered more than once")]
    DuplicateStage(String),
    /// A stage tried to use a sentinel name.
    #[error("Stage name '{0}' is reserved")]
    ReservedName(String),
    /// An edge mentions a name that is neither a stage nor a valid sentinel for its position.
    #[error("Edge {from} -> {to} references unknown stage '{unknown}'")]
    UnknownStage {
        /// Edge source.
        from: String,
        /// Edge target.
        to: String,
        /// The name that could not be resolved.
        unknown: String,
    },
    /// A node has more than one outgoing edge.
    #[error("Node '{0}' has more than one outgoing edge")]
    Branching(String),
    /// A node has more than one incoming edge.
    #[error("Node '{0}' has more than one incoming edge")]
    Merging(String),
    /// No edge leaves `START`.
    #[error("No edge leaves the start node")]
    MissingEntry,
    /// The chain stops at a stage with no outgoing edge.
    #[error("Stage '{0}' has no outgoing edge; the chain never reaches the end node")]
    DeadEnd(String),
    /// Following the edges revisits a stage.
    #[error("Edges form a cycle through stage '{0}'")]
    Cycle(String),
    /// A registered stage is not on the chain from `START` to `END`.
    #[error("Stage '{0}' is not reachable from the start node")]
    Unreachable(String),
}

/// Collects stages and edges before compilation.
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
    edges: Vec<(String, String)>,
}

/// Compiled, immutable chain of stages in execution order.
pub struct Pipeline {
    pub(crate) stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    /// Start an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage under its own name.
    pub fn add_stage<S>(mut self, stage: S) -> Self
    where
        S: Stage + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    /// Register an already boxed stage.
    pub fn add_boxed_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Declare a directed edge between two node names.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Register `stages` and connect them `START -> s1 -> ... -> sN -> END` in the given order.
    pub fn linear<I>(stages: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Stage>>,
    {
        let mut builder = Self::new();
        let mut previous = START.to_string();
        for stage in stages {
            let name = stage.name().to_string();
            builder = builder.add_boxed_stage(stage).add_edge(previous, name.clone());
            previous = name;
        }
        builder.add_edge(previous, END)
    }

    /// Validate the graph and freeze it into an ordered [`Pipeline`].
    pub fn compile(self) -> Result<Pipeline, CompilationError> {
        let Self { stages, edges } = self;

        let mut registered: HashMap<String, Box<dyn Stage>> = HashMap::new();
        for stage in stages {
            let name = stage.name().to_string();
            if name == START || name == END {
                return Err(CompilationError::ReservedName(name));
            }
            if registered.contains_key(&name) {
                return Err(CompilationError::DuplicateStage(name));
            }
            registered.insert(name, stage);
        }

        let mut outgoing: HashMap<&str, &str> = HashMap::new();
        let mut incoming: HashSet<&str> = HashSet::new();
        for (from, to) in &edges {
            let unknown = |name: &str| CompilationError::UnknownStage {
                from: from.clone(),
                to: to.clone(),
                unknown: name.to_string(),
            };
            if from != START && !registered.contains_key(from) {
                return Err(unknown(from.as_str()));
            }
            if to != END && !registered.contains_key(to) {
                return Err(unknown(to.as_str()));
            }
            if outgoing.insert(from.as_str(), to.as_str()).is_some() {
                return Err(CompilationError::Branching(from.clone()));
            }
            if !incoming.insert(to.as_str()) {
                return Err(CompilationError::Merging(to.clone()));
            }
        }

        let mut order: Vec<String> = Vec::with_capacity(registered.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = START;
        loop {
            let Some(&next) = outgoing.get(current) else {
                return Err(if current == START {
                    CompilationError::MissingEntry
                } else {
                    CompilationError::DeadEnd(current.to_string())
                });
            };
            if next == END {
                break;
            }
            if !visited.insert(next) {
                return Err(CompilationError::Cycle(next.to_string()));
            }
            order.push(next.to_string());
            current = next;
        }

        if let Some(stray) = registered
            .keys()
            .filter(|name| !visited.contains(name.as_str()))
            .min()
        {
            return Err(CompilationError::Unreachable(stray.clone()));
        }

        let stages = order
            .iter()
            .filter_map(|name| registered.remove(name))
            .collect();
        Ok(Pipeline { stages })
    }
}

impl Pipeline {
    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Number of stages on the chain.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain runs straight from `START` to `END`.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::FnStage;
    use crate::pipeline::state::{PipelineState, StateUpdate};

    fn noop(name: &str) -> Box<dyn Stage> {
        Box::new(FnStage::new(name, |_: &PipelineState| Ok(StateUpdate::empty())))
    }

    fn compile_error(builder: PipelineBuilder) -> CompilationError {
        match builder.compile() {
            Ok(_) => panic!("expected compilation to fail"),
            Err(error) => error,
        }
    }

    #[test]
    fn compiles_chain_in_edge_order_regardless_of_registration_order() {
        let pipeline = PipelineBuilder::new()
            .add_boxed_stage(noop("publish"))
            .add_boxed_stage(noop("load"))
            .add_boxed_stage(noop("summarize"))
            .add_edge("summarize", "publish")
            .add_edge(START, "load")
            .add_edge("publish", END)
            .add_edge("load", "summarize")
            .compile()
            .expect("pipeline");

        assert_eq!(pipeline.stage_names(), vec!["load", "summarize", "publish"]);
        assert_eq!(pipeline.len(), 3);
    }

    #[test]
    fn linear_builder_wires_sentinels() {
        let stages = vec![noop("a"), noop("b")];
        let pipeline = PipelineBuilder::linear(stages).compile().expect("pipeline");
        assert_eq!(pipeline.stage_names(), vec!["a", "b"]);
    }

    #[test]
    fn empty_chain_is_allowed() {
        let pipeline = PipelineBuilder::new()
            .add_edge(START, END)
            .compile()
            .expect("pipeline");
        assert!(pipeline.is_empty());
    }

    #[test]
    fn rejects_duplicate_and_reserved_names() {
        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_boxed_stage(noop("a")),
        );
        assert_eq!(error, CompilationError::DuplicateStage("a".into()));

        let error = compile_error(PipelineBuilder::new().add_boxed_stage(noop(END)));
        assert_eq!(error, CompilationError::ReservedName(END.into()));
    }

    #[test]
    fn rejects_unknown_stage_and_sentinel_misuse() {
        let error = compile_error(PipelineBuilder::new().add_edge(START, "ghost"));
        assert!(
            matches!(error, CompilationError::UnknownStage { unknown, .. } if unknown == "ghost")
        );

        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_edge(START, "a")
                .add_edge("a", START),
        );
        assert!(
            matches!(error, CompilationError::UnknownStage { unknown, .. } if unknown == START)
        );
    }

    #[test]
    fn rejects_branching_and_merging() {
        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_boxed_stage(noop("b"))
                .add_edge(START, "a")
                .add_edge(START, "b"),
        );
        assert_eq!(error, CompilationError::Branching(START.into()));

        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_boxed_stage(noop("b"))
                .add_edge(START, "a")
                .add_edge("a", END)
                .add_edge("b", END),
        );
        assert_eq!(error, CompilationError::Merging(END.into()));
    }

    #[test]
    fn rejects_missing_entry_and_dead_end() {
        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_edge("a", END),
        );
        assert_eq!(error, CompilationError::MissingEntry);

        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_edge(START, "a"),
        );
        assert_eq!(error, CompilationError::DeadEnd("a".into()));
    }

    #[test]
    fn cycle_back_into_the_chain_is_rejected_as_merge() {
        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_boxed_stage(noop("b"))
                .add_boxed_stage(noop("c"))
                .add_edge(START, "a")
                .add_edge("a", "b")
                .add_edge("b", "c")
                .add_edge("c", "b"),
        );
        assert!(matches!(error, CompilationError::Merging(name) if name == "b"));
    }

    #[test]
    fn rejects_detached_stages() {
        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_boxed_stage(noop("b"))
                .add_boxed_stage(noop("c"))
                .add_edge(START, "a")
                .add_edge("a", END)
                .add_edge("b", "c")
                .add_edge("c", "b"),
        );
        assert_eq!(error, CompilationError::Unreachable("b".into()));

        let error = compile_error(
            PipelineBuilder::new()
                .add_boxed_stage(noop("a"))
                .add_boxed_stage(noop("lonely"))
                .add_edge(START, "a")
                .add_edge("a", END),
        );
        assert_eq!(error, CompilationError::Unreachable("lonely".into()));
    }
}
