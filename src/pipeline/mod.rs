//! Workflow engine: typed state, the stage contract, graph compilation, and the executor.

mod executor;
pub mod graph;
pub mod stage;
pub mod state;

pub use executor::PipelineError;
pub use graph::{CompilationError, END, Pipeline, PipelineBuilder, START};
pub use stage::{FnStage, Stage, StageError};
pub use state::{PipelineState, StateUpdate};
