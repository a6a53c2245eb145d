//! Generic stage pipeline: stage definitions, orchestration, error handling.

pub mod context;
pub mod error_handler;
pub mod orchestrator;

pub use context::{FirstError, NamedStage, StageFn, StageHandle, spawn_scoped_worker};
pub use error_handler::{PipelineError, join_stage_handles};
pub use orchestrator::execute_pipeline;
