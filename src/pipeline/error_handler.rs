//! Pipeline error taxonomy and the join step that turns stage outcomes into one result.

use anyhow::Result;
use log::{debug, error};
use thiserror::Error;

use super::context::StageHandle;
use crate::Role;

/// Failures specific to the pipeline. Returned inside [`anyhow::Error`]; callers can
/// `downcast_ref::<PipelineError>()` to inspect them.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage received an item of the wrong shape.
    #[error("{stage}: expected {expected} item, got {found}")]
    UnexpectedItem {
        stage: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// The combiner got two results with the same role.
    #[error("combiner received two {role} results")]
    DuplicateRole { role: Role },

    /// A hash producer went away before delivering its half of the pair.
    #[error("combiner input closed after {received} of 2 results")]
    IncompleteCombine { received: usize },

    /// Context attached to the error a stage returned.
    #[error("stage {index} ({name}) failed")]
    StageFailed { index: usize, name: String },

    #[error("stage {index} ({name}) panicked")]
    StagePanicked { index: usize, name: String },

    /// The pipeline drained without the single aggregated value.
    #[error("expected exactly one aggregated result, got {count}")]
    UnexpectedOutput { count: usize },
}

/// Join every stage, in chain order. All threads are joined even after a failure;
/// the first failing stage (by position) is reported.
pub fn join_stage_handles(handles: Vec<StageHandle>) -> Result<()> {
    let mut first_error: Option<anyhow::Error> = None;
    for StageHandle {
        index,
        name,
        handle,
    } in handles
    {
        let outcome = match handle.join() {
            Ok(Ok(())) => {
                debug!("stage {} ({}) joined", index, name);
                continue;
            }
            Ok(Err(e)) => e.context(PipelineError::StageFailed { index, name }),
            Err(_) => PipelineError::StagePanicked { index, name }.into(),
        };
        error!("{:#}", outcome);
        first_error.get_or_insert(outcome);
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
