//! Stage C: collect everything, sort, join into the single final string.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use log::debug;

use super::progress::{ProgressBar, update_progress_bar};
use crate::Item;
use crate::pipeline::{NamedStage, PipelineError};
use crate::utils::config::{RESULT_DELIMITER, StageNames};

/// Sort ascending (byte-wise) and join with `_`. Arrival order does not matter.
pub fn aggregate(mut parts: Vec<String>) -> String {
    parts.sort_unstable();
    parts.join(RESULT_DELIMITER)
}

fn run_aggregate(
    input: Receiver<Item>,
    out: Sender<Item>,
    progress: Option<ProgressBar>,
) -> Result<()> {
    let mut parts = Vec::new();
    while let Ok(item) = input.recv() {
        match item {
            Item::Text(t) => parts.push(t),
            other => {
                return Err(PipelineError::UnexpectedItem {
                    stage: StageNames::AGGREGATE,
                    expected: "text",
                    found: other.kind(),
                }
                .into());
            }
        }
        if let Some(pb) = &progress {
            update_progress_bar(pb, 1);
        }
    }
    debug!("aggregating {} results", parts.len());
    let _ = out.send(Item::Text(aggregate(parts)));
    Ok(())
}

/// Build Stage C. `progress`, when given, ticks once per received item.
pub fn aggregate_stage(progress: Option<ProgressBar>) -> NamedStage<Item> {
    NamedStage::new(StageNames::AGGREGATE, move |input, out| {
        run_aggregate(input, out, progress)
    })
}
