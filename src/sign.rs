//! Signing run: wire Stage A → Stage B → Stage C and collect the aggregated string.

use anyhow::Result;
use kdam::Animation;
use log::debug;
use std::sync::Arc;
use std::time::Instant;

use crate::engine::gate::Gate;
use crate::engine::hashing::Signer;
use crate::engine::progress::{ProgressBarConfig, create_progress_bar, finish_progress_bar};
use crate::engine::{aggregate_stage, multi_hash_stage, single_hash_stage};
use crate::pipeline::{PipelineError, execute_pipeline};
use crate::utils::config::QUOTA_CAPACITY;
use crate::{Item, RunReport, SignOpts};

/// Run the fixed three-stage pipeline over `items` and return the full report.
pub fn sign_with_report<I>(items: I, opts: &SignOpts, signer: Arc<dyn Signer>) -> Result<RunReport>
where
    I: IntoIterator<Item = u64>,
{
    let start = Instant::now();
    let source: Vec<Item> = items.into_iter().map(Item::Index).collect();
    let count = source.len();

    let quota = Arc::new(Gate::new(QUOTA_CAPACITY));
    let admission = Arc::new(Gate::new(opts.fanout_capacity()));
    let progress = opts.show_progress.then(|| {
        create_progress_bar(ProgressBarConfig::new(count, "Signing", Animation::Classic))
    });
    debug!(
        "signing {} items (quota {}, fan-out admission {})",
        count,
        quota.capacity(),
        admission.capacity()
    );

    let stages = vec![
        single_hash_stage(Arc::clone(&signer), Arc::clone(&quota)),
        multi_hash_stage(signer, Arc::clone(&admission)),
        aggregate_stage(progress.clone()),
    ];
    let outputs = execute_pipeline(source, stages)?;
    if let Some(pb) = &progress {
        finish_progress_bar(pb);
    }

    let result = match <[Item; 1]>::try_from(outputs) {
        Ok([Item::Text(s)]) => s,
        Ok([other]) => {
            return Err(PipelineError::UnexpectedItem {
                stage: "sink",
                expected: "text",
                found: other.kind(),
            }
            .into());
        }
        Err(outputs) => {
            return Err(PipelineError::UnexpectedOutput {
                count: outputs.len(),
            }
            .into());
        }
    };

    Ok(RunReport {
        items: count,
        result,
        elapsed_ms: start.elapsed().as_millis() as u64,
        peak_slow_calls: quota.peak(),
        peak_fanout_items: admission.peak(),
    })
}

/// Run the pipeline over `items` and return the aggregated string.
pub fn sign_items<I>(items: I, opts: &SignOpts, signer: Arc<dyn Signer>) -> Result<String>
where
    I: IntoIterator<Item = u64>,
{
    Ok(sign_with_report(items, opts, signer)?.result)
}
