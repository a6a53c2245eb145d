use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;
use std::thread;

use super::context::{NamedStage, StageHandle};
use super::error_handler::join_stage_handles;
use crate::utils::config::PackagePaths;

/// Spawn one worker thread for `stage`. The worker owns `out`, so the queue closes
/// as soon as the stage body returns (or unwinds).
fn spawn_stage<T: Send + 'static>(
    index: usize,
    stage: NamedStage<T>,
    input: Receiver<T>,
    out: Sender<T>,
) -> Result<StageHandle> {
    let NamedStage { name, run } = stage;
    let thread_name = PackagePaths::get().stage_thread_name(index, &name);
    let log_name = name.clone();
    let handle = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            debug!("stage {} ({}) started", index, log_name);
            let result = run(input, out);
            debug!("stage {} ({}) returned, output closed", index, log_name);
            result
        })
        .with_context(|| format!("spawn stage thread {thread_name}"))?;
    Ok(StageHandle {
        index,
        name,
        handle,
    })
}

/// Main orchestrator: queue₀ → stage₁ → queue₁ → … → stageₙ → queueₙ.
///
/// `source` is pushed into queue₀, which is then closed. Every stage runs on its own
/// thread; queueₙ is drained into the returned vector and all stages are joined before
/// returning. The first failing stage (by position) becomes the error. With no stages
/// the source comes back unchanged.
pub fn execute_pipeline<T, I>(source: I, stages: Vec<NamedStage<T>>) -> Result<Vec<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
{
    let (source_tx, mut prev_rx) = unbounded::<T>();
    let mut handles = Vec::with_capacity(stages.len());

    for (index, stage) in stages.into_iter().enumerate() {
        let (tx, rx) = unbounded::<T>();
        match spawn_stage(index, stage, prev_rx, tx) {
            Ok(h) => handles.push(h),
            Err(e) => {
                // Closing the source lets already running stages drain and exit.
                drop(source_tx);
                drop(rx);
                let _ = join_stage_handles(handles);
                return Err(e);
            }
        }
        prev_rx = rx;
    }

    let mut fed = 0_usize;
    for item in source {
        // First stage gone (it failed); stop feeding and let the join report why.
        if source_tx.send(item).is_err() {
            break;
        }
        fed += 1;
    }
    drop(source_tx);
    debug!("source: queued {} items, input closed", fed);

    let outputs: Vec<T> = prev_rx.iter().collect();
    debug!("sink: output closed, {} items drained", outputs.len());

    join_stage_handles(handles)?;
    Ok(outputs)
}
