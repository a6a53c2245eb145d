//! Stage A: per item, a fast hash and a quota-gated slow hash run concurrently and
//! are combined as `fast~slowDerived`.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::Arc;
use std::thread;

use super::gate::Gate;
use super::hashing::Signer;
use crate::pipeline::{FirstError, NamedStage, PipelineError, spawn_scoped_worker};
use crate::utils::config::{PAIR_SLOTS, STAGE_A_DELIMITER, STAGE_A_MAX_ITEMS, StageNames};
use crate::{Item, Role, Tagged};

/// Join a tagged pair in role order (fast first), whatever order they arrived in.
pub fn combine(first: Tagged, second: Tagged) -> Result<String> {
    let (fast, slow) = match (first.role, second.role) {
        (Role::Fast, Role::SlowDerived) => (first.value, second.value),
        (Role::SlowDerived, Role::Fast) => (second.value, first.value),
        (role, _) => return Err(PipelineError::DuplicateRole { role }.into()),
    };
    Ok(format!("{fast}{STAGE_A_DELIMITER}{slow}"))
}

/// Slow hash under the quota, then fast hash of that value outside it.
/// The permit is dropped as soon as the raw slow value exists.
pub fn slow_derived(signer: &dyn Signer, quota: &Gate, data: &str) -> String {
    let raw = {
        let _permit = quota.acquire();
        signer.slow(data)
    };
    signer.fast(&raw)
}

/// Read exactly two tagged results for one item, combine, and emit downstream.
fn run_combiner(parts: Receiver<Tagged>, out: Sender<Item>) -> Result<()> {
    let first = parts
        .recv()
        .map_err(|_| PipelineError::IncompleteCombine { received: 0 })?;
    let second = parts
        .recv()
        .map_err(|_| PipelineError::IncompleteCombine { received: 1 })?;
    let combined = combine(first, second)?;
    debug!("combined: {}", combined);
    // Downstream gone means the run is already failing; nothing to add here.
    let _ = out.send(Item::Text(combined));
    Ok(())
}

fn run_single_hash(
    input: Receiver<Item>,
    out: Sender<Item>,
    signer: &dyn Signer,
    quota: &Gate,
) -> Result<()> {
    let in_flight = Gate::new(STAGE_A_MAX_ITEMS);
    let first_error = FirstError::default();
    thread::scope(|s| -> Result<()> {
        let first_error = &first_error;
        while let Ok(item) = input.recv() {
            let data = match item {
                Item::Index(n) => n.to_string(),
                other => {
                    return Err(PipelineError::UnexpectedItem {
                        stage: StageNames::SINGLE_HASH,
                        expected: "index",
                        found: other.kind(),
                    }
                    .into());
                }
            };

            // Released by the combiner, which outlives both hash threads of the item.
            let permit = in_flight.acquire();
            let (part_tx, part_rx) = bounded::<Tagged>(PAIR_SLOTS);
            let out = out.clone();
            spawn_scoped_worker(s, StageNames::SINGLE_HASH, move || {
                if let Err(e) = run_combiner(part_rx, out) {
                    first_error.record(e);
                }
                drop(permit);
            })?;

            let fast_tx = part_tx.clone();
            let fast_data = data.clone();
            spawn_scoped_worker(s, StageNames::SINGLE_HASH, move || {
                let _ = fast_tx.send(Tagged::fast(signer.fast(&fast_data)));
            })?;
            spawn_scoped_worker(s, StageNames::SINGLE_HASH, move || {
                let _ = part_tx.send(Tagged::slow_derived(slow_derived(signer, quota, &data)));
            })?;
        }
        Ok(())
    })?;
    first_error.into_result()
}

/// Build Stage A. `quota` is shared by every item of the run.
pub fn single_hash_stage(signer: Arc<dyn Signer>, quota: Arc<Gate>) -> NamedStage<Item> {
    NamedStage::new(StageNames::SINGLE_HASH, move |input, out| {
        run_single_hash(input, out, signer.as_ref(), quota.as_ref())
    })
}
