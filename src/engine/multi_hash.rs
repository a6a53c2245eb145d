//! Stage B: six-way fan-out hash per item, results concatenated in index order.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use super::gate::Gate;
use super::hashing::Signer;
use crate::Item;
use crate::pipeline::{NamedStage, PipelineError, spawn_scoped_worker};
use crate::utils::config::{FANOUT_WIDTH, StageNames};

/// Hash `i ++ data` for every `i in 0..width` concurrently; return the results
/// concatenated in index order regardless of which finished first.
pub fn fan_out(signer: &dyn Signer, data: &str, width: usize) -> String {
    let slots = Mutex::new(vec![String::new(); width]);
    rayon::scope(|s| {
        for i in 0..width {
            let slots = &slots;
            s.spawn(move |_| {
                let hash = signer.fast(&format!("{i}{data}"));
                slots.lock().unwrap_or_else(PoisonError::into_inner)[i] = hash;
            });
        }
    });
    slots
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .concat()
}

fn run_multi_hash(
    input: Receiver<Item>,
    out: Sender<Item>,
    signer: &dyn Signer,
    admission: &Gate,
) -> Result<()> {
    thread::scope(|s| -> Result<()> {
        while let Ok(item) = input.recv() {
            let data = match item {
                Item::Text(t) => t,
                other => {
                    return Err(PipelineError::UnexpectedItem {
                        stage: StageNames::MULTI_HASH,
                        expected: "text",
                        found: other.kind(),
                    }
                    .into());
                }
            };

            // Held for the whole fan-out of this item; blocks the stage loop at capacity.
            let permit = admission.acquire();
            let out = out.clone();
            spawn_scoped_worker(s, StageNames::MULTI_HASH, move || {
                let result = fan_out(signer, &data, FANOUT_WIDTH);
                drop(permit);
                debug!("fan-out for {} is {}", data, result);
                let _ = out.send(Item::Text(result));
            })?;
        }
        Ok(())
    })
}

/// Build Stage B. At most `admission.capacity()` items fan out at once.
pub fn multi_hash_stage(signer: Arc<dyn Signer>, admission: Arc<Gate>) -> NamedStage<Item> {
    NamedStage::new(StageNames::MULTI_HASH, move |input, out| {
        run_multi_hash(input, out, signer.as_ref(), admission.as_ref())
    })
}
