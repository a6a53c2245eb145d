//! Stage definitions, the handles the orchestrator keeps for each running stage,
//! and the shared state stage workers report into.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle, Scope};

/// Body of a stage: consume `in`, produce on `out`. `out` closes when the body returns.
pub type StageFn<T> = Box<dyn FnOnce(Receiver<T>, Sender<T>) -> Result<()> + Send>;

/// A stage body with a name for thread names and diagnostics.
pub struct NamedStage<T> {
    pub name: String,
    pub run: StageFn<T>,
}

impl<T> NamedStage<T> {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: FnOnce(Receiver<T>, Sender<T>) -> Result<()> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }
}

/// A spawned stage: position in the chain, name, and its worker thread.
pub struct StageHandle {
    pub index: usize,
    pub name: String,
    pub handle: JoinHandle<Result<()>>,
}

/// First error reported by any per-item worker of a stage. Later errors are dropped.
#[derive(Debug, Default)]
pub struct FirstError {
    slot: Mutex<Option<anyhow::Error>>,
}

impl FirstError {
    pub fn record(&self, err: anyhow::Error) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            log::debug!("dropping later worker error: {:#}", err);
            return;
        }
        *slot = Some(err);
    }

    pub fn into_result(self) -> Result<()> {
        match self.slot.into_inner().unwrap_or_else(PoisonError::into_inner) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Spawn a per-item worker inside `scope` without keeping its handle; the scope joins it.
/// A failed spawn comes back as an error instead of a panic.
pub fn spawn_scoped_worker<'scope, 'env, F>(
    scope: &'scope Scope<'scope, 'env>,
    stage: &'static str,
    f: F,
) -> Result<()>
where
    F: FnOnce() + Send + 'scope,
{
    thread::Builder::new()
        .spawn_scoped(scope, f)
        .with_context(|| format!("{stage}: spawn worker thread"))?;
    Ok(())
}
