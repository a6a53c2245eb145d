//! Blocking counting semaphore with RAII permits.
//!
//! Used twice by the signing pipeline:
//! - the quota gate (capacity 1) around every slow hash call, across all items;
//! - the Stage B admission gate (configurable) around each item's whole fan-out.
//!
//! A [`Permit`] releases on drop, so a panicking holder still frees its slot.
//! `peak()` records the high-water mark of held permits for reports and tests.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct GateState {
    in_flight: usize,
    peak: usize,
}

/// Fixed-capacity counting semaphore.
#[derive(Debug)]
pub struct Gate {
    capacity: usize,
    state: Mutex<GateState>,
    cv: Condvar,
}

impl Gate {
    /// # Panics
    ///
    /// Panics if `capacity` is 0 (every acquire would block forever).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Gate capacity must be > 0");
        Self {
            capacity,
            state: Mutex::new(GateState::default()),
            cv: Condvar::new(),
        }
    }

    /// Poison only means another holder panicked; the counters are still consistent.
    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a slot is free and take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self.lock_state();
        while state.in_flight >= self.capacity {
            state = self.cv.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.in_flight += 1;
        state.peak = state.peak.max(state.in_flight);
        Permit { gate: self }
    }

    fn release(&self) {
        let mut state = self.lock_state();
        debug_assert!(state.in_flight > 0, "gate released more than acquired");
        state.in_flight = state.in_flight.saturating_sub(1);
        drop(state);
        self.cv.notify_one();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held.
    pub fn in_flight(&self) -> usize {
        self.lock_state().in_flight
    }

    /// Most permits ever held at once.
    pub fn peak(&self) -> usize {
        self.lock_state().peak
    }
}

/// A held slot of a [`Gate`]. Dropping it releases the slot.
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a Gate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
