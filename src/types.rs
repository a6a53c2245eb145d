//! Public and internal types for the signpipe API and pipeline.

use serde::Serialize;
use std::fmt;

use crate::utils::config::{DEFAULT_FANOUT_ITEMS, DefaultRange, SimulatedLatency};

/// A unit of work flowing between stages. Enters as an index, leaves Stage A and B as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Index(u64),
    Text(String),
}

impl Item {
    /// Short name of the variant, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Item::Index(_) => "index",
            Item::Text(_) => "text",
        }
    }
}

/// Which half of a Stage A pair a hash value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Fast hash of the item itself.
    Fast,
    /// Fast hash applied to the slow hash of the item.
    SlowDerived,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Fast => f.write_str("fast"),
            Role::SlowDerived => f.write_str("slow-derived"),
        }
    }
}

/// A hash value tagged with its role so the combiner does not depend on arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tagged {
    pub role: Role,
    pub value: String,
}

impl Tagged {
    pub fn fast(value: String) -> Self {
        Self {
            role: Role::Fast,
            value,
        }
    }

    pub fn slow_derived(value: String) -> Self {
        Self {
            role: Role::SlowDerived,
            value,
        }
    }
}

/// Lib-only options for [`sign_items`](crate::sign_items) and friends.
#[derive(Clone, Debug)]
pub struct SignOpts {
    /// How many items may be inside the Stage B fan-out at once. 0 is treated as 1.
    pub fanout_items: usize,
    /// Show a progress bar over aggregated items.
    pub show_progress: bool,
}

impl Default for SignOpts {
    fn default() -> Self {
        Self {
            fanout_items: DEFAULT_FANOUT_ITEMS,
            show_progress: false,
        }
    }
}

impl SignOpts {
    /// Stage B admission capacity, clamped to at least 1.
    pub fn fanout_capacity(&self) -> usize {
        if self.fanout_items == 0 {
            log::warn!("fanout_items = 0 would stall the pipeline; using 1");
            return 1;
        }
        self.fanout_items
    }
}

/// Full options (CLI and config file). Use [`SignOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// First index of the input range (inclusive).
    pub start: u64,
    /// Last index of the input range (inclusive).
    pub end: u64,
    /// Stage B admission capacity.
    pub fanout_items: usize,
    /// Simulated latency of every fast hash call, in milliseconds.
    pub fast_delay_ms: u64,
    /// Simulated latency of every slow hash call, in milliseconds.
    pub slow_delay_ms: u64,
    /// Print a JSON [`RunReport`] instead of the bare result.
    pub json: bool,
    /// Debug logging and progress bar.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            start: DefaultRange::START,
            end: DefaultRange::END,
            fanout_items: DEFAULT_FANOUT_ITEMS,
            fast_delay_ms: SimulatedLatency::FAST_MS,
            slow_delay_ms: SimulatedLatency::SLOW_MS,
            json: false,
            verbose: false,
        }
    }
}

impl From<&Opts> for SignOpts {
    fn from(o: &Opts) -> Self {
        SignOpts {
            fanout_items: o.fanout_items,
            show_progress: o.verbose,
        }
    }
}

/// Summary of one pipeline run.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    /// Number of source items.
    pub items: usize,
    /// Aggregated output.
    pub result: String,
    pub elapsed_ms: u64,
    /// Highest number of concurrently held quota tokens (never above 1).
    pub peak_slow_calls: usize,
    /// Highest number of items concurrently inside the Stage B fan-out.
    pub peak_fanout_items: usize,
}
