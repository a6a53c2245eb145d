//! Application configuration constants.
//! Pipeline shape, delimiters and defaults in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    slow_hash_context: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                slow_hash_context: format!("{pkg} slow hash v1"),
            }
        })
    }

    /// Name of the optional settings file looked up in the working directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// blake3 key-derivation context for the default slow hash.
    pub fn slow_hash_context(&self) -> &str {
        &self.slow_hash_context
    }

    /// Thread name for a pipeline stage worker.
    pub fn stage_thread_name(&self, index: usize, stage: &str) -> String {
        format!("{}-{}-{}", self.pkg_name, index, stage)
    }
}

// ---- Pipeline shape ----

/// Sub-computations per item in Stage B.
pub const FANOUT_WIDTH: usize = 6;

/// Concurrent slow-hash calls allowed across the whole run.
pub const QUOTA_CAPACITY: usize = 1;

/// Items allowed inside the Stage B fan-out at once unless configured otherwise.
pub const DEFAULT_FANOUT_ITEMS: usize = 1;

/// Items Stage A works on at once. Each one holds three threads (fast, slow, combiner),
/// so this caps live OS threads; the quota still admits one slow call at a time.
pub const STAGE_A_MAX_ITEMS: usize = 256;

/// Stage A capacity of the per-item result channel (one fast, one slow-derived).
pub const PAIR_SLOTS: usize = 2;

// ---- Delimiters ----

/// Joins the fast and slow-derived hashes of one item.
pub const STAGE_A_DELIMITER: &str = "~";

/// Joins item results in the aggregated output.
pub const RESULT_DELIMITER: &str = "_";

// ---- Stage names ----

pub struct StageNames;

impl StageNames {
    pub const SINGLE_HASH: &'static str = "single-hash";
    pub const MULTI_HASH: &'static str = "multi-hash";
    pub const AGGREGATE: &'static str = "aggregate";
}

// ---- CLI defaults ----

/// Default inclusive input range for the CLI.
pub struct DefaultRange;

impl DefaultRange {
    pub const START: u64 = 0;
    pub const END: u64 = 6;
}

/// Simulated hash latency for the CLI (milliseconds). The modeled external resource
/// takes ~10 ms per slow call and ~1 s per fast call; both default to 0 here.
pub struct SimulatedLatency;

impl SimulatedLatency {
    pub const FAST_MS: u64 = 0;
    pub const SLOW_MS: u64 = 0;
    /// Values used by `--realistic`.
    pub const REALISTIC_FAST_MS: u64 = 1000;
    pub const REALISTIC_SLOW_MS: u64 = 10;
}
