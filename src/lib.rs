//! Signpipe: staged fingerprint pipeline with a global quota on the slow hash

pub mod engine;
pub mod pipeline;
pub mod sign;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::gate::{Gate, Permit};
pub use engine::hashing::{Blake3Signer, FnSigner, Signer};
pub use pipeline::{NamedStage, PipelineError, execute_pipeline};
pub use sign::{sign_items, sign_with_report};

use std::ops::RangeInclusive;
use std::sync::Arc;

/// Result alias used by public signpipe API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Sign every index in `range` (inclusive) and return the aggregated string:
/// per item `fan_out(fast ~ fast(slow))`, sorted and joined with `_`.
///
/// ```
/// use signpipe::{Blake3Signer, SignOpts, sign_range};
/// use std::sync::Arc;
///
/// let out = sign_range(0..=6, &SignOpts::default(), Arc::new(Blake3Signer::new()))?;
/// assert_eq!(out.split('_').count(), 7);
/// # Ok::<(), signpipe::Error>(())
/// ```
pub fn sign_range(
    range: RangeInclusive<u64>,
    opts: &SignOpts,
    signer: Arc<dyn Signer>,
) -> Result<String> {
    log::debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    sign_items(range, opts, signer)
}
