//! Hash primitives used by the stages. The pipeline treats them as opaque
//! deterministic functions from string to string.

use blake3::Hasher;
use std::thread;
use std::time::Duration;

use crate::utils::config::PackagePaths;

/// The two hash functions a signing run needs. Implementations must be pure and
/// deterministic; `slow` is the one behind the quota gate.
pub trait Signer: Send + Sync {
    fn fast(&self, data: &str) -> String;
    fn slow(&self, data: &str) -> String;
}

/// Default signer on blake3.
///
/// `fast` is a checksum-sized digest: the first 4 bytes of blake3 as a decimal u32.
/// `slow` is a 128-bit hex digest from blake3 in key-derivation mode.
/// Optional per-call delays simulate a slow external resource.
#[derive(Clone, Debug, Default)]
pub struct Blake3Signer {
    fast_delay: Duration,
    slow_delay: Duration,
}

impl Blake3Signer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delays(fast_delay: Duration, slow_delay: Duration) -> Self {
        Self {
            fast_delay,
            slow_delay,
        }
    }
}

fn pause(d: Duration) {
    if !d.is_zero() {
        thread::sleep(d);
    }
}

impl Signer for Blake3Signer {
    fn fast(&self, data: &str) -> String {
        pause(self.fast_delay);
        let hash = blake3::hash(data.as_bytes());
        let b = hash.as_bytes();
        u32::from_le_bytes([b[0], b[1], b[2], b[3]]).to_string()
    }

    fn slow(&self, data: &str) -> String {
        pause(self.slow_delay);
        let mut hasher = Hasher::new_derive_key(PackagePaths::get().slow_hash_context());
        hasher.update(data.as_bytes());
        let hex = hasher.finalize().to_hex();
        hex.as_str()[..32].to_string()
    }
}

/// Signer built from two closures. Handy for tests and custom hashes.
pub struct FnSigner<F, S> {
    fast: F,
    slow: S,
}

impl<F, S> FnSigner<F, S>
where
    F: Fn(&str) -> String + Send + Sync,
    S: Fn(&str) -> String + Send + Sync,
{
    pub fn new(fast: F, slow: S) -> Self {
        Self { fast, slow }
    }
}

impl<F, S> Signer for FnSigner<F, S>
where
    F: Fn(&str) -> String + Send + Sync,
    S: Fn(&str) -> String + Send + Sync,
{
    fn fast(&self, data: &str) -> String {
        (self.fast)(data)
    }

    fn slow(&self, data: &str) -> String {
        (self.slow)(data)
    }
}
