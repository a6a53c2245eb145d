//! Engine module: hash primitives, gates, and the three signing stages

pub mod aggregate;
pub mod arg_parser;
pub mod cli;
pub mod gate;
pub mod hashing;
pub mod multi_hash;
pub mod progress;
pub mod single_hash;

// Re-export commonly used functions
pub use aggregate::{aggregate, aggregate_stage};
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use gate::{Gate, Permit};
pub use hashing::{Blake3Signer, FnSigner, Signer};
pub use multi_hash::{fan_out, multi_hash_stage};
pub use single_hash::{combine, single_hash_stage, slow_derived};
