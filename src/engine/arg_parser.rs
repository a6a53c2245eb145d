use clap::Parser;

/// Staged fingerprint pipeline over a range of item indexes.
#[derive(Clone, Parser)]
#[command(name = "signpipe")]
#[command(about = "Hash a range of items through the signing pipeline and print the aggregated result.")]
pub struct Cli {
    /// First item index (inclusive). Default: 0, or `start` from .signpipe.toml.
    #[arg(value_name = "START")]
    pub start: Option<u64>,

    /// Last item index (inclusive). Default: 6, or `end` from .signpipe.toml.
    #[arg(value_name = "END")]
    pub end: Option<u64>,

    /// Items allowed inside the six-way fan-out at once.
    #[arg(long, short = 'n', value_parser = clap::value_parser!(usize))]
    pub fanout_items: Option<usize>,

    /// Simulated latency of each fast hash call (ms).
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub fast_delay_ms: Option<u64>,

    /// Simulated latency of each slow hash call (ms).
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub slow_delay_ms: Option<u64>,

    /// Use the latencies of the modeled external resource (fast 1 s, slow 10 ms). Explicit delays win.
    #[arg(long)]
    pub realistic: bool,

    /// Print a JSON run report instead of the bare result.
    #[arg(long, short = 'j', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Verbose output (debug logs and progress bar).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
