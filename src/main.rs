//! Signpipe CLI: sign a range of items and print the aggregated fingerprint.

use anyhow::Result;
use clap::Parser;
use signpipe::engine::arg_parser::Cli;
use signpipe::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
