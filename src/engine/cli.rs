//! CLI command handler: defaults → .signpipe.toml → flags, then one signing run.

use anyhow::{Result, bail};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::engine::hashing::Blake3Signer;
use crate::sign::sign_with_report;
use crate::utils::config::SimulatedLatency;
use crate::utils::{apply_opt, setup_logging};
use crate::utils::signpipe_toml::{apply_file_to_opts, load_signpipe_toml};
use crate::{Opts, SignOpts};

/// Build Opts from defaults, then the settings file in the working directory, then CLI flags.
pub fn resolve_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Ok(cwd) = std::env::current_dir()
        && let Some(file) = load_signpipe_toml(&cwd)
    {
        apply_file_to_opts(&file, &mut opts);
    }
    if cli.realistic {
        opts.fast_delay_ms = SimulatedLatency::REALISTIC_FAST_MS;
        opts.slow_delay_ms = SimulatedLatency::REALISTIC_SLOW_MS;
    }
    apply_opt!(
        cli,
        opts,
        start,
        end,
        fanout_items,
        fast_delay_ms,
        slow_delay_ms,
        json,
        verbose,
    );
    opts
}

/// Run one signing pass and print the result (or the JSON report).
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = resolve_opts(cli);
    setup_logging(opts.verbose);
    debug!("{} CONFIG:{:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    if opts.start > opts.end {
        bail!("empty range: start {} is after end {}", opts.start, opts.end);
    }

    let signer = Arc::new(Blake3Signer::with_delays(
        Duration::from_millis(opts.fast_delay_ms),
        Duration::from_millis(opts.slow_delay_ms),
    ));
    let report = sign_with_report(opts.start..=opts.end, &SignOpts::from(&opts), signer)?;
    debug!(
        "{} items in {} ms (peak slow calls {}, peak fan-out items {})",
        report.items, report.elapsed_ms, report.peak_slow_calls, report.peak_fanout_items
    );

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.result);
    }
    Ok(())
}
