//! Load `.signpipe.toml` from a directory (CLI only). Lib callers pass [`SignOpts`](crate::SignOpts) directly.

use serde::Deserialize;
use std::path::Path;

use crate::Opts;
use crate::utils::apply_opt;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SignpipeToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    start: Option<u64>,
    end: Option<u64>,
    fanout_items: Option<usize>,
    fast_delay_ms: Option<u64>,
    slow_delay_ms: Option<u64>,
    json: Option<bool>,
    verbose: Option<bool>,
}

/// Load the settings file from `dir` if present. Returns None if missing or unparsable.
pub(crate) fn load_signpipe_toml(dir: &Path) -> Option<SignpipeToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_signpipe_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_signpipe_toml(s: &str) -> Result<SignpipeToml, toml::de::Error> {
    toml::from_str(s)
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &SignpipeToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_opt!(
        s,
        opts,
        start,
        end,
        fanout_items,
        fast_delay_ms,
        slow_delay_ms,
        json,
        verbose,
    );
}
