/// Overwrite an opts field from a source (file section or CLI) when the source has it set.
macro_rules! apply_opt {
    ($src:expr, $opts:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = $src.$field {
                $opts.$field = v;
            }
        )+
    };
}
pub(crate) use apply_opt;

pub mod config;
pub mod logger;
pub(crate) mod signpipe_toml;

pub use config::*;
pub use logger::setup_logging;
