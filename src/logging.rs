//! `env_logger` setup shared by both binaries.
//!
//! `RUST_LOG` always wins; otherwise the level comes from `-v`/`-q`.

use log::LevelFilter;

/// Map CLI verbosity to a default level: `-q` errors only, none warn,
/// `-v` info, `-vv` debug, more trace.
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger. Calling it twice is harmless.
pub fn init(level: LevelFilter) {
    let env = env_logger::Env::default().default_filter_or(level.as_str().to_lowercase());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_beats_verbose() {
        assert_eq!(level_for(3, true), LevelFilter::Error);
        assert_eq!(level_for(0, false), LevelFilter::Warn);
        assert_eq!(level_for(2, false), LevelFilter::Debug);
        assert_eq!(level_for(9, false), LevelFilter::Trace);
    }
}
