use log::LevelFilter;

/// Level from the `-v`/`-q` flags: errors only, info, debug, then trace.
pub fn level_filter(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Logs to stderr at `level`; `RUST_LOG` refines it per module.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .parse_default_env()
        .try_init()
}
