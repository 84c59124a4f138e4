use std::path::PathBuf;

use log::LevelFilter;

/// Install the global logger.
///
/// Lines go to stderr, or to `log_file` when given, so that reports printed
/// on stdout stay clean.
pub fn setup_logger(log_level: LevelFilter, log_file: &Option<PathBuf>) -> Result<(), fern::InitError> {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log_level);

    match log_file {
        None => dispatch.chain(std::io::stderr()),
        Some(f) => dispatch.chain(fern::log_file(f)?),
    }
    .apply()?;
    Ok(())
}

/// Parse a level name such as `info` or `DEBUG`; `None` if unknown.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.parse().ok()
}
