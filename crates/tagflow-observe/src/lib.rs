mod config;
mod error;
mod format;
mod init;
mod level;
mod timezone;

pub use config::LogConfig;
pub use error::{LogError, LogResult};
pub use format::LogFormat;
pub use level::LogLevel;
pub use timezone::{LogTimeZone, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// Once this returns, all `tracing` macros go through the configured
/// subscriber. Installing twice fails with [`LogError::AlreadyInitialized`].
///
/// When `cfg` asks for local-time timestamps, call
/// [`init_local_offset`] in `main()` before the async runtime starts;
/// offset detection is unreliable once threads exist.
pub fn init_logging(cfg: &LogConfig) -> LogResult<()> {
    match cfg.format {
        LogFormat::Text => init::init_text(cfg),
        LogFormat::Json => init::init_json(cfg),
        LogFormat::Journald => init::init_journald(cfg),
    }
}
