use std::fmt;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::Subscriber;
use tracing_subscriber::{
    fmt as tracing_fmt,
    fmt::{format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LogConfig;
use crate::error::{LogError, LogResult};
use crate::timezone::{LogTimeZone, local_offset};

/// RFC3339 timestamp formatter honoring the configured timezone.
#[derive(Debug, Clone, Copy)]
struct Rfc3339Timer {
    tz: LogTimeZone,
}

impl FormatTime for Rfc3339Timer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = match self.tz {
            LogTimeZone::Utc => OffsetDateTime::now_utc(),
            LogTimeZone::Local => OffsetDateTime::now_utc().to_offset(local_offset()),
        };
        match now.format(&Rfc3339) {
            Ok(ts) => write!(w, "{ts} "),
            Err(_) => write!(w, "<invalid-time> "),
        }
    }
}

pub(crate) fn init_text(cfg: &LogConfig) -> LogResult<()> {
    let filter = cfg.level.to_env_filter();
    let layer = tracing_fmt::layer()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_timer(Rfc3339Timer { tz: cfg.tz });

    install(tracing_subscriber::registry().with(filter).with(layer))
}

pub(crate) fn init_json(cfg: &LogConfig) -> LogResult<()> {
    let filter = cfg.level.to_env_filter();
    let layer = tracing_fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_timer(Rfc3339Timer { tz: cfg.tz });

    install(tracing_subscriber::registry().with(filter).with(layer))
}

#[cfg(target_os = "linux")]
pub(crate) fn init_journald(cfg: &LogConfig) -> LogResult<()> {
    let filter = cfg.level.to_env_filter();
    let journald =
        tracing_journald::layer().map_err(|e| LogError::JournaldInitFailed(e.to_string()))?;

    install(tracing_subscriber::registry().with(filter).with(journald))
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn init_journald(_cfg: &LogConfig) -> LogResult<()> {
    Err(LogError::JournaldNotSupported)
}

fn install<S>(subscriber: S) -> LogResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LogError::AlreadyInitialized)
}
