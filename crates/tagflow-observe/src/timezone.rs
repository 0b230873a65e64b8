use std::{fmt, str::FromStr, sync::OnceLock};

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::error::LogError;

/// Cached local UTC offset, detected once.
static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Timezone used for log timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTimeZone {
    /// UTC (default, always available).
    Utc,
    /// System timezone; requires [`init_local_offset`] before the runtime
    /// spawns threads.
    Local,
}

impl Default for LogTimeZone {
    fn default() -> Self {
        Self::Utc
    }
}

impl FromStr for LogTimeZone {
    type Err = LogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LogError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LogTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogTimeZone::Utc => "utc",
            LogTimeZone::Local => "local",
        };
        f.write_str(s)
    }
}

/// Detect and cache the local UTC offset.
///
/// Call in `main()` before the async runtime starts: offset detection
/// fails in multi-threaded processes on most Unix platforms. Falls back to
/// UTC silently when detection fails.
pub fn init_local_offset() {
    let _ = LOCAL_OFFSET.set(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC));
}

/// Cached local offset, detecting on first use when
/// [`init_local_offset`] was never called.
pub(crate) fn local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_utc() {
        assert_eq!(LogTimeZone::default(), LogTimeZone::Utc);
    }

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("UTC".parse::<LogTimeZone>().unwrap(), LogTimeZone::Utc);
        assert_eq!("Local".parse::<LogTimeZone>().unwrap(), LogTimeZone::Local);
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!("pst".parse::<LogTimeZone>().is_err());
        assert!("".parse::<LogTimeZone>().is_err());
    }

    #[test]
    fn local_offset_is_sane() {
        init_local_offset();
        let offset = local_offset();
        assert!(offset.whole_hours().abs() <= 14);
    }
}
