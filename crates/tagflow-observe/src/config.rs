use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::{LogFormat, LogLevel, LogTimeZone};

/// Logging configuration, merged over defaults via serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter expression, e.g. `"info"` or `"tagflow_core=debug,info"`.
    pub level: LogLevel,
    /// Timezone used for timestamps.
    pub tz: LogTimeZone,
    /// Include module targets in output.
    pub with_targets: bool,
    /// Colored output (only honored when stdout is a terminal).
    pub use_color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::default(),
            tz: LogTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LogConfig {
    /// Color is used only when enabled and stdout is actually a terminal.
    /// Checked at init time, not parse time.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
