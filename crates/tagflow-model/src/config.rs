use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ModelError;

/// Where the injected control is inserted relative to existing dock entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before all existing entries.
    Top,
    /// After all existing entries.
    Bottom,
}

impl Default for InsertPosition {
    fn default() -> Self {
        Self::Top
    }
}

impl FromStr for InsertPosition {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(ModelError::UnknownPosition(s.to_string())),
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InsertPosition::Top => "top",
            InsertPosition::Bottom => "bottom",
        };
        f.write_str(s)
    }
}

impl Serialize for InsertPosition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for InsertPosition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Options recognized by the missing-entry completion feature.
///
/// Loaded once per activation and merged over the defaults below: missing
/// fields take their default, unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutomationConfig {
    /// Create missing entries without an explicit per-activation trigger.
    pub auto_create: bool,
    /// Ask for confirmation before any batch action.
    pub require_confirmation: bool,
    /// Where the injected control is placed.
    pub position: InsertPosition,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            auto_create: false,
            require_confirmation: true,
            position: InsertPosition::default(),
        }
    }
}

/// Pacing for the dual-queue run loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Delay between queue items, and the dialog-open latency after a
    /// create activation.
    pub step_delay_ms: u64,
    /// Delay after tag resolution, letting the host reflect newly created
    /// tags before linking starts.
    pub settle_delay_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 500,
            settle_delay_ms: 2_000,
        }
    }
}

impl RunnerConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
