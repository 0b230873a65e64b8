use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tagflow_client::CatalogConfig;
use tagflow_model::{AutomationConfig, RunnerConfig};
use tagflow_observe::LogConfig;

/// Top-level CLI configuration file, one section per subsystem.
///
/// Every section merges over its defaults; an empty file and a missing
/// file are both valid configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CliConfig {
    pub client: CatalogConfig,
    pub runner: RunnerConfig,
    pub automation: AutomationConfig,
    pub log: LogConfig,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}
