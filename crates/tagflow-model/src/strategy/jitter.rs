use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// How random jitter is applied to retry delays.
///
/// Jitter spreads retries over time so that many clients failing at once do
/// not hammer the server in lockstep. This enum only names the policy; the
/// sampling math lives with the transport that consumes it.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JitterStrategy {
    /// Deterministic delays, no randomness.
    None,
    /// Delay sampled uniformly from `[0, base]`.
    #[default]
    Full,
    /// Delay sampled from `[base/2, base]`.
    Equal,
}

impl FromStr for JitterStrategy {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(JitterStrategy::None),
            "full" | "default" => Ok(JitterStrategy::Full),
            "equal" => Ok(JitterStrategy::Equal),
            other => Err(ModelError::UnknownJitter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_strategies() {
        assert_eq!("none".parse::<JitterStrategy>().unwrap(), JitterStrategy::None);
        assert_eq!("".parse::<JitterStrategy>().unwrap(), JitterStrategy::None);
        assert_eq!("Full".parse::<JitterStrategy>().unwrap(), JitterStrategy::Full);
        assert_eq!("EQUAL".parse::<JitterStrategy>().unwrap(), JitterStrategy::Equal);
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!("gaussian".parse::<JitterStrategy>().is_err());
    }

    #[test]
    fn default_is_full() {
        assert_eq!(JitterStrategy::default(), JitterStrategy::Full);
    }
}
