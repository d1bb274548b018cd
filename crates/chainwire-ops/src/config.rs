//! Client configuration.
//!
//! Everything here has a default, so `{}` is a valid config file:
//!
//! ```json
//! {
//!   "chain_id": 77658366,
//!   "period_to_live": 10,
//!   "poll_interval_ms": 500,
//!   "finalization_timeout_ms": 60000,
//!   "gas_margin_percent": 10,
//!   "deployer_bytecode": "0061736d01000000...",
//!   "log": { "level": "debug", "json": true }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PERIOD_TO_LIVE;
use crate::error::OperationError;
use crate::tracing_setup::LogConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Chain id mixed into signatures. `None` asks the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Periods an operation stays valid when the caller gives none.
    #[serde(default = "default_period_to_live")]
    pub period_to_live: u64,
    /// Delay between two status polls while waiting for execution.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Give up waiting for execution after this long.
    #[serde(default = "default_finalization_timeout_ms")]
    pub finalization_timeout_ms: u64,
    /// Safety margin added on top of an estimated gas cost.
    #[serde(default = "default_gas_margin_percent")]
    pub gas_margin_percent: u64,
    /// Hex of the deployer bytecode used by `deploy_sc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployer_bytecode: Option<String>,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_period_to_live() -> u64 { DEFAULT_PERIOD_TO_LIVE }
fn default_poll_interval_ms() -> u64 { 500 }
fn default_finalization_timeout_ms() -> u64 { 60_000 }
fn default_gas_margin_percent() -> u64 { 10 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chain_id: None,
            period_to_live: default_period_to_live(),
            poll_interval_ms: default_poll_interval_ms(),
            finalization_timeout_ms: default_finalization_timeout_ms(),
            gas_margin_percent: default_gas_margin_percent(),
            deployer_bytecode: None,
            log: LogConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, OperationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| OperationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, OperationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| OperationError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), OperationError> {
        if self.poll_interval_ms == 0 {
            return Err(OperationError::Config("poll_interval_ms must be positive".into()));
        }
        if self.finalization_timeout_ms < self.poll_interval_ms {
            return Err(OperationError::Config(
                "finalization_timeout_ms must be at least poll_interval_ms".into(),
            ));
        }
        if let Some(hex) = &self.deployer_bytecode {
            decode_hex(hex)?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn finalization_timeout(&self) -> Duration {
        Duration::from_millis(self.finalization_timeout_ms)
    }

    /// Decoded deployer bytecode, if configured.
    pub fn deployer_bytecode(&self) -> Result<Option<Vec<u8>>, OperationError> {
        self.deployer_bytecode.as_deref().map(decode_hex).transpose()
    }
}

fn decode_hex(value: &str) -> Result<Vec<u8>, OperationError> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| OperationError::Config(format!("deployer_bytecode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.period_to_live, 10);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.finalization_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn overrides_and_bytecode() {
        let config = ClientConfig::from_json(
            r#"{"chain_id": 77658366, "gas_margin_percent": 25, "deployer_bytecode": "0xdead", "log": {"json": true}}"#,
        )
        .unwrap();
        assert_eq!(config.chain_id, Some(77_658_366));
        assert_eq!(config.gas_margin_percent, 25);
        assert_eq!(config.deployer_bytecode().unwrap(), Some(vec![0xDE, 0xAD]));
        assert!(config.log.json);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_json(r#"{"poll_interval_ms": 0}"#).is_err());
        assert!(ClientConfig::from_json(r#"{"finalization_timeout_ms": 10}"#).is_err());
        assert!(ClientConfig::from_json(r#"{"deployer_bytecode": "zz"}"#).is_err());
        assert!(ClientConfig::from_json("not json").is_err());
    }
}
