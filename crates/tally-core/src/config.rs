//! Engine configuration.
//!
//! すべてのフィールドに既定値があるので、空の JSON（`{}`）でも有効。
//!
//! ```json
//! {
//!   "default_owner": "admin",
//!   "min_options": 2,
//!   "policy": { "max_votes": "hard_cap", "duplicate_votes": "reject_repeat_voter" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::domain::{DEFAULT_MIN_OPTIONS, VotePolicy};
use crate::impls::DEFAULT_OWNER;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IdentityResolver を注入しないときの作成者・投票者
    pub default_owner: String,
    /// CreatePoll が要求する最小の選択肢数
    pub min_options: usize,
    pub policy: VotePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_owner: DEFAULT_OWNER.to_string(),
            min_options: DEFAULT_MIN_OPTIONS,
            policy: VotePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_owner.trim().is_empty() {
            return Err(ConfigError::Invalid("default_owner must not be empty".into()));
        }
        if self.min_options == 0 {
            return Err(ConfigError::Invalid("min_options must be at least 1".into()));
        }
        Ok(())
    }
}
