mod env;

pub use env::{EnvConfig, DEBUG_VAR};

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CanvasFlowError, Result};
use crate::runtime::{DEFAULT_SPACING, DEFAULT_STEP_DELAY};
use crate::state::FlowStore;

pub const DATA_DIR_VAR: &str = "CANVASFLOW_DATA_DIR";
pub const STORAGE_KEY_VAR: &str = "CANVASFLOW_STORAGE_KEY";
pub const STEP_DELAY_VAR: &str = "CANVASFLOW_STEP_DELAY_MS";
pub const DEFAULT_SPACING_VAR: &str = "CANVASFLOW_DEFAULT_SPACING";

/// 运行配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub step_delay_ms: u64,
    pub default_spacing: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".canvasflow"),
            storage_key: FlowStore::DEFAULT_KEY.to_string(),
            step_delay_ms: DEFAULT_STEP_DELAY.as_millis() as u64,
            default_spacing: DEFAULT_SPACING,
        }
    }
}

impl FlowConfig {
    /// Defaults overridden by `CANVASFLOW_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            CanvasFlowError::Config(format!("cannot read `{}`: {err}", path.display()))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn merge_env(mut self) -> Result<Self> {
        if let Some(dir) = EnvConfig::get_env_optional(DATA_DIR_VAR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = EnvConfig::get_env_optional(STORAGE_KEY_VAR) {
            self.storage_key = key;
        }
        if let Some(delay) = EnvConfig::get_parsed::<u64>(STEP_DELAY_VAR)? {
            self.step_delay_ms = delay;
        }
        if let Some(spacing) = EnvConfig::get_parsed::<f64>(DEFAULT_SPACING_VAR)? {
            self.default_spacing = spacing;
        }
        Ok(self)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}
