//! Suite runner configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use uiverify_common::VerificationConfig;

use crate::error::E2eResult;
use crate::playwright::PlaywrightConfig;
use crate::visual::VisualConfig;

/// Everything `uiverify run` needs, loadable from `uiverify.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Directory searched for `*.yaml` / `*.yml` check specs
    pub specs_dir: PathBuf,

    /// Where `uiverify-results.json` is written
    pub output_dir: PathBuf,

    pub playwright: PlaywrightConfig,

    pub visual: VisualConfig,

    pub verification: VerificationConfig,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            specs_dir: PathBuf::from("tests/specs"),
            output_dir: PathBuf::from("test-results"),
            playwright: PlaywrightConfig::default(),
            visual: VisualConfig::default(),
            verification: VerificationConfig::default(),
        }
    }
}

impl E2eConfig {
    /// Load configuration from file; a missing file yields the defaults.
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> E2eResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}
