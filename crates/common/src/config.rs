//! Verification configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::locale::NumberLocale;

/// Settings shared by every verification context in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Capture a screenshot when a condition fails or errors
    pub capture_diagnostics: bool,

    /// Locale used to render numbers in descriptions and diagnostics
    pub locale: NumberLocale,

    /// Where screenshots are written
    pub screenshot_dir: PathBuf,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            capture_diagnostics: true,
            locale: NumberLocale::en_us(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
        }
    }
}

impl VerificationConfig {
    /// Load configuration from file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VerificationConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, VerificationConfig::default());
        assert!(config.capture_diagnostics);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("uiverify.toml");
        let config = VerificationConfig {
            capture_diagnostics: false,
            locale: NumberLocale::de_de(),
            screenshot_dir: PathBuf::from("shots"),
        };
        config.save(&path).unwrap();
        assert_eq!(VerificationConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: VerificationConfig = toml::from_str("locale = \"fr-FR\"\n").unwrap();
        assert_eq!(config.locale, NumberLocale::fr_fr());
        assert!(config.capture_diagnostics);
    }

    #[test]
    fn test_unknown_locale_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "locale = \"xx-YY\"\n").unwrap();
        assert!(matches!(
            VerificationConfig::load(&path),
            Err(Error::TomlParse(_))
        ));
    }
}
