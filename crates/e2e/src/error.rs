//! Error types for the Playwright suite runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Check spec parse error: {0}")]
    SpecParse(String),

    #[error("Baseline not found: {0}")]
    BaselineNotFound(String),

    #[error("Actual screenshot not found: {0}")]
    ActualNotFound(String),

    #[error(transparent)]
    Verification(#[from] uiverify_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl E2eError {
    /// Short type name recorded as the cause of a stopped test.
    pub fn kind_name(&self) -> &'static str {
        match self {
            E2eError::PlaywrightNotFound | E2eError::Playwright(_) => "PlaywrightError",
            E2eError::SpecParse(_) | E2eError::Yaml(_) => "SpecParseError",
            E2eError::BaselineNotFound(_) | E2eError::ActualNotFound(_) => "VisualError",
            E2eError::Verification(err) => err.kind_name(),
            E2eError::Io(_) => "IoError",
            E2eError::Json(_) => "JsonError",
            E2eError::TomlParse(_) | E2eError::TomlSerialize(_) => "TomlError",
            E2eError::Image(_) => "ImageError",
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
