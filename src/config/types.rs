use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::tree::PathCodec;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "excludePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    /// Directory holding one translation file per language, relative to the workspace root.
    pub translation_dir: String,

    /// Glob matched against file names inside `translationDir`.
    pub file_pattern: String,

    /// Files in `translationDir` to skip even if they match `filePattern`.
    pub exclude_patterns: Vec<String>,

    /// Language shown first and used as the reference column.
    pub main_language: String,

    pub key_separator: String,
}

impl EditorSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Invalid separator
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if self.main_language.is_empty() {
            errors.push(ValidationError::new(
                "mainLanguage",
                "The main language cannot be empty. Example: \"en\"",
            ));
        }

        if self.translation_dir.is_empty() {
            errors.push(ValidationError::new(
                "translationDir",
                "The directory cannot be empty. Example: \"locales\"",
            ));
        }

        if self.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "filePattern",
                "The pattern cannot be empty. Example: \"*.json\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.file_pattern) {
            errors.push(ValidationError::new(
                "filePattern",
                format!("Invalid glob pattern '{}': {e}", self.file_pattern),
            ));
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Codec for this workspace's key separator.
    #[must_use]
    pub fn codec(&self) -> PathCodec {
        PathCodec::new(self.key_separator.clone())
    }

    /// Absolute translation directory for `workspace_root`.
    #[must_use]
    pub fn translation_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.translation_dir)
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            translation_dir: "locales".to_string(),
            file_pattern: "*.json".to_string(),
            exclude_patterns: Vec::new(),
            main_language: "en".to_string(),
            key_separator: ".".to_string(),
        }
    }
}
