//! Holds the validated settings in effect.

use std::path::PathBuf;

use super::{
    ConfigError,
    EditorSettings,
    loader,
};

/// Validated settings, read from the workspace and optionally overridden.
///
/// A failed load or update leaves the previous settings in place.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    current_settings: EditorSettings,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: EditorSettings::default() }
    }

    /// Reads the workspace settings file, falling back to defaults without one.
    ///
    /// # Errors
    /// `IoError` or `ParseError` for an unreadable file, `ValidationErrors` for bad values.
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!(?workspace_root, "Loading settings");

        let settings = match &workspace_root {
            Some(root) => loader::read_workspace_settings(root)?.unwrap_or_default(),
            None => EditorSettings::default(),
        };
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        tracing::debug!(settings = ?self.current_settings, "Settings loaded");
        Ok(())
    }

    /// Replaces the settings, e.g. with command-line overrides applied.
    ///
    /// # Errors
    /// `ValidationErrors` if `new_settings` is invalid.
    pub fn update_settings(&mut self, new_settings: EditorSettings) -> Result<(), ConfigError> {
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!(settings = ?self.current_settings, "Settings updated");
        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &EditorSettings {
        &self.current_settings
    }
}
