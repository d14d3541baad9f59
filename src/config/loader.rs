//! Reading `.translation-grid.json` from a workspace.

use std::io::ErrorKind;
use std::path::Path;

use super::{
    ConfigError,
    EditorSettings,
};

/// Name of the settings file looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".translation-grid.json";

/// Settings from the workspace's config file, or `None` when it has none.
///
/// Fields missing from the file take their defaults.
///
/// # Errors
/// `IoError` if the file exists but cannot be read, `ParseError` if it is not valid JSON
/// for [`EditorSettings`].
pub(super) fn read_workspace_settings(
    workspace_root: &Path,
) -> Result<Option<EditorSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "No workspace settings file");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let settings = serde_json::from_str(&content)?;
    tracing::debug!(path = %config_path.display(), ?settings, "Read workspace settings");
    Ok(Some(settings))
}
