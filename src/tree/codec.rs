//! Mapping between flat keys (`a.b.c`) and key paths (`["a", "b", "c"]`).

use thiserror::Error;

use super::types::{
    FlatKey,
    KeyPath,
};

/// Separator used by stored translation files. Changing it breaks compatibility
/// with trees flattened by other tools.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Malformed keys or key segments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// A tree key (one path segment) that cannot be encoded.
    #[error("Invalid key segment '{segment}': {reason}")]
    InvalidSegment { segment: String, reason: String },

    /// A flat key that cannot be decoded or placed in a tree.
    #[error("Invalid translation key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

impl KeyError {
    pub(crate) fn invalid_segment(segment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSegment { segment: segment.into(), reason: reason.into() }
    }

    pub(crate) fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into(), reason: reason.into() }
    }
}

/// Encodes key paths into flat keys and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCodec {
    separator: String,
}

impl Default for PathCodec {
    fn default() -> Self {
        Self { separator: DEFAULT_SEPARATOR.to_string() }
    }
}

impl PathCodec {
    /// Creates a codec for `separator`.
    ///
    /// An empty separator cannot split anything; it falls back to [`DEFAULT_SEPARATOR`].
    #[must_use]
    pub fn new(separator: impl Into<String>) -> Self {
        let separator = separator.into();
        if separator.is_empty() {
            tracing::warn!("Empty key separator, using '{DEFAULT_SEPARATOR}'");
            return Self::default();
        }
        Self { separator }
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Joins `path` into a flat key.
    ///
    /// # Errors
    /// `InvalidSegment` if the path is empty or a segment is empty or contains the separator.
    pub fn encode<S: AsRef<str>>(&self, path: &[S]) -> Result<FlatKey, KeyError> {
        if path.is_empty() {
            return Err(KeyError::invalid_segment("", "a key path needs at least one segment"));
        }
        for segment in path {
            self.check_segment(segment.as_ref())?;
        }
        Ok(path.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join(&self.separator))
    }

    /// Splits `key` into its path.
    ///
    /// # Errors
    /// `InvalidKey` on an empty key or an empty segment (leading, trailing or doubled separator).
    pub fn decode(&self, key: &str) -> Result<KeyPath, KeyError> {
        self.validate_key(key)?;
        Ok(key.split(self.separator.as_str()).map(str::to_string).collect())
    }

    /// Checks that `key` decodes, without building the path.
    ///
    /// # Errors
    /// Same as [`PathCodec::decode`].
    pub fn validate_key(&self, key: &str) -> Result<(), KeyError> {
        if key.is_empty() {
            return Err(KeyError::invalid_key(key, "key is empty"));
        }
        if key.split(self.separator.as_str()).any(str::is_empty) {
            return Err(KeyError::invalid_key(
                key,
                format!("empty segment (leading, trailing or doubled '{}')", self.separator),
            ));
        }
        Ok(())
    }

    /// Checks that `segment` can be one element of a key path.
    ///
    /// # Errors
    /// `InvalidSegment` if the segment is empty or contains the separator.
    pub fn check_segment(&self, segment: &str) -> Result<(), KeyError> {
        if segment.is_empty() {
            return Err(KeyError::invalid_segment(segment, "segment is empty"));
        }
        if segment.contains(self.separator.as_str()) {
            return Err(KeyError::invalid_segment(
                segment,
                format!("segment contains the key separator '{}'", self.separator),
            ));
        }
        Ok(())
    }

    /// Appends an already validated segment to an already validated key.
    pub(crate) fn join(&self, prefix: &str, segment: &str) -> FlatKey {
        format!("{prefix}{}{segment}", self.separator)
    }

    /// Whether `child_key` lies strictly below `parent_key` in the tree.
    #[must_use]
    pub fn is_descendant(&self, child_key: &str, parent_key: &str) -> bool {
        let Some(remainder) = child_key.strip_prefix(parent_key) else {
            return false;
        };

        remainder.len() > self.separator.len() && remainder.starts_with(self.separator.as_str())
    }
}
