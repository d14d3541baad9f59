//! File pattern matcher for translation files.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use super::EditorSettings;

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid translation file pattern '{pattern}': {source}")]
    InvalidTranslationPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Matches files of the translation directory against the configured glob patterns.
#[derive(Debug, Clone)]
pub struct TranslationFileMatcher {
    translation_dir: PathBuf,
    include_set: GlobSet,
    exclude_set: GlobSet,
}

impl TranslationFileMatcher {
    /// Creates a new matcher from settings.
    pub fn new(translation_dir: PathBuf, settings: &EditorSettings) -> Result<Self, MatcherError> {
        let include_set =
            Self::build_glob_set(std::slice::from_ref(&settings.file_pattern), |pattern, source| {
                MatcherError::InvalidTranslationPattern { pattern, source }
            })?;

        let exclude_set = Self::build_glob_set(&settings.exclude_patterns, |pattern, source| {
            MatcherError::InvalidExcludePattern { pattern, source }
        })?;

        Ok(Self { translation_dir, include_set, exclude_set })
    }

    fn build_glob_set<F>(patterns: &[String], make_error: F) -> Result<GlobSet, MatcherError>
    where
        F: Fn(String, globset::Error) -> MatcherError,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| make_error(pattern.clone(), e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }

    #[must_use]
    pub fn translation_dir(&self) -> &Path {
        &self.translation_dir
    }

    /// Returns true if the path matches `filePattern` but not `excludePatterns`.
    ///
    /// The path must be absolute and directly inside the translation directory.
    #[must_use]
    pub fn is_translation_file(&self, absolute_path: &Path) -> bool {
        let Some(relative_path) = absolute_path.strip_prefix(&self.translation_dir).ok() else {
            return false;
        };

        self.is_translation_file_relative(relative_path)
    }

    /// Returns true if the path matches `filePattern` but not `excludePatterns`.
    ///
    /// The path must be relative to the translation directory.
    #[must_use]
    pub fn is_translation_file_relative(&self, relative_path: &Path) -> bool {
        self.include_set.is_match(relative_path) && !self.exclude_set.is_match(relative_path)
    }

    /// Language code a translation file holds: its file stem (`locales/en.json` → `en`).
    #[must_use]
    pub fn language_of(path: &Path) -> Option<String> {
        path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string)
    }
}
