//! Translation storage backed by a directory of per-language JSON files.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use ignore::WalkBuilder;
use serde_json::Value;

use super::json_edit::set_value_in_json_text;
use super::{
    FullSaveRequest,
    KeySaveRequest,
    LoadResponse,
    StorageError,
    TranslationStorage,
};
use crate::config::{
    EditorSettings,
    TranslationFileMatcher,
};
use crate::tree::{
    LanguageTree,
    PathCodec,
};

/// Storage over `<translation dir>/<language>.json` files.
///
/// Full saves rewrite each file as pretty JSON. Key saves edit the files in place
/// and keep unrelated formatting and key order.
#[derive(Debug, Clone)]
pub struct FsStorage {
    matcher: TranslationFileMatcher,
    main_lang: String,
    codec: PathCodec,
}

impl FsStorage {
    /// Storage over `translation_dir` with default file patterns and separator.
    ///
    /// # Errors
    /// `Pattern` if the default patterns fail to build.
    pub fn new(
        translation_dir: impl Into<PathBuf>,
        main_lang: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let settings = EditorSettings { main_language: main_lang.into(), ..EditorSettings::default() };
        let matcher = TranslationFileMatcher::new(translation_dir.into(), &settings)?;
        Ok(Self { matcher, main_lang: settings.main_language, codec: PathCodec::default() })
    }

    /// Storage configured from workspace settings.
    ///
    /// # Errors
    /// `Pattern` if `filePattern` or `excludePatterns` is not a valid glob.
    pub fn from_settings(workspace_root: &Path, settings: &EditorSettings) -> Result<Self, StorageError> {
        let matcher =
            TranslationFileMatcher::new(settings.translation_path(workspace_root), settings)?;
        Ok(Self { matcher, main_lang: settings.main_language.clone(), codec: settings.codec() })
    }

    #[must_use]
    pub fn translation_dir(&self) -> &Path {
        self.matcher.translation_dir()
    }

    /// Language code → file, for every translation file in the directory.
    fn find_translation_files(&self) -> Result<BTreeMap<String, PathBuf>, StorageError> {
        let dir = self.translation_dir();
        if !dir.is_dir() {
            return Err(StorageError::InvalidLayout(format!(
                "translation directory '{}' does not exist",
                dir.display()
            )));
        }

        let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
        for result in WalkBuilder::new(dir)
            .max_depth(Some(1))
            .hidden(false)
            .git_ignore(true)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if !self.matcher.is_translation_file(path) {
                continue;
            }
            let Some(language) = TranslationFileMatcher::language_of(path) else {
                tracing::warn!(path = %path.display(), "Skipping file without a language name");
                continue;
            };

            if let Some(existing) = files.get(&language) {
                tracing::warn!(
                    language = %language,
                    kept = %existing.display(),
                    skipped = %path.display(),
                    "Duplicate translation file for language"
                );
                continue;
            }
            files.insert(language, path.to_path_buf());
        }

        Ok(files)
    }

    /// Where `language` is written: its existing file, or `<language>.json`.
    ///
    /// A new file name must stay inside the translation directory, so codes that are
    /// empty, `.`/`..`, or contain a path separator are refused.
    fn file_for(
        &self,
        files: &BTreeMap<String, PathBuf>,
        language: &str,
    ) -> Result<PathBuf, StorageError> {
        if let Some(path) = files.get(language) {
            return Ok(path.clone());
        }
        if language.is_empty()
            || language == "."
            || language == ".."
            || language.contains(['/', '\\'])
        {
            return Err(StorageError::InvalidLayout(format!(
                "'{language}' cannot be used as a translation file name"
            )));
        }
        Ok(self.translation_dir().join(format!("{language}.json")))
    }

    async fn read_translation_file(
        language: &str,
        path: &Path,
    ) -> Result<(String, LanguageTree), StorageError> {
        let content = tokio::fs::read_to_string(path).await?;
        let value: Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            return Err(StorageError::InvalidLayout(format!(
                "root of '{}' is not a JSON object",
                path.display()
            )));
        }
        let tree: LanguageTree = serde_json::from_value(value)?;
        tracing::debug!(language = %language, path = %path.display(), "Read translation file");
        Ok((language.to_string(), tree))
    }

    async fn read_or_empty(path: &Path) -> Result<String, StorageError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok("{}".to_string()),
            Err(err) => Err(err.into()),
        }
    }
}

impl TranslationStorage for FsStorage {
    async fn load(&self) -> Result<LoadResponse, StorageError> {
        let files = self.find_translation_files()?;
        tracing::debug!(dir = %self.translation_dir().display(), files = files.len(), "Loading translations");

        let futures = files.iter().map(|(language, path)| Self::read_translation_file(language, path));
        let translations = futures::future::join_all(futures)
            .await
            .into_iter()
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(LoadResponse { translations, all_keys: None, main_lang: self.main_lang.clone() })
    }

    async fn save_all(&self, request: &FullSaveRequest) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(self.translation_dir()).await?;
        let files = self.find_translation_files()?;

        let mut writes = Vec::with_capacity(request.translations.len());
        for (language, tree) in &request.translations {
            let mut content = serde_json::to_string_pretty(tree)?;
            content.push('\n');
            writes.push((self.file_for(&files, language)?, content));
        }

        futures::future::try_join_all(
            writes.iter().map(|(path, content)| tokio::fs::write(path, content)),
        )
        .await?;

        tracing::debug!(languages = writes.len(), "Wrote translation files");
        Ok(())
    }

    async fn save_key(&self, request: &KeySaveRequest) -> Result<(), StorageError> {
        let path = self.codec.decode(&request.key)?;
        tokio::fs::create_dir_all(self.translation_dir()).await?;
        let files = self.find_translation_files()?;

        // Edit every file before writing any, so a broken file aborts the whole save
        let mut writes = Vec::with_capacity(request.values.len());
        for (language, value) in &request.values {
            let file = self.file_for(&files, language)?;
            let text = Self::read_or_empty(&file).await?;
            let edited = set_value_in_json_text(&text, &path, value).ok_or_else(|| {
                StorageError::InvalidLayout(format!(
                    "cannot set '{}' in '{}'",
                    request.key,
                    file.display()
                ))
            })?;
            writes.push((file, edited));
        }

        futures::future::try_join_all(
            writes.iter().map(|(file, content)| tokio::fs::write(file, content)),
        )
        .await?;

        tracing::debug!(key = %request.key, languages = writes.len(), "Edited translation files");
        Ok(())
    }
}
