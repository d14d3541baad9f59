//! In-memory translation storage.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

use tokio::sync::Mutex;

use super::{
    FullSaveRequest,
    KeySaveRequest,
    LoadResponse,
    StorageError,
    TranslationStorage,
};
use crate::tree::{
    LanguageTree,
    PathCodec,
    flatten,
    unflatten,
};

/// Storage that keeps the translation snapshot in memory.
///
/// Clones share the same snapshot. [`MemoryStorage::fail_saves`] makes saves
/// fail until switched back, which is what tests of failed saves need.
#[derive(Clone)]
pub struct MemoryStorage {
    snapshot: Arc<Mutex<LoadResponse>>,
    codec: PathCodec,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new(translations: BTreeMap<String, LanguageTree>, main_lang: impl Into<String>) -> Self {
        Self::with_codec(translations, main_lang, PathCodec::default())
    }

    #[must_use]
    pub fn with_codec(
        translations: BTreeMap<String, LanguageTree>,
        main_lang: impl Into<String>,
        codec: PathCodec,
    ) -> Self {
        let snapshot = LoadResponse { translations, all_keys: None, main_lang: main_lang.into() };
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            codec,
            fail_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Makes subsequent saves fail (`true`) or succeed (`false`).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The stored trees as they are now.
    pub async fn snapshot(&self) -> BTreeMap<String, LanguageTree> {
        self.snapshot.lock().await.translations.clone()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("memory storage is failing saves".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("snapshot", &"<Mutex<LoadResponse>>")
            .field("codec", &self.codec)
            .field("fail_saves", &self.fail_saves.load(Ordering::SeqCst))
            .finish()
    }
}

impl TranslationStorage for MemoryStorage {
    async fn load(&self) -> Result<LoadResponse, StorageError> {
        let snapshot = self.snapshot.lock().await;

        let mut all_keys: Vec<String> = Vec::new();
        for tree in snapshot.translations.values() {
            all_keys.extend(flatten(tree, &self.codec)?.into_keys());
        }
        all_keys.sort();
        all_keys.dedup();

        Ok(LoadResponse {
            translations: snapshot.translations.clone(),
            all_keys: Some(all_keys),
            main_lang: snapshot.main_lang.clone(),
        })
    }

    async fn save_all(&self, request: &FullSaveRequest) -> Result<(), StorageError> {
        self.check_writable()?;

        let mut snapshot = self.snapshot.lock().await;
        for (language, tree) in &request.translations {
            snapshot.translations.insert(language.clone(), tree.clone());
        }
        tracing::debug!(languages = request.translations.len(), "Saved all translations to memory");
        Ok(())
    }

    async fn save_key(&self, request: &KeySaveRequest) -> Result<(), StorageError> {
        self.check_writable()?;

        let mut snapshot = self.snapshot.lock().await;
        // Patch every language first so a bad shape leaves the snapshot untouched
        let mut patched = BTreeMap::new();
        for (language, value) in &request.values {
            let tree = snapshot.translations.get(language).cloned().unwrap_or_default();
            let mut flat = flatten(&tree, &self.codec)?;
            flat.insert(request.key.clone(), value.clone());
            patched.insert(language.clone(), unflatten(&flat, &self.codec)?);
        }
        snapshot.translations.extend(patched);
        tracing::debug!(key = %request.key, languages = request.values.len(), "Saved key to memory");
        Ok(())
    }
}
