//! Load → edit → save orchestration over a shared store.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{
    Mutex,
    MutexGuard,
};

use crate::error::EditorError;
use crate::storage::{
    FullSaveRequest,
    KeySaveRequest,
    StorageError,
    TranslationStorage,
};
use crate::store::{
    SaveScope,
    TranslationStore,
};
use crate::tree::{
    LeafValue,
    PathCodec,
};
use crate::view::{
    Row,
    SortSpec,
    project_all,
};

/// A translation store bound to the storage it was loaded from.
///
/// Clones share the same store. Saves hold the store lock only while building the
/// request and while committing, never across the storage call, so edits made
/// while a save is in flight land in the store and stay dirty.
pub struct EditorSession<S> {
    store: Arc<Mutex<TranslationStore>>,
    storage: Arc<S>,
}

impl<S> Clone for EditorSession<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), storage: Arc::clone(&self.storage) }
    }
}

impl<S> std::fmt::Debug for EditorSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("store", &"<Mutex<TranslationStore>>")
            .field("storage", &std::any::type_name::<S>())
            .finish()
    }
}

impl<S: TranslationStorage> EditorSession<S> {
    /// Loads every language from `storage`.
    ///
    /// # Errors
    /// `LoadFailure` if storage fails or hands over trees that cannot be flattened.
    pub async fn open(storage: S, codec: PathCodec) -> Result<Self, EditorError> {
        let response = storage.load().await.map_err(EditorError::LoadFailure)?;

        let store =
            TranslationStore::load_with_codec(response.translations, response.main_lang, codec)
                .map_err(|e| EditorError::LoadFailure(StorageError::Key(e)))?;

        if let Some(hint) = &response.all_keys {
            let hinted: BTreeSet<&str> = hint.iter().map(String::as_str).collect();
            let computed: BTreeSet<&str> = store.keys().iter().map(String::as_str).collect();
            if hinted != computed {
                tracing::debug!(
                    hinted = hinted.len(),
                    computed = computed.len(),
                    "Storage key list differs from loaded trees, using loaded trees"
                );
            }
        }

        tracing::debug!(
            languages = store.languages().len(),
            keys = store.keys().len(),
            main_language = %store.main_language(),
            "Opened translation session"
        );

        Ok(Self { store: Arc::new(Mutex::new(store)), storage: Arc::new(storage) })
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Locks the store for reads or edits that bypass the session.
    pub async fn lock(&self) -> MutexGuard<'_, TranslationStore> {
        self.store.lock().await
    }

    /// # Errors
    /// `Key` if the key is malformed or collides with an existing key.
    pub async fn set_value(
        &self,
        language: &str,
        key: &str,
        value: impl Into<LeafValue>,
    ) -> Result<(), EditorError> {
        self.store.lock().await.set_value(language, key, value)?;
        Ok(())
    }

    pub async fn get_value(&self, language: &str, key: &str) -> String {
        self.store.lock().await.get_value(language, key).into_owned()
    }

    /// Rows of every language in display order.
    pub async fn rows(&self, filter: &str, sort: &SortSpec) -> Vec<Row> {
        project_all(&*self.store.lock().await, filter, sort)
    }

    pub async fn dirty_count(&self) -> usize {
        self.store.lock().await.dirty_count()
    }

    /// Saves every language's whole tree.
    ///
    /// Returns how many dirty marks the save cleared.
    ///
    /// # Errors
    /// - `Key` if a language cannot be rebuilt into a tree
    /// - `SaveFailure` if storage fails; every dirty mark is kept
    pub async fn save_all(&self) -> Result<usize, EditorError> {
        let (request, ticket) = {
            let store = self.store.lock().await;
            let translations = store.build_full_save_payload()?;
            (FullSaveRequest { translations }, store.begin_save(SaveScope::All))
        };

        if let Err(source) = self.storage.save_all(&request).await {
            tracing::error!(error = %source, "Failed to save translations");
            return Err(EditorError::SaveFailure { scope: ticket.scope().clone(), source });
        }

        Ok(self.store.lock().await.commit_save(&ticket))
    }

    /// Saves one key's current values across languages.
    ///
    /// Returns how many dirty marks the save cleared.
    ///
    /// # Errors
    /// - `Key` if the key is malformed or not present in any language
    /// - `SaveFailure` if storage fails; every dirty mark is kept
    pub async fn save_key(&self, key: &str) -> Result<usize, EditorError> {
        let (request, ticket) = {
            let store = self.store.lock().await;
            let values = store.build_key_save_payload(key)?;
            (
                KeySaveRequest { key: key.to_string(), values },
                store.begin_save(SaveScope::Key(key.to_string())),
            )
        };

        if let Err(source) = self.storage.save_key(&request).await {
            tracing::error!(key = %key, error = %source, "Failed to save translation key");
            return Err(EditorError::SaveFailure { scope: ticket.scope().clone(), source });
        }

        Ok(self.store.lock().await.commit_save(&ticket))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use googletest::prelude::*;
    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::storage::{
        LoadResponse,
        MemoryStorage,
    };
    use crate::store::DirtyMark;
    use crate::test_utils::{
        snapshot,
        tree,
    };

    fn memory() -> MemoryStorage {
        MemoryStorage::new(
            snapshot(json!({ "en": { "a": { "b": "Hi" } }, "fr": {} })),
            "en",
        )
    }

    /// Memory storage whose saves wait until the test releases them.
    #[derive(Clone)]
    struct GatedStorage {
        inner: MemoryStorage,
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl GatedStorage {
        fn new(inner: MemoryStorage) -> Self {
            Self { inner, started: Arc::new(Notify::new()), release: Arc::new(Notify::new()) }
        }

        async fn gate(&self) {
            self.started.notify_one();
            self.release.notified().await;
        }
    }

    impl TranslationStorage for GatedStorage {
        async fn load(&self) -> std::result::Result<LoadResponse, StorageError> {
            self.inner.load().await
        }

        async fn save_all(&self, request: &FullSaveRequest) -> std::result::Result<(), StorageError> {
            self.gate().await;
            self.inner.save_all(request).await
        }

        async fn save_key(&self, request: &KeySaveRequest) -> std::result::Result<(), StorageError> {
            self.gate().await;
            self.inner.save_key(request).await
        }
    }

    #[tokio::test]
    async fn open_loads_store_from_storage() {
        let session = EditorSession::open(memory(), PathCodec::default()).await.unwrap();

        assert_that!(session.get_value("en", "a.b").await, eq("Hi"));
        assert_that!(session.get_value("fr", "a.b").await, eq(""));
        assert_that!(session.dirty_count().await, eq(0));
        assert_eq!(session.lock().await.languages(), vec!["en", "fr"]);
    }

    #[tokio::test]
    async fn open_reports_unflattenable_trees_as_load_failure() {
        let storage = MemoryStorage::new(snapshot(json!({ "en": { "a.b": "dotted" } })), "en");

        let result = EditorSession::open(storage, PathCodec::default()).await;

        assert!(matches!(result, Err(EditorError::LoadFailure(StorageError::Key(_)))));
    }

    #[tokio::test]
    async fn save_all_persists_and_clears_marks() {
        let storage = memory();
        let session = EditorSession::open(storage.clone(), PathCodec::default()).await.unwrap();
        session.set_value("fr", "a.b", "Salut").await.unwrap();

        let cleared = session.save_all().await.unwrap();

        assert_that!(cleared, eq(1));
        assert_that!(session.dirty_count().await, eq(0));
        assert_eq!(storage.snapshot().await["fr"], tree(json!({ "a": { "b": "Salut" } })));
    }

    #[tokio::test]
    async fn save_key_clears_only_that_key() {
        let storage = memory();
        let session = EditorSession::open(storage.clone(), PathCodec::default()).await.unwrap();
        session.set_value("fr", "a.b", "Salut").await.unwrap();
        session.set_value("en", "c", "See").await.unwrap();

        let cleared = session.save_key("a.b").await.unwrap();

        assert_that!(cleared, eq(1));
        assert_eq!(session.lock().await.list_dirty(), BTreeSet::from([DirtyMark::new("en", "c")]));
        let saved = storage.snapshot().await;
        assert_eq!(saved["fr"], tree(json!({ "a": { "b": "Salut" } })));
        assert_eq!(saved["en"], tree(json!({ "a": { "b": "Hi" } })));
    }

    #[tokio::test]
    async fn failed_save_keeps_every_mark() {
        let session = EditorSession::open(memory(), PathCodec::default()).await.unwrap();
        session.set_value("fr", "a.b", "Salut").await.unwrap();
        session.storage().fail_saves(true);

        let result = session.save_all().await;

        assert!(matches!(result, Err(EditorError::SaveFailure { scope: SaveScope::All, .. })));
        assert_that!(session.dirty_count().await, eq(1));

        session.storage().fail_saves(false);
        assert_that!(session.save_all().await.unwrap(), eq(1));
        assert_that!(session.dirty_count().await, eq(0));
    }

    #[tokio::test]
    async fn failed_key_save_names_the_key() {
        let storage = memory();
        let session = EditorSession::open(storage.clone(), PathCodec::default()).await.unwrap();
        session.set_value("fr", "a.b", "Salut").await.unwrap();
        storage.fail_saves(true);

        let error = session.save_key("a.b").await.unwrap_err();

        assert_that!(error.to_string(), contains_substring("key 'a.b'"));
        assert_that!(session.lock().await.is_dirty("fr", "a.b"), eq(true));
    }

    #[tokio::test]
    async fn save_key_rejects_unknown_key() {
        let session = EditorSession::open(memory(), PathCodec::default()).await.unwrap();

        let result = session.save_key("missing").await;

        assert!(matches!(result, Err(EditorError::Key(_))));
    }

    #[tokio::test]
    async fn edits_during_an_in_flight_save_stay_dirty() {
        let storage = GatedStorage::new(memory());
        let session = EditorSession::open(storage.clone(), PathCodec::default()).await.unwrap();
        session.set_value("en", "k1", "one").await.unwrap();

        let saver = {
            let session = session.clone();
            tokio::spawn(async move { session.save_all().await })
        };
        storage.started.notified().await;
        session.set_value("en", "k2", "two").await.unwrap();
        session.set_value("en", "k1", "one again").await.unwrap();
        storage.release.notify_one();

        let cleared = saver.await.unwrap().unwrap();

        assert_that!(cleared, eq(0));
        assert_eq!(
            session.lock().await.list_dirty(),
            BTreeSet::from([DirtyMark::new("en", "k1"), DirtyMark::new("en", "k2")])
        );
        let saved = storage.inner.snapshot().await;
        assert_eq!(saved["en"], tree(json!({ "a": { "b": "Hi" }, "k1": "one" })));
    }

    #[tokio::test]
    async fn new_key_during_in_flight_key_save_stays_dirty() {
        let storage = GatedStorage::new(memory());
        let session = EditorSession::open(storage.clone(), PathCodec::default()).await.unwrap();
        session.set_value("fr", "a.b", "Salut").await.unwrap();

        let saver = {
            let session = session.clone();
            tokio::spawn(async move { session.save_key("a.b").await })
        };
        storage.started.notified().await;
        session.set_value("fr", "z", "Zut").await.unwrap();
        storage.release.notify_one();

        assert_that!(saver.await.unwrap().unwrap(), eq(1));
        assert_eq!(session.lock().await.list_dirty(), BTreeSet::from([DirtyMark::new("fr", "z")]));
    }

    #[tokio::test]
    async fn rows_reflect_edits() {
        let session = EditorSession::open(memory(), PathCodec::default()).await.unwrap();
        session.set_value("fr", "a.b", "Salut").await.unwrap();

        let rows = session.rows("salut", &SortSpec::default()).await;

        assert_that!(rows.len(), eq(1));
        assert_that!(rows[0].value("fr"), eq("Salut"));
        assert_that!(rows[0].is_dirty("fr"), eq(true));
        let values: BTreeMap<&str, &str> =
            rows[0].values.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(values, BTreeMap::from([("en", "Hi"), ("fr", "Salut")]));
    }
}
