//! In-memory translation set with edit tracking.

use std::borrow::Cow;
use std::collections::{
    BTreeMap,
    BTreeSet,
};

use super::dirty::{
    DirtyMark,
    DirtyTracker,
    SaveScope,
    SaveTicket,
};
use crate::tree::{
    FlatKey,
    FlatLanguageMap,
    KeyError,
    LanguageTree,
    LeafValue,
    PathCodec,
    find_prefix_collision,
    flatten,
    unflatten,
};

/// Every language's flattened translations plus the union of their keys.
///
/// The store is the single owner of the edit state: `load` it from a storage
/// snapshot, mutate it with [`TranslationStore::set_value`], and persist through
/// [`TranslationStore::begin_save`] / [`TranslationStore::commit_save`].
#[derive(Debug, Clone)]
pub struct TranslationStore {
    codec: PathCodec,
    main_language: String,
    /// Language code → flat map
    translations: BTreeMap<String, FlatLanguageMap>,
    /// Union of every language's keys
    keys: BTreeSet<FlatKey>,
    dirty: DirtyTracker,
}

impl TranslationStore {
    /// Builds a store from nested per-language trees using the default `.` separator.
    ///
    /// # Errors
    /// `InvalidSegment` if a tree key cannot be flattened.
    pub fn load(
        snapshot: BTreeMap<String, LanguageTree>,
        main_language: impl Into<String>,
    ) -> Result<Self, KeyError> {
        Self::load_with_codec(snapshot, main_language, PathCodec::default())
    }

    /// Builds a store from nested per-language trees.
    ///
    /// # Errors
    /// `InvalidSegment` if a tree key cannot be flattened.
    pub fn load_with_codec(
        snapshot: BTreeMap<String, LanguageTree>,
        main_language: impl Into<String>,
        codec: PathCodec,
    ) -> Result<Self, KeyError> {
        let mut translations = BTreeMap::new();
        for (language, tree) in &snapshot {
            let flat = flatten(tree, &codec)?;
            tracing::debug!(language = %language, keys = flat.len(), "Flattened translations");
            translations.insert(language.clone(), flat);
        }

        let keys = translations.values().flat_map(|flat| flat.keys().cloned()).collect();

        Ok(Self {
            codec,
            main_language: main_language.into(),
            translations,
            keys,
            dirty: DirtyTracker::new(),
        })
    }

    #[must_use]
    pub const fn codec(&self) -> &PathCodec {
        &self.codec
    }

    #[must_use]
    pub fn main_language(&self) -> &str {
        &self.main_language
    }

    /// Languages in display order: main language first when present, the rest by code.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = Vec::with_capacity(self.translations.len());
        if self.translations.contains_key(&self.main_language) {
            languages.push(&self.main_language);
        }
        languages.extend(
            self.translations.keys().map(String::as_str).filter(|lang| *lang != self.main_language),
        );
        languages
    }

    #[must_use]
    pub fn has_language(&self, language: &str) -> bool {
        self.translations.contains_key(language)
    }

    /// The global key set, in key order.
    #[must_use]
    pub const fn keys(&self) -> &BTreeSet<FlatKey> {
        &self.keys
    }

    #[must_use]
    pub fn language_map(&self, language: &str) -> Option<&FlatLanguageMap> {
        self.translations.get(language)
    }

    #[must_use]
    pub fn leaf(&self, language: &str, key: &str) -> Option<&LeafValue> {
        self.translations.get(language).and_then(|flat| flat.get(key))
    }

    /// Text of a cell; an untranslated cell is the empty string.
    #[must_use]
    pub fn get_value(&self, language: &str, key: &str) -> Cow<'_, str> {
        self.leaf(language, key).map_or(Cow::Borrowed(""), LeafValue::as_text)
    }

    /// Writes one cell and marks it dirty.
    ///
    /// Unknown languages and keys are created.
    ///
    /// # Errors
    /// `InvalidKey` if `key` is malformed, or if it would be both a value and a parent
    /// of other keys in `language` (e.g. setting `a` while `a.b` exists).
    pub fn set_value(
        &mut self,
        language: &str,
        key: &str,
        value: impl Into<LeafValue>,
    ) -> Result<(), KeyError> {
        self.codec.validate_key(key)?;
        if let Some(flat) = self.translations.get(language)
            && let Some(existing) = find_prefix_collision(flat, key, &self.codec)
        {
            return Err(KeyError::invalid_key(
                key,
                format!("collides with existing key '{existing}' in '{language}'"),
            ));
        }

        let value = value.into();
        tracing::debug!(language = %language, key = %key, "Set translation value");
        self.translations.entry(language.to_string()).or_default().insert(key.to_string(), value);
        if !self.keys.contains(key) {
            self.keys.insert(key.to_string());
        }
        self.dirty.mark(language, key);
        Ok(())
    }

    #[must_use]
    pub fn list_dirty(&self) -> BTreeSet<DirtyMark> {
        self.dirty.marks().collect()
    }

    #[must_use]
    pub fn is_dirty(&self, language: &str, key: &str) -> bool {
        self.dirty.contains(language, key)
    }

    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Nested trees of every language, for a whole-document save.
    ///
    /// # Errors
    /// `InvalidKey` if a language map cannot be rebuilt into a tree.
    pub fn build_full_save_payload(&self) -> Result<BTreeMap<String, LanguageTree>, KeyError> {
        self.translations
            .iter()
            .map(|(language, flat)| unflatten(flat, &self.codec).map(|tree| (language.clone(), tree)))
            .collect()
    }

    /// Current values of `key` in every language that has it, for a single-row save.
    ///
    /// # Errors
    /// `InvalidKey` if `key` is malformed or present in no language.
    pub fn build_key_save_payload(&self, key: &str) -> Result<BTreeMap<String, LeafValue>, KeyError> {
        self.codec.validate_key(key)?;
        if !self.keys.contains(key) {
            return Err(KeyError::invalid_key(key, "key is not present in any language"));
        }

        Ok(self
            .translations
            .iter()
            .filter_map(|(language, flat)| flat.get(key).map(|value| (language.clone(), value.clone())))
            .collect())
    }

    /// Snapshots the dirty marks `scope` covers at request time.
    pub fn begin_save(&self, scope: SaveScope) -> SaveTicket {
        let ticket = self.dirty.snapshot(scope);
        tracing::debug!(scope = %ticket.scope(), marks = ticket.len(), "Begin save");
        ticket
    }

    /// Clears the marks captured by `ticket` after storage confirmed the save.
    ///
    /// Returns how many marks were cleared. Marks added or re-edited after the
    /// ticket was taken are kept.
    pub fn commit_save(&mut self, ticket: &SaveTicket) -> usize {
        let cleared = self.dirty.clear_snapshot(ticket);
        tracing::debug!(
            scope = %ticket.scope(),
            cleared,
            remaining = self.dirty.len(),
            "Commit save"
        );
        cleared
    }
}
