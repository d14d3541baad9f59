//! Fixtures shared by the unit tests.
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use serde_json::Value;

use crate::store::TranslationStore;
use crate::tree::{
    FlatLanguageMap,
    LanguageTree,
    LeafValue,
};

/// `LanguageTree` from a JSON object
pub(crate) fn tree(json: Value) -> LanguageTree {
    serde_json::from_value(json).unwrap()
}

/// Per-language trees from `{ lang: tree }` JSON
pub(crate) fn snapshot(json: Value) -> BTreeMap<String, LanguageTree> {
    serde_json::from_value(json).unwrap()
}

/// `FlatLanguageMap` of string leaves
pub(crate) fn flat_map(entries: &[(&str, &str)]) -> FlatLanguageMap {
    entries.iter().map(|(key, value)| ((*key).to_string(), LeafValue::from(*value))).collect()
}

/// `TranslationStore` loaded from `{ lang: tree }` JSON with the default separator
pub(crate) fn store(json: Value, main_language: &str) -> TranslationStore {
    TranslationStore::load(snapshot(json), main_language).unwrap()
}
