//! Storage boundary payloads and errors.

use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::config::MatcherError;
use crate::tree::{
    FlatKey,
    KeyError,
    LanguageTree,
    LeafValue,
};

/// Snapshot handed over by storage on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub translations: BTreeMap<String, LanguageTree>,

    /// Flat keys as storage sees them. Only a hint: the store recomputes the key set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_keys: Option<Vec<FlatKey>>,

    pub main_lang: String,
}

/// Whole-document save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullSaveRequest {
    pub translations: BTreeMap<String, LanguageTree>,
}

/// Single-key save across languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySaveRequest {
    pub key: FlatKey,
    pub values: BTreeMap<String, LeafValue>,
}

/// Defines errors that may occur while talking to translation storage
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access translation storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse translation data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Data has an unexpected shape (e.g. a translation file whose root is not an object)
    #[error("Invalid translation layout: {0}")]
    InvalidLayout(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Pattern(#[from] MatcherError),

    /// Storage refused the write
    #[error("Storage rejected the request: {0}")]
    Rejected(String),
}
