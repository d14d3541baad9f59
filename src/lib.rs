//! translation-grid
//!
//! Edit nested per-language translation trees as one flat, sortable, filterable table,
//! tracking unsaved cells and saving them back without losing edits made mid-save.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use translation_grid::store::TranslationStore;
//! use translation_grid::tree::LanguageTree;
//!
//! let snapshot: BTreeMap<String, LanguageTree> = serde_json::from_str(
//!     r#"{ "en": { "a": { "b": "Hi" } }, "fr": {} }"#,
//! )?;
//! let mut store = TranslationStore::load(snapshot, "en")?;
//! store.set_value("fr", "a.b", "Salut")?;
//!
//! let payload = serde_json::to_value(store.build_full_save_payload()?)?;
//! assert_eq!(payload["fr"]["a"]["b"], "Salut");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod store;
pub mod tree;
pub mod view;

#[cfg(test)]
mod test_utils;

pub use error::EditorError;
pub use session::EditorSession;
