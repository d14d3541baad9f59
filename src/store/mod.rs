//! Editable translation set and its save protocol.

/// Unsaved edit tracking
mod dirty;
/// Translation store
mod translation_store;

pub use dirty::{
    DirtyMark,
    DirtyTracker,
    SaveScope,
    SaveTicket,
};
pub use translation_store::TranslationStore;
