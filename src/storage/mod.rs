//! Persistence collaborators behind load and save.

/// JSON file directory storage
mod fs;
/// Formatting-preserving JSON edits
mod json_edit;
/// In-memory storage
mod memory;
/// Boundary payloads and errors
mod types;

use std::future::Future;

pub use fs::FsStorage;
pub use json_edit::set_value_in_json_text;
pub use memory::MemoryStorage;
pub use types::{
    FullSaveRequest,
    KeySaveRequest,
    LoadResponse,
    StorageError,
};

/// Where translations are loaded from and saved to.
///
/// Each call is one request/response; retries are up to the caller.
pub trait TranslationStorage: Send + Sync {
    /// Fetch every language's tree and the main language.
    fn load(&self) -> impl Future<Output = Result<LoadResponse, StorageError>> + Send;

    /// Persist whole trees for every language in the request.
    fn save_all(
        &self,
        request: &FullSaveRequest,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Persist one key's values for the languages in the request.
    fn save_key(
        &self,
        request: &KeySaveRequest,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
