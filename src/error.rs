//! Errors surfaced by [`crate::EditorSession`].

use thiserror::Error;

use crate::storage::StorageError;
use crate::store::SaveScope;
use crate::tree::KeyError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Failed to load translations: {0}")]
    LoadFailure(#[source] StorageError),

    /// Unsaved edits in `scope` are still marked dirty and can be saved again.
    #[error("Failed to save {scope}: {source}")]
    SaveFailure {
        scope: SaveScope,
        #[source]
        source: StorageError,
    },
}
