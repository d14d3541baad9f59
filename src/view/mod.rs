//! Sortable, filterable row view over a [`crate::store::TranslationStore`].

/// Row projection
mod projector;

pub use projector::{
    Row,
    SortColumn,
    SortDirection,
    SortSpec,
    project_all,
    project_rows,
};
