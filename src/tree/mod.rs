//! Nested translation trees and their flat, separator-joined form.

/// Flat key and key path conversion
mod codec;
/// Tree flattening and rebuilding
mod flatten;
/// Tree and flat map types
mod types;

pub use codec::{
    DEFAULT_SEPARATOR,
    KeyError,
    PathCodec,
};
pub use flatten::{
    find_prefix_collision,
    flatten,
    unflatten,
};
pub use types::{
    FlatKey,
    FlatLanguageMap,
    KeyPath,
    LanguageTree,
    LeafValue,
    Node,
};
