//! Translation tree and flat map types.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use serde_json::Value;

/// Separator-joined path identifying one leaf (e.g. `common.hello`).
pub type FlatKey = String;

/// Segments of a [`FlatKey`], root first.
pub type KeyPath = Vec<String>;

/// Flattened translations of a single language.
pub type FlatLanguageMap = BTreeMap<FlatKey, LeafValue>;

/// Nested translations of a single language. The root is always an object.
pub type LanguageTree = BTreeMap<String, Node>;

/// A node of a translation tree.
///
/// Anything that is not a JSON object is a leaf, arrays included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Object(BTreeMap<String, Node>),
    Leaf(LeafValue),
}

impl Node {
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// Terminal value of a translation tree.
///
/// Translations are strings, but numbers, booleans, `null` and arrays found in
/// existing files are kept verbatim so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LeafValue(Value);

impl LeafValue {
    /// Wraps a JSON value, refusing objects (those are tree nodes, not leaves).
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        if value.is_object() { None } else { Some(Self(value)) }
    }

    #[must_use]
    pub const fn as_json(&self) -> &Value {
        &self.0
    }

    /// Text shown in a table cell: the string itself, or compact JSON for other values.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match &self.0 {
            Value::String(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl Default for LeafValue {
    fn default() -> Self {
        Self(Value::String(String::new()))
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl<'de> Deserialize<'de> for LeafValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).ok_or_else(|| D::Error::custom("a leaf value cannot be an object"))
    }
}
