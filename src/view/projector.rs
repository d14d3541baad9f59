//! Row projection of the translation store for table-style presentation.

use std::cmp::Ordering;
use std::collections::{
    BTreeMap,
    BTreeSet,
};

use serde::Serialize;

use crate::store::TranslationStore;
use crate::tree::FlatKey;

/// One table row: a key and its text in each requested language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub key: FlatKey,
    /// Language → cell text (empty when untranslated)
    pub values: BTreeMap<String, String>,
    /// Languages whose cell has unsaved edits
    pub dirty_languages: BTreeSet<String>,
}

impl Row {
    #[must_use]
    pub fn value(&self, language: &str) -> &str {
        self.values.get(language).map_or("", String::as_str)
    }

    #[must_use]
    pub fn is_dirty(&self, language: &str) -> bool {
        self.dirty_languages.contains(language)
    }
}

/// Column a projection is sorted by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Key,
    Language(String),
}

impl From<&str> for SortColumn {
    /// `"key"` is the key column; anything else names a language.
    ///
    /// A language whose code is literally `key` needs `SortColumn::Language`.
    fn from(column: &str) -> Self {
        if column == "key" { Self::Key } else { Self::Language(column.to_string()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn new(column: impl Into<SortColumn>, direction: SortDirection) -> Self {
        Self { column: column.into(), direction }
    }
}

impl From<String> for SortColumn {
    fn from(column: String) -> Self {
        Self::from(column.as_str())
    }
}

/// Project the store into filtered, sorted rows.
///
/// - `filter` matches case-insensitively against the key or any listed language's
///   text; an empty filter keeps every key.
/// - Rows start in key order and are sorted stably, so rows with equal sort values
///   keep their key order in both directions.
#[must_use]
pub fn project_rows<S: AsRef<str>>(
    store: &TranslationStore,
    languages: &[S],
    filter: &str,
    sort: &SortSpec,
) -> Vec<Row> {
    let needle = filter.to_lowercase();

    let mut rows: Vec<Row> = store
        .keys()
        .iter()
        .filter(|key| needle.is_empty() || matches_filter(store, languages, key, &needle))
        .map(|key| build_row(store, languages, key))
        .collect();

    match &sort.column {
        SortColumn::Key => rows.sort_by(|a, b| sort.direction.apply(a.key.cmp(&b.key))),
        SortColumn::Language(language) => rows.sort_by(|a, b| {
            sort.direction
                .apply(store.get_value(language, &a.key).cmp(&store.get_value(language, &b.key)))
        }),
    }

    rows
}

/// Project every language of the store in display order.
#[must_use]
pub fn project_all(store: &TranslationStore, filter: &str, sort: &SortSpec) -> Vec<Row> {
    project_rows(store, &store.languages(), filter, sort)
}

fn matches_filter<S: AsRef<str>>(
    store: &TranslationStore,
    languages: &[S],
    key: &str,
    needle: &str,
) -> bool {
    key.to_lowercase().contains(needle)
        || languages
            .iter()
            .any(|lang| store.get_value(lang.as_ref(), key).to_lowercase().contains(needle))
}

fn build_row<S: AsRef<str>>(store: &TranslationStore, languages: &[S], key: &str) -> Row {
    let values = languages
        .iter()
        .map(|lang| (lang.as_ref().to_string(), store.get_value(lang.as_ref(), key).into_owned()))
        .collect();
    let dirty_languages = languages
        .iter()
        .map(AsRef::as_ref)
        .filter(|lang| store.is_dirty(lang, key))
        .map(str::to_string)
        .collect();

    Row { key: key.to_string(), values, dirty_languages }
}
