//! Unsaved edit tracking.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::tree::FlatKey;

/// A cell edited in memory and not yet confirmed saved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DirtyMark {
    pub language: String,
    pub key: FlatKey,
}

impl DirtyMark {
    #[must_use]
    pub fn new(language: impl Into<String>, key: impl Into<FlatKey>) -> Self {
        Self { language: language.into(), key: key.into() }
    }
}

impl fmt::Display for DirtyMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.language, self.key)
    }
}

/// What a save request covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveScope {
    /// Every language, whole trees.
    All,
    /// One key across every language.
    Key(FlatKey),
}

impl fmt::Display for SaveScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all translations"),
            Self::Key(key) => write!(f, "key '{key}'"),
        }
    }
}

/// Dirty marks captured when a save request was built.
///
/// Committing the ticket clears exactly these marks at exactly the revisions seen,
/// so edits made while the request is in flight stay dirty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a save ticket does nothing until it is committed"]
pub struct SaveTicket {
    scope: SaveScope,
    marks: Vec<(DirtyMark, u64)>,
}

impl SaveTicket {
    pub const fn scope(&self) -> &SaveScope {
        &self.scope
    }

    pub fn marks(&self) -> impl Iterator<Item = &DirtyMark> {
        self.marks.iter().map(|(mark, _)| mark)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// Records which `(language, key)` cells changed since the last successful save.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    /// Language → key → revision of its latest edit
    marks: BTreeMap<String, BTreeMap<FlatKey, u64>>,
    /// Monotonic edit counter
    revision: u64,
}

impl DirtyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a cell dirty. Marking it again bumps its revision.
    pub fn mark(&mut self, language: &str, key: &str) {
        self.revision += 1;
        self.marks.entry(language.to_string()).or_default().insert(key.to_string(), self.revision);
    }

    #[must_use]
    pub fn contains(&self, language: &str, key: &str) -> bool {
        self.revision_of(language, key).is_some()
    }

    fn revision_of(&self, language: &str, key: &str) -> Option<u64> {
        self.marks.get(language).and_then(|keys| keys.get(key)).copied()
    }

    /// Every mark, ordered by language then key.
    pub fn marks(&self) -> impl Iterator<Item = DirtyMark> + '_ {
        self.marks.iter().flat_map(|(language, keys)| {
            keys.keys().map(move |key| DirtyMark::new(language.as_str(), key.as_str()))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Captures the marks `scope` covers right now.
    pub fn snapshot(&self, scope: SaveScope) -> SaveTicket {
        let marks = self
            .marks
            .iter()
            .flat_map(|(language, keys)| {
                let covered: Vec<(&FlatKey, &u64)> = match &scope {
                    SaveScope::All => keys.iter().collect(),
                    SaveScope::Key(key) => keys.get_key_value(key).into_iter().collect(),
                };
                covered.into_iter().map(move |(key, revision)| {
                    (DirtyMark::new(language.as_str(), key.as_str()), *revision)
                })
            })
            .collect();
        SaveTicket { scope, marks }
    }

    /// Clears the ticket's marks that were not edited again since the snapshot.
    ///
    /// Returns how many marks were cleared.
    pub fn clear_snapshot(&mut self, ticket: &SaveTicket) -> usize {
        let mut cleared = 0;
        for (mark, seen) in &ticket.marks {
            let Some(keys) = self.marks.get_mut(&mark.language) else {
                continue;
            };
            if keys.get(&mark.key) == Some(seen) {
                keys.remove(&mark.key);
                cleared += 1;
                if keys.is_empty() {
                    self.marks.remove(&mark.language);
                }
            }
        }
        cleared
    }
}
