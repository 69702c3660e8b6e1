//! Note entity, storage record and backlink set.
//!
//! # Invariants
//! - `name` is non-blank and never changes once the note exists.
//! - `backlinks` holds each name at most once, in first-insertion order.
//! - `last_modified`/`recent_index` are owned by the repository; values
//!   supplied by callers are overwritten on save.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Insertion-ordered set of note names.
///
/// Persisted as a plain sequence; duplicates are dropped on construction and
/// on insert, so the uniqueness invariant holds regardless of input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct NameSet(Vec<String>);

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless already present. Returns whether it was added.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// Removes `name`. Removing a non-member is a no-op.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|member| member != name);
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|member| member == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for NameSet {
    fn from(value: Vec<String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<NameSet> for Vec<String> {
    fn from(value: NameSet) -> Self {
        value.0
    }
}

impl FromIterator<String> for NameSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// Validation failures for the note shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `name` is empty or whitespace only.
    EmptyName,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "note name must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Rejects names that are empty or whitespace only.
pub fn validate_name(name: &str) -> Result<(), NoteValidationError> {
    if name.trim().is_empty() {
        return Err(NoteValidationError::EmptyName);
    }
    Ok(())
}

/// The persisted note.
///
/// Deserializes from request payloads where only `name` is required; every
/// other field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier and display title.
    pub name: String,
    /// Markdown body, sanitized before every persist.
    #[serde(default)]
    pub content: String,
    /// Outgoing link names as declared by the author. May hold duplicates or
    /// empty entries until reconciliation filters them.
    #[serde(default)]
    pub links: Vec<String>,
    /// Names of notes that link here.
    #[serde(default)]
    pub backlinks: NameSet,
    /// RFC 3339 UTC timestamp of the last write.
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub is_public: bool,
    /// Epoch seconds of the last write; recency ordering only.
    #[serde(default)]
    pub recent_index: f64,
}

impl Note {
    /// Creates a private note with no links or backlinks.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            links: Vec::new(),
            backlinks: NameSet::new(),
            last_modified: String::new(),
            is_public: false,
            recent_index: 0.0,
        }
    }

    /// Creates a stub materialized because `linked_from` started linking to it.
    pub fn linked_stub(
        name: impl Into<String>,
        content: impl Into<String>,
        linked_from: impl Into<String>,
    ) -> Self {
        let mut note = Self::new(name, content);
        note.backlinks.insert(linked_from);
        note
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_name(&self.name)
    }

    /// Normalizes a raw storage record into a note.
    ///
    /// This is the only place where absent storage values are defaulted.
    pub fn from_record(record: NoteRecord) -> Self {
        Self {
            name: record.name,
            content: record.content.unwrap_or_default(),
            links: record.links.unwrap_or_default(),
            backlinks: record.backlinks.map(NameSet::from).unwrap_or_default(),
            last_modified: record.last_modified.unwrap_or_default(),
            is_public: record.is_public,
            recent_index: record.recent_index.unwrap_or_default(),
        }
    }

    /// Converts the note into its storage record.
    pub fn to_record(&self) -> NoteRecord {
        NoteRecord {
            name: self.name.clone(),
            content: Some(self.content.clone()),
            links: Some(self.links.clone()),
            backlinks: Some(self.backlinks.as_slice().to_vec()),
            last_modified: Some(self.last_modified.clone()),
            is_public: self.is_public,
            recent_index: Some(self.recent_index),
        }
    }
}

/// Loosely-typed record as held by a note store.
///
/// Stores may omit list, content and timestamp values; see
/// [`Note::from_record`] for the defaulting rules.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRecord {
    pub name: String,
    pub content: Option<String>,
    pub links: Option<Vec<String>>,
    pub backlinks: Option<Vec<String>>,
    pub last_modified: Option<String>,
    pub is_public: bool,
    pub recent_index: Option<f64>,
}
