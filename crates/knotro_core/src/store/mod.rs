//! Key-value note store contract.
//!
//! # Responsibility
//! - Define the storage collaborator consumed by the note repository.
//! - Keep record encoding and query details behind the `NoteStore` seam.
//!
//! # Invariants
//! - Every single-key `get`/`put`/`delete` is atomic; sequences of calls are
//!   not.
//! - `fetch` filters are OR-combined; an empty filter list matches all
//!   records.
//! - Pages are ordered by key and resumed strictly after the `last` cursor.

use crate::db::DbError;
use crate::model::note::NoteRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteNoteStore;

/// Page size used when draining a full `fetch`.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// A persisted record cannot be decoded.
    InvalidData(String),
    /// Backend-specific failure not covered above.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "note store connection not migrated: expected schema {expected_version}, found {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Backend(message) => write!(f, "note store failure: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Searchable text field of a note record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Name,
    Content,
}

/// `field?contains` filter expression: case-sensitive substring match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContains {
    pub field: NoteField,
    pub value: String,
}

impl FieldContains {
    pub fn new(field: NoteField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// One page of fetched records with their storage keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchPage {
    pub items: Vec<(String, NoteRecord)>,
    /// Cursor for the next page; `None` when this page is the last one.
    pub last: Option<String>,
}

/// Storage collaborator for note records.
pub trait NoteStore {
    fn get(&self, key: &str) -> StoreResult<Option<NoteRecord>>;
    /// Inserts or replaces the record stored under `key`.
    fn put(&self, record: &NoteRecord, key: &str) -> StoreResult<()>;
    /// Removes the record under `key`. Returns whether one existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;
    /// Returns one page of records matching any of `filters`, starting after
    /// `cursor`.
    fn fetch(
        &self,
        filters: &[FieldContains],
        cursor: Option<&str>,
        page_size: u32,
    ) -> StoreResult<FetchPage>;

    /// Drains every page of `fetch`.
    fn fetch_all(&self, filters: &[FieldContains]) -> StoreResult<Vec<NoteRecord>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.fetch(filters, cursor.as_deref(), DEFAULT_PAGE_SIZE)?;
            records.extend(page.items.into_iter().map(|(_, record)| record));
            match page.last {
                Some(last) => cursor = Some(last),
                None => return Ok(records),
            }
        }
    }
}

impl<S: NoteStore + ?Sized> NoteStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<NoteRecord>> {
        (**self).get(key)
    }

    fn put(&self, record: &NoteRecord, key: &str) -> StoreResult<()> {
        (**self).put(record, key)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        (**self).delete(key)
    }

    fn fetch(
        &self,
        filters: &[FieldContains],
        cursor: Option<&str>,
        page_size: u32,
    ) -> StoreResult<FetchPage> {
        (**self).fetch(filters, cursor, page_size)
    }
}
