#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use knotro_core::{
    derive_key, FetchPage, FieldContains, ManualClock, NoteRecord, NoteRepository, NoteStore,
    Placeholders, SqliteNoteStore, StoreError, StoreResult,
};
use rusqlite::Connection;
use std::cell::Cell;

pub const PLACEHOLDER: &str = "nothing here yet";

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Repository over the connection with a one-second-step clock and a fixed
/// placeholder.
pub fn repo(conn: &Connection) -> NoteRepository<SqliteNoteStore<'_>> {
    configure(NoteRepository::new(SqliteNoteStore::try_new(conn).unwrap()))
}

pub fn configure<S: NoteStore>(repo: NoteRepository<S>) -> NoteRepository<S> {
    repo.with_clock(ManualClock::starting_at(start(), Duration::seconds(1)))
        .with_placeholders(Placeholders::fixed(PLACEHOLDER))
}

pub fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Store wrapper that counts writes and can fail writes to one note.
pub struct ProbeStore<S> {
    inner: S,
    puts: Cell<usize>,
    failing_key: Option<String>,
}

impl<S: NoteStore> ProbeStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            puts: Cell::new(0),
            failing_key: None,
        }
    }

    pub fn failing_on(inner: S, note_name: &str) -> Self {
        Self {
            failing_key: Some(derive_key(note_name)),
            ..Self::new(inner)
        }
    }

    pub fn puts(&self) -> usize {
        self.puts.get()
    }
}

impl<S: NoteStore> NoteStore for ProbeStore<S> {
    fn get(&self, key: &str) -> StoreResult<Option<NoteRecord>> {
        self.inner.get(key)
    }

    fn put(&self, record: &NoteRecord, key: &str) -> StoreResult<()> {
        if self.failing_key.as_deref() == Some(key) {
            return Err(StoreError::Backend(format!("injected failure for {key}")));
        }
        self.puts.set(self.puts.get() + 1);
        self.inner.put(record, key)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        self.inner.delete(key)
    }

    fn fetch(
        &self,
        filters: &[FieldContains],
        cursor: Option<&str>,
        page_size: u32,
    ) -> StoreResult<FetchPage> {
        self.inner.fetch(filters, cursor, page_size)
    }
}
