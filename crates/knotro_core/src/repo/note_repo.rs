//! Note repository and backlink reconciliation.
//!
//! # Responsibility
//! - Create notes on first read and stamp every write.
//! - Reconcile target backlinks when a note's outgoing links change.
//! - Provide substring search and recency listing over the store.
//!
//! # Invariants
//! - `save` touches exactly one record.
//! - `reconcile_and_save` applies all removals before any addition.
//! - Backlink updates are read-modify-write per target without locking; two
//!   concurrent reconciliations on one target can lose an update.
//! - Storage failures propagate without retry or rollback; a failure halfway
//!   through reconciliation leaves earlier targets updated.

use crate::clock::{epoch_seconds, format_timestamp, Clock, SystemClock};
use crate::links::link_diff;
use crate::model::key::derive_key;
use crate::model::note::{validate_name, Note, NoteValidationError};
use crate::model::placeholder::Placeholders;
use crate::sanitize::{ContentSanitizer, MarkupSanitizer};
use crate::store::{FieldContains, NoteField, NoteStore, StoreError};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Cap of the recent-notes listing.
pub const RECENT_NOTES_LIMIT: usize = 10;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note reads, writes and reconciliation.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Note repository over an injected store.
pub struct NoteRepository<S: NoteStore> {
    store: S,
    sanitizer: Box<dyn ContentSanitizer>,
    clock: Box<dyn Clock>,
    placeholders: Placeholders,
}

impl<S: NoteStore> NoteRepository<S> {
    /// Uses the markup sanitizer, wall clock and default placeholders.
    pub fn new(store: S) -> Self {
        Self {
            store,
            sanitizer: Box::new(MarkupSanitizer),
            clock: Box::new(SystemClock),
            placeholders: Placeholders::default(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: impl ContentSanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current time according to the repository clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Loads a note without creating it.
    pub fn get(&self, name: &str) -> RepoResult<Option<Note>> {
        let record = self.store.get(&derive_key(name))?;
        Ok(record.map(Note::from_record))
    }

    /// Loads a note, materializing and persisting a placeholder stub when
    /// none is stored yet.
    pub fn get_or_create(&self, name: &str) -> RepoResult<Note> {
        validate_name(name)?;
        if let Some(note) = self.get(name)? {
            return Ok(note);
        }

        let created = self.save(Note::new(name, self.placeholders.pick()))?;
        info!(
            "event=note_create module=repo status=ok key={}",
            derive_key(name)
        );
        Ok(created)
    }

    /// Sanitizes, stamps and persists one note.
    ///
    /// The returned note is rebuilt from the written record, so it reflects
    /// exactly what was stored.
    pub fn save(&self, mut note: Note) -> RepoResult<Note> {
        note.validate()?;
        let now = self.clock.now();
        note.content = self.sanitizer.sanitize(&note.content);
        note.last_modified = format_timestamp(now);
        note.recent_index = epoch_seconds(now);

        let key = derive_key(&note.name);
        let record = note.to_record();
        self.store.put(&record, &key)?;
        debug!("event=note_save module=repo status=ok key={key}");
        Ok(Note::from_record(record))
    }

    /// Persists `incoming` and reconciles the backlinks of every note it
    /// started or stopped linking to.
    ///
    /// Backlinks of `incoming` itself are kept from storage when the note
    /// already exists; callers cannot overwrite them.
    pub fn reconcile_and_save(&self, mut incoming: Note) -> RepoResult<Note> {
        incoming.validate()?;
        let started_at = Instant::now();
        let source = incoming.name.clone();

        let stored = self.get(&source)?;
        let old_links = match stored {
            Some(stored) => {
                incoming.backlinks = stored.backlinks;
                stored.links
            }
            None => Vec::new(),
        };
        let removed = link_diff(&old_links, &incoming.links);
        let added = link_diff(&incoming.links, &old_links);

        for target in &removed {
            self.unlink(target, &source)?;
        }
        if removed.contains(&source) {
            incoming.backlinks.remove(&source);
        }

        let saved = self.save(incoming)?;

        for target in &added {
            self.link_or_create(target, &source)?;
        }

        info!(
            "event=note_reconcile module=repo status=ok key={} added={} removed={} duration_ms={}",
            derive_key(&source),
            added.len(),
            removed.len(),
            started_at.elapsed().as_millis()
        );
        Ok(saved)
    }

    /// Sets the public flag. Returns `None` without writing when the note
    /// does not exist.
    pub fn set_public(&self, name: &str, is_public: bool) -> RepoResult<Option<Note>> {
        let Some(mut note) = self.get(name)? else {
            return Ok(None);
        };
        note.is_public = is_public;
        self.save(note).map(Some)
    }

    /// Names of notes whose name or content contains `term`.
    ///
    /// Matching is case-sensitive; result order is implementation-defined.
    pub fn search(&self, term: &str) -> RepoResult<Vec<String>> {
        let filters = [
            FieldContains::new(NoteField::Name, term),
            FieldContains::new(NoteField::Content, term),
        ];
        let names = self
            .store
            .fetch_all(&filters)?
            .into_iter()
            .map(|record| record.name)
            .collect::<Vec<_>>();
        info!(
            "event=note_search module=repo status=ok term_len={} hits={}",
            term.chars().count(),
            names.len()
        );
        Ok(names)
    }

    /// Names of the `limit` most recently saved notes, newest first.
    pub fn recent(&self, limit: usize) -> RepoResult<Vec<String>> {
        let mut notes = self
            .store
            .fetch_all(&[])?
            .into_iter()
            .map(Note::from_record)
            .collect::<Vec<_>>();
        notes.sort_by(|a, b| b.recent_index.total_cmp(&a.recent_index));
        Ok(notes.into_iter().take(limit).map(|note| note.name).collect())
    }

    /// Removes a note record. Does not touch other notes' links or
    /// backlinks.
    pub fn delete(&self, name: &str) -> RepoResult<bool> {
        let key = derive_key(name);
        let existed = self.store.delete(&key)?;
        info!("event=note_delete module=repo status=ok key={key} existed={existed}");
        Ok(existed)
    }

    fn unlink(&self, target: &str, source: &str) -> RepoResult<()> {
        if let Some(mut note) = self.get(target)? {
            note.backlinks.remove(source);
            self.save(note)?;
        }
        Ok(())
    }

    fn link_or_create(&self, target: &str, source: &str) -> RepoResult<()> {
        match self.get(target)? {
            Some(mut note) => {
                note.backlinks.insert(source);
                self.save(note)?;
            }
            None => {
                self.save(Note::linked_stub(target, self.placeholders.pick(), source))?;
                info!(
                    "event=backlink_stub module=repo status=ok key={}",
                    derive_key(target)
                );
            }
        }
        Ok(())
    }
}
