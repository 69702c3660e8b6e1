//! Note use-case service.
//!
//! # Responsibility
//! - Serve the private read path (fetch-or-create plus recent notes) and the
//!   public read path (public notes only).
//! - Turn upsert payloads into reconciled saves, deriving links from
//!   `[[wikilinks]]` when the payload carries none.
//! - Expose visibility, search, recent, home and administrative operations.
//!
//! # Invariants
//! - The public path reports missing and private notes identically.
//! - Recent listings are capped at `RECENT_NOTES_LIMIT`.

use crate::links::extract_wikilinks;
use crate::model::note::{NameSet, Note};
use crate::repo::note_repo::{NoteRepository, RepoResult, RECENT_NOTES_LIMIT};
use crate::store::NoteStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Note as returned on the private read path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub base_url: String,
    /// Most recently saved note names, newest first.
    pub recent_notes: Vec<String>,
}

/// Note as returned on the public read path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicNoteView {
    pub name: String,
    pub content: String,
    pub links: Vec<String>,
    pub backlinks: NameSet,
    pub last_modified: String,
    pub base_url: String,
}

/// Upsert payload for one note.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteUpsert {
    pub name: String,
    #[serde(default)]
    pub content: String,
    /// Declared outgoing links. Derived from content when absent.
    #[serde(default)]
    pub links: Option<Vec<String>>,
    /// Visibility. The stored flag is kept when absent.
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Note service facade over the repository.
pub struct NoteService<S: NoteStore> {
    repo: NoteRepository<S>,
    base_url: String,
}

impl<S: NoteStore> NoteService<S> {
    pub fn new(repo: NoteRepository<S>, base_url: impl Into<String>) -> Self {
        Self {
            repo,
            base_url: base_url.into(),
        }
    }

    pub fn repo(&self) -> &NoteRepository<S> {
        &self.repo
    }

    /// Fetch-or-create read used by the note editor.
    pub fn read_note(&self, name: &str) -> RepoResult<NoteView> {
        let note = self.repo.get_or_create(name)?;
        let recent_notes = self.repo.recent(RECENT_NOTES_LIMIT)?;
        Ok(NoteView {
            note,
            base_url: self.base_url.clone(),
            recent_notes,
        })
    }

    /// Returns the note only when it exists and is public.
    pub fn read_public_note(&self, name: &str) -> RepoResult<Option<PublicNoteView>> {
        let view = self
            .repo
            .get(name)?
            .filter(|note| note.is_public)
            .map(|note| PublicNoteView {
                name: note.name,
                content: note.content,
                links: note.links,
                backlinks: note.backlinks,
                last_modified: note.last_modified,
                base_url: self.base_url.clone(),
            });
        Ok(view)
    }

    /// Saves content/links and reconciles backlinks of affected notes.
    pub fn upsert_note(&self, upsert: NoteUpsert) -> RepoResult<Note> {
        let links = upsert
            .links
            .unwrap_or_else(|| extract_wikilinks(&upsert.content));
        let is_public = match upsert.is_public {
            Some(flag) => flag,
            None => self
                .repo
                .get(&upsert.name)?
                .is_some_and(|stored| stored.is_public),
        };

        let mut note = Note::new(upsert.name, upsert.content);
        note.links = links;
        note.is_public = is_public;
        self.repo.reconcile_and_save(note)
    }

    /// Toggles visibility. `None` when the note does not exist.
    pub fn set_public(&self, name: &str, is_public: bool) -> RepoResult<Option<Note>> {
        self.repo.set_public(name, is_public)
    }

    pub fn search(&self, term: &str) -> RepoResult<Vec<String>> {
        self.repo.search(term)
    }

    pub fn recent_notes(&self) -> RepoResult<Vec<String>> {
        self.repo.recent(RECENT_NOTES_LIMIT)
    }

    /// Name of the note the home page opens: today's daily note.
    pub fn home_note_name(&self) -> String {
        daily_note_name(self.repo.now())
    }

    /// Administrative lookup that never creates a note.
    pub fn admin_get(&self, name: &str) -> RepoResult<Option<Note>> {
        self.repo.get(name)
    }

    /// Administrative delete. Other notes keep their links to `name`.
    pub fn admin_delete(&self, name: &str) -> RepoResult<bool> {
        self.repo.delete(name)
    }
}

/// Daily note name (`YYYY-MM-DD`) for the UTC date of `at`.
pub fn daily_note_name(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
