//! Core domain logic for knotro, a personal wiki with backlinks.
//! This crate is the single source of truth for note consistency.

pub mod clock;
pub mod config;
pub mod db;
pub mod links;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sanitize;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use links::extract_wikilinks;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::key::{decode_key, derive_key, KeyError};
pub use model::note::{validate_name, NameSet, Note, NoteRecord, NoteValidationError};
pub use model::placeholder::Placeholders;
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, RECENT_NOTES_LIMIT};
pub use sanitize::{ContentSanitizer, MarkupSanitizer, NoopSanitizer};
pub use service::note_service::{
    daily_note_name, NoteService, NoteUpsert, NoteView, PublicNoteView,
};
pub use store::{
    FetchPage, FieldContains, NoteField, NoteStore, SqliteNoteStore, StoreError, StoreResult,
};
