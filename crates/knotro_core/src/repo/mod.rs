//! Repository layer: the single authority for note reads and writes.
//!
//! # Responsibility
//! - Derive storage keys and round-trip notes through a `NoteStore`.
//! - Maintain backlink consistency across the note graph.
//!
//! # Invariants
//! - Request handlers never mutate storage directly.
//! - Write paths must call `Note::validate()` before touching storage.

pub mod note_repo;
