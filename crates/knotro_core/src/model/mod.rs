//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note shape used by repository and callers.
//! - Keep storage-record defaulting in one normalization function.
//!
//! # Invariants
//! - Every note is identified by its `name`; the storage key is derived.
//! - Loaded notes never carry absent `links`/`backlinks`/`content`.

pub mod key;
pub mod note;
pub mod placeholder;
