//! Transport-agnostic request surface for knotro.
//!
//! HTTP handlers, templates or the CLI call these use-case functions and
//! forward the serializable envelopes they return.

pub mod api;

pub use api::{
    ActionResponse, NameListResponse, NoteApi, NoteLookupResponse, NoteReadResponse,
    PublicNoteResponse,
};
