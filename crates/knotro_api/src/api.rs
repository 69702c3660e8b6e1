//! Use-case API for request handlers.
//!
//! # Responsibility
//! - Expose one function per request-facing note operation.
//! - Open the configured note store per call and map errors to envelopes.
//!
//! # Invariants
//! - Exported functions never panic; failures become `message` text.
//! - The public read path answers `not found` for missing and private notes
//!   alike.
//! - Envelopes are `Serialize` so transports can emit them as JSON.

use knotro_core::db::open_db;
use knotro_core::{
    init_logging as init_logging_inner, AppConfig, Note, NoteRepository, NoteService, NoteUpsert,
    NoteView, PublicNoteView, RepoResult, SqliteNoteStore,
};
use log::warn;
use serde::Serialize;

const SUCCESS_MESSAGE: &str = "success";
const FAILED_MESSAGE: &str = "failed";
const NOT_FOUND_MESSAGE: &str = "not found";

/// Outcome of a write operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

impl ActionResponse {
    fn success() -> Self {
        Self {
            ok: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Private read path result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteReadResponse {
    pub note: Option<NoteView>,
    pub message: String,
}

/// Public read path result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicNoteResponse {
    pub note: Option<PublicNoteView>,
    pub message: String,
}

/// Administrative lookup result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteLookupResponse {
    pub note: Option<Note>,
    pub message: String,
}

/// Search and recent listing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameListResponse {
    pub names: Vec<String>,
    pub message: String,
}

impl NameListResponse {
    fn from_result(operation: &str, result: Result<Vec<String>, String>) -> Self {
        match result {
            Ok(names) => {
                let message = if names.is_empty() {
                    "No results.".to_string()
                } else {
                    format!("Found {} note(s).", names.len())
                };
                Self { names, message }
            }
            Err(err) => Self {
                names: Vec::new(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// Entry point bound to one configuration.
#[derive(Debug, Clone)]
pub struct NoteApi {
    config: AppConfig,
}

impl NoteApi {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Builds the API from `KNOTRO_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(AppConfig::from_env())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns an empty string on success or when logging is not configured.
    pub fn init_logging(&self) -> String {
        let Some(log_dir) = self.config.log_dir.as_ref() else {
            return String::new();
        };
        match init_logging_inner(&self.config.log_level, &log_dir.to_string_lossy()) {
            Ok(()) => String::new(),
            Err(err) => err,
        }
    }

    /// Fetch-or-create read, with recent notes attached.
    pub fn read_note(&self, name: &str) -> NoteReadResponse {
        match self.with_note_service(|service| service.read_note(name)) {
            Ok(view) => NoteReadResponse {
                note: Some(view),
                message: SUCCESS_MESSAGE.to_string(),
            },
            Err(err) => NoteReadResponse {
                note: None,
                message: format!("read_note failed: {err}"),
            },
        }
    }

    /// Public read. Private, missing and failed lookups all answer
    /// `not found`.
    pub fn read_public_note(&self, name: &str) -> PublicNoteResponse {
        match self.with_note_service(|service| service.read_public_note(name)) {
            Ok(Some(view)) => PublicNoteResponse {
                note: Some(view),
                message: SUCCESS_MESSAGE.to_string(),
            },
            Ok(None) => PublicNoteResponse {
                note: None,
                message: NOT_FOUND_MESSAGE.to_string(),
            },
            Err(err) => {
                warn!("event=public_read module=api status=error error={err}");
                PublicNoteResponse {
                    note: None,
                    message: NOT_FOUND_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Upserts a note from a JSON payload (`name` required).
    pub fn upsert_note_json(&self, payload: &str) -> ActionResponse {
        match serde_json::from_str::<NoteUpsert>(payload) {
            Ok(upsert) => self.upsert_note(upsert),
            Err(err) => ActionResponse::failure(format!("invalid note payload: {err}")),
        }
    }

    /// Saves content/links and reconciles backlinks.
    pub fn upsert_note(&self, upsert: NoteUpsert) -> ActionResponse {
        match self.with_note_service(|service| service.upsert_note(upsert)) {
            Ok(_) => ActionResponse::success(),
            Err(err) => ActionResponse::failure(format!("upsert_note failed: {err}")),
        }
    }

    /// Toggles visibility; `failed` when the note does not exist.
    pub fn set_public(&self, name: &str, is_public: bool) -> ActionResponse {
        match self.with_note_service(|service| service.set_public(name, is_public)) {
            Ok(Some(_)) => ActionResponse::success(),
            Ok(None) => ActionResponse::failure(FAILED_MESSAGE),
            Err(err) => ActionResponse::failure(format!("set_public failed: {err}")),
        }
    }

    pub fn search(&self, term: &str) -> NameListResponse {
        NameListResponse::from_result(
            "search",
            self.with_note_service(|service| service.search(term)),
        )
    }

    pub fn recent_notes(&self) -> NameListResponse {
        NameListResponse::from_result(
            "recent_notes",
            self.with_note_service(|service| service.recent_notes()),
        )
    }

    /// Name of the daily note the home page opens.
    pub fn home_note_name(&self) -> Result<String, String> {
        self.with_note_service(|service| Ok(service.home_note_name()))
    }

    /// Administrative lookup that never creates a note.
    pub fn admin_get(&self, name: &str) -> NoteLookupResponse {
        match self.with_note_service(|service| service.admin_get(name)) {
            Ok(Some(note)) => NoteLookupResponse {
                note: Some(note),
                message: SUCCESS_MESSAGE.to_string(),
            },
            Ok(None) => NoteLookupResponse {
                note: None,
                message: NOT_FOUND_MESSAGE.to_string(),
            },
            Err(err) => NoteLookupResponse {
                note: None,
                message: format!("admin_get failed: {err}"),
            },
        }
    }

    /// Administrative delete; other notes keep references to `name`.
    pub fn admin_delete(&self, name: &str) -> ActionResponse {
        match self.with_note_service(|service| service.admin_delete(name)) {
            Ok(true) => ActionResponse::success(),
            Ok(false) => ActionResponse::failure(NOT_FOUND_MESSAGE),
            Err(err) => ActionResponse::failure(format!("admin_delete failed: {err}")),
        }
    }

    fn with_note_service<T>(
        &self,
        f: impl FnOnce(&NoteService<SqliteNoteStore<'_>>) -> RepoResult<T>,
    ) -> Result<T, String> {
        let conn = open_db(&self.config.db_path)
            .map_err(|err| format!("note DB open failed: {err}"))?;
        let store = SqliteNoteStore::try_new(&conn)
            .map_err(|err| format!("note store init failed: {err}"))?;
        let service = NoteService::new(NoteRepository::new(store), self.config.base_url.clone());
        f(&service).map_err(|err| err.to_string())
    }
}
