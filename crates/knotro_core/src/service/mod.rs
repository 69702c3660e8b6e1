//! Core use-case services.
//!
//! # Responsibility
//! - Shape repository calls into the request-facing note use-cases.
//! - Keep transport layers (api envelopes, CLI) decoupled from storage.

pub mod note_service;
