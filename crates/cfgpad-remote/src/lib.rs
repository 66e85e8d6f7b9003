//! `cfgpad-remote` - blocking HTTP client for the cfgpad config server.
//!
//! The server exposes four endpoints next to the config schema:
//!
//! | operation | request |
//! |-----------|---------|
//! | load | `GET /api/v1/cfg/get` |
//! | save | `POST /api/v1/cfg/save` with the document as body |
//! | hash | `POST /genhash` with a form content type and the text as body |
//! | shutdown | `GET /shutdown` |
//!
//! Calls block the caller; the editor runs them on its UI thread between frames.

pub mod client;
pub mod error;

pub use client::{ConfigClient, DEFAULT_TIMEOUT, Endpoints, FORM_CONTENT_TYPE, SaveOutcome};
pub use error::RemoteError;
