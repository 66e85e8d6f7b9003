#![warn(missing_docs)]
//! `cfgpad-lsp` - YAML language server integration for `cfgpad-core`.
//!
//! The crate talks JSON-RPC over stdio to `yaml-language-server` (or anything speaking the
//! same protocol) and converts what comes back into core types:
//!
//! - `textDocument/publishDiagnostics` → [`cfgpad_core::Marker`] lists
//! - `textDocument/documentSymbol` → [`cfgpad_core::DocumentOutline`]
//!
//! Schema associations are served through `workspace/configuration` and pushed with
//! `workspace/didChangeConfiguration`, so validation follows the same `yaml.schemas` setting
//! editors use.

pub mod error;
pub mod lsp_client;
pub mod lsp_convert;
pub mod lsp_transport;
pub mod yaml_session;

pub use error::LspError;
pub use lsp_client::{LspClient, LspInbound};
pub use lsp_convert::{
    LineTable, char_offset_to_utf16, marker_from_lsp_diagnostic, markers_from_publish_diagnostics,
    outline_from_document_symbols, utf16_to_char_offset,
};
pub use lsp_transport::{encode_lsp_message, read_lsp_message, write_lsp_message};
pub use yaml_session::{
    DEFAULT_SERVER_COMMAND, YamlEvent, YamlLanguageSession, YamlSessionOptions, initialize_params,
    yaml_settings,
};
