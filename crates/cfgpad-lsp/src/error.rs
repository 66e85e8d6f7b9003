//! Error type shared by the client and the YAML session.

use std::io;
use thiserror::Error;

/// Errors raised while talking to a language server.
#[derive(Debug, Error)]
pub enum LspError {
    /// The server process could not be started.
    #[error("failed to start language server `{command}`: {source}")]
    Spawn {
        /// Command that was executed.
        command: String,
        /// Underlying spawn error.
        source: io::Error,
    },
    /// Reading from or writing to the server pipes failed.
    #[error("language server I/O error: {0}")]
    Io(#[from] io::Error),
    /// A framed message did not follow the protocol.
    #[error("malformed LSP message: {0}")]
    Protocol(String),
    /// No response arrived in time.
    #[error("timed out waiting for LSP response id={id}")]
    Timeout {
        /// Id of the request that went unanswered.
        id: u64,
    },
    /// The background reader/writer threads have stopped.
    #[error("language server stopped: {0}")]
    Stopped(String),
    /// The server answered a request with a JSON-RPC error.
    #[error("language server error {code}: {message}")]
    Response {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },
}

impl LspError {
    /// Returns true if the server command does not exist on this machine.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
