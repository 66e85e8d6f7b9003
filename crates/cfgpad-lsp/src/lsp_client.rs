//! Minimal JSON-RPC/LSP client over stdio.
//!
//! The server runs as a child process. A writer thread owns its stdin and a reader thread
//! owns its stdout; both talk to the client through channels, so the UI thread only ever
//! polls and never blocks on the pipes.

use crate::error::LspError;
use crate::lsp_transport::{read_lsp_message, write_lsp_message};
use serde_json::{Value, json};
use std::io::{BufReader, BufWriter};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Messages received from the server by the reader thread.
#[derive(Debug)]
pub enum LspInbound {
    /// A decoded JSON-RPC message.
    Message(Value),
    /// The reader or writer thread failed and stopped.
    IoError(String),
}

/// A JSON-RPC/LSP client bound to a server child process.
pub struct LspClient {
    child: Child,
    tx: mpsc::Sender<Value>,
    rx: mpsc::Receiver<LspInbound>,
    next_id: u64,
    /// Answers to `workspace/configuration`, keyed by section (e.g. `{"yaml": {...}}`).
    settings: Value,
}

impl LspClient {
    /// Spawn `cmd` with piped stdin/stdout and discarded stderr.
    pub fn spawn(mut cmd: Command) -> Result<Self, LspError> {
        let command = cmd.get_program().to_string_lossy().into_owned();
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        let child = cmd
            .spawn()
            .map_err(|source| LspError::Spawn { command, source })?;
        Self::from_child(child)
    }

    /// Wrap an already spawned child whose stdin/stdout are piped.
    pub fn from_child(mut child: Child) -> Result<Self, LspError> {
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LspError::Stopped("server stdin is not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LspError::Stopped("server stdout is not piped".to_string()))?;

        let (tx_out, rx_out) = mpsc::channel::<Value>();
        let (tx_in, rx_in) = mpsc::channel::<LspInbound>();

        {
            let tx_in = tx_in.clone();
            thread::spawn(move || write_loop(stdin, rx_out, tx_in));
        }
        thread::spawn(move || read_loop(stdout, tx_in));

        Ok(Self {
            child,
            tx: tx_out,
            rx: rx_in,
            next_id: 1,
            settings: Value::Null,
        })
    }

    /// Replace the settings served to `workspace/configuration` requests.
    pub fn set_settings(&mut self, settings: Value) {
        self.settings = settings;
    }

    /// Send a notification.
    pub fn notify(&self, method: &str, params: Value) -> Result<(), LspError> {
        self.send(json!({ "jsonrpc": "2.0", "method": method, "params": params }))
    }

    /// Send a request and return its id. The response arrives through [`Self::try_recv`].
    pub fn request(&mut self, method: &str, params: Value) -> Result<u64, LspError> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))?;
        Ok(id)
    }

    /// Answer a server-initiated request.
    pub fn respond(&self, id: &Value, result: Value) -> Result<(), LspError> {
        self.send(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
    }

    fn send(&self, message: Value) -> Result<(), LspError> {
        self.tx
            .send(message)
            .map_err(|_| LspError::Stopped("writer thread exited".to_string()))
    }

    /// Next inbound message, without blocking.
    pub fn try_recv(&self) -> Option<LspInbound> {
        self.rx.try_recv().ok()
    }

    /// Block until the response to `request_id` arrives.
    ///
    /// Server requests received in the meantime are answered through
    /// [`Self::handle_server_request`]; other messages are returned alongside the response so
    /// the caller can still process notifications that raced it.
    pub fn wait_for_response(
        &mut self,
        request_id: u64,
        timeout: Duration,
    ) -> Result<(Value, Vec<Value>), LspError> {
        let deadline = Instant::now() + timeout;
        let mut backlog = Vec::new();

        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(LspError::Timeout { id: request_id })?;

            let inbound = match self.rx.recv_timeout(remaining) {
                Ok(inbound) => inbound,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    return Err(LspError::Timeout { id: request_id });
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(LspError::Stopped("reader thread exited".to_string()));
                }
            };

            let msg = match inbound {
                LspInbound::IoError(err) => return Err(LspError::Stopped(err)),
                LspInbound::Message(msg) => msg,
            };

            if is_response_to(&msg, request_id) {
                return Ok((msg, backlog));
            }
            if is_server_request(&msg) {
                self.handle_server_request(&msg)?;
            } else {
                backlog.push(msg);
            }
        }
    }

    /// Answer a server->client request with the configured settings or a safe default.
    ///
    /// Messages that are not requests are ignored.
    pub fn handle_server_request(&mut self, msg: &Value) -> Result<(), LspError> {
        let Some(id) = msg.get("id") else {
            return Ok(());
        };
        let method = msg.get("method").and_then(Value::as_str).unwrap_or("");

        let result = match method {
            "workspace/configuration" => {
                let items = msg
                    .get("params")
                    .and_then(|p| p.get("items"))
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                Value::Array(
                    items
                        .iter()
                        .map(|item| self.section(item.get("section").and_then(Value::as_str)))
                        .collect(),
                )
            }
            "workspace/workspaceFolders" => Value::Array(Vec::new()),
            other => {
                tracing::debug!("answering server request `{other}` with null");
                Value::Null
            }
        };

        self.respond(id, result)
    }

    fn section(&self, section: Option<&str>) -> Value {
        let Some(section) = section else {
            return self.settings.clone();
        };
        section
            .split('.')
            .try_fold(&self.settings, |value, key| value.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        if let Err(err) = self.child.kill() {
            tracing::debug!("failed to kill language server: {err}");
        }
        let _ = self.child.wait();
    }
}

/// Returns true if `msg` is the response to request `id`.
pub fn is_response_to(msg: &Value, id: u64) -> bool {
    msg.get("method").is_none() && msg.get("id").and_then(Value::as_u64) == Some(id)
}

/// Returns true if `msg` is a server->client request (has both `id` and `method`).
pub fn is_server_request(msg: &Value) -> bool {
    msg.get("method").is_some() && msg.get("id").is_some()
}

/// Extract the JSON-RPC error of a response, if any.
pub fn response_error(msg: &Value) -> Option<LspError> {
    let error = msg.get("error")?;
    Some(LspError::Response {
        code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
        message: error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
    })
}

fn write_loop(stdin: ChildStdin, rx: mpsc::Receiver<Value>, tx_in: mpsc::Sender<LspInbound>) {
    let mut writer = BufWriter::new(stdin);
    for value in rx {
        if let Err(err) = write_lsp_message(&mut writer, &value) {
            tracing::warn!("lsp writer stopped: {err}");
            let _ = tx_in.send(LspInbound::IoError(err.to_string()));
            break;
        }
    }
}

fn read_loop(stdout: ChildStdout, tx: mpsc::Sender<LspInbound>) {
    let mut reader = BufReader::new(stdout);
    loop {
        match read_lsp_message(&mut reader) {
            Ok(Some(value)) => {
                if tx.send(LspInbound::Message(value)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                let _ = tx.send(LspInbound::IoError("server closed its output".to_string()));
                break;
            }
            Err(err) => {
                tracing::warn!("lsp reader stopped: {err}");
                let _ = tx.send(LspInbound::IoError(err.to_string()));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_classification() {
        let response = json!({"jsonrpc": "2.0", "id": 3, "result": null});
        let request = json!({"jsonrpc": "2.0", "id": 3, "method": "workspace/configuration"});
        let notification = json!({"jsonrpc": "2.0", "method": "window/logMessage"});

        assert!(is_response_to(&response, 3));
        assert!(!is_response_to(&response, 4));
        assert!(!is_response_to(&request, 3));
        assert!(is_server_request(&request));
        assert!(!is_server_request(&notification));
    }

    #[test]
    fn test_response_error_extraction() {
        let msg = json!({"id": 1, "error": {"code": -32601, "message": "nope"}});
        match response_error(&msg) {
            Some(LspError::Response { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(response_error(&json!({"id": 1, "result": 1})).is_none());
    }
}
