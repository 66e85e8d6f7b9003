//! A session with `yaml-language-server` for a single document.
//!
//! The session opens the document, pushes schema associations, forwards full-text edits,
//! and turns the server's output into [`YamlEvent`]s the host can apply to its marker store
//! and outline.

use crate::error::LspError;
use crate::lsp_client::{LspClient, LspInbound, is_response_to, is_server_request, response_error};
use crate::lsp_convert::{LineTable, markers_from_publish_diagnostics, outline_from_document_symbols};
use cfgpad_core::{DocumentOutline, Marker, SchemaSettings};
use serde_json::{Map, Value, json};
use std::process::Command;
use std::time::Duration;

/// Default server command.
pub const DEFAULT_SERVER_COMMAND: &str = "yaml-language-server";

/// Startup options for [`YamlLanguageSession::start`].
#[derive(Debug, Clone)]
pub struct YamlSessionOptions {
    /// Server executable.
    pub command: String,
    /// Server arguments.
    pub args: Vec<String>,
    /// URI of the edited document (e.g. `file:///config.yaml`).
    pub document_uri: String,
    /// Text at open time.
    pub initial_text: String,
    /// Schema associations with absolute URIs.
    pub schemas: Vec<SchemaSettings>,
    /// How long to wait for the `initialize` response.
    pub initialize_timeout: Duration,
}

impl YamlSessionOptions {
    /// Options for the default server command.
    pub fn new(document_uri: impl Into<String>, initial_text: impl Into<String>) -> Self {
        Self {
            command: DEFAULT_SERVER_COMMAND.to_string(),
            args: vec!["--stdio".to_string()],
            document_uri: document_uri.into(),
            initial_text: initial_text.into(),
            schemas: Vec::new(),
            initialize_timeout: Duration::from_secs(5),
        }
    }
}

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlEvent {
    /// The markers of `uri` were recomputed.
    Markers {
        /// Document the markers belong to.
        uri: String,
        /// Complete marker list (replaces the previous one).
        markers: Vec<Marker>,
    },
    /// A fresh outline for the open document.
    Outline(DocumentOutline),
    /// A `window/showMessage` text worth surfacing.
    Message(String),
}

/// Build the `yaml` settings section for `schemas`.
pub fn yaml_settings(schemas: &[SchemaSettings]) -> Value {
    let mut associations = Map::new();
    for schema in schemas {
        associations.insert(schema.uri.clone(), json!(schema.file_match));
    }
    json!({
        "yaml": {
            "validate": true,
            "hover": true,
            "completion": true,
            "format": { "enable": true },
            "schemaStore": { "enable": false },
            "schemas": associations,
        }
    })
}

/// Build `initialize` params advertising what the session consumes.
pub fn initialize_params(root_uri: Option<&str>) -> Value {
    json!({
        "processId": std::process::id(),
        "rootUri": root_uri,
        "capabilities": {
            "workspace": {
                "configuration": true,
                "didChangeConfiguration": { "dynamicRegistration": false },
            },
            "textDocument": {
                "synchronization": { "dynamicRegistration": false, "didSave": false },
                "documentSymbol": {
                    "dynamicRegistration": false,
                    "hierarchicalDocumentSymbolSupport": true,
                },
                "publishDiagnostics": { "relatedInformation": false },
            },
        },
        "clientInfo": { "name": "cfgpad" },
    })
}

/// Live session with a YAML language server.
pub struct YamlLanguageSession {
    client: LspClient,
    uri: String,
    version: i64,
    lines: LineTable,
    server_name: Option<String>,
    pending_symbols: Option<u64>,
    backlog: Vec<Value>,
}

impl YamlLanguageSession {
    /// Spawn the server, initialize it, push the schema settings and open the document.
    pub fn start(opts: YamlSessionOptions) -> Result<Self, LspError> {
        let mut cmd = Command::new(&opts.command);
        cmd.args(&opts.args);

        let mut client = LspClient::spawn(cmd)?;
        let settings = yaml_settings(&opts.schemas);
        client.set_settings(settings.clone());

        let init_id = client.request("initialize", initialize_params(None))?;
        let (response, backlog) = client.wait_for_response(init_id, opts.initialize_timeout)?;
        if let Some(err) = response_error(&response) {
            return Err(err);
        }

        let server_name = response
            .pointer("/result/serverInfo/name")
            .and_then(Value::as_str)
            .map(|name| match response.pointer("/result/serverInfo/version") {
                Some(Value::String(version)) => format!("{name} {version}"),
                _ => name.to_string(),
            });
        tracing::info!(
            server = server_name.as_deref().unwrap_or(opts.command.as_str()),
            "yaml language server initialized"
        );

        client.notify("initialized", json!({}))?;
        client.notify(
            "workspace/didChangeConfiguration",
            json!({ "settings": settings }),
        )?;
        client.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": opts.document_uri,
                    "languageId": "yaml",
                    "version": 1,
                    "text": opts.initial_text,
                }
            }),
        )?;

        Ok(Self {
            client,
            uri: opts.document_uri,
            version: 1,
            lines: LineTable::new(&opts.initial_text),
            server_name,
            pending_symbols: None,
            backlog,
        })
    }

    /// `name version` reported by the server, if any.
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// Send the full new text of the document.
    pub fn did_change(&mut self, text: &str) -> Result<(), LspError> {
        self.version += 1;
        self.lines = LineTable::new(text);
        self.client.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": self.uri, "version": self.version },
                "contentChanges": [ { "text": text } ],
            }),
        )
    }

    /// Ask for the document outline; the answer arrives as [`YamlEvent::Outline`].
    ///
    /// A newer request supersedes an unanswered older one.
    pub fn request_outline(&mut self) -> Result<(), LspError> {
        let id = self.client.request(
            "textDocument/documentSymbol",
            json!({ "textDocument": { "uri": self.uri } }),
        )?;
        self.pending_symbols = Some(id);
        Ok(())
    }

    /// Drain everything the server sent since the last poll.
    pub fn poll(&mut self) -> Result<Vec<YamlEvent>, LspError> {
        let mut events = Vec::new();

        for msg in std::mem::take(&mut self.backlog) {
            self.dispatch(msg, &mut events)?;
        }

        while let Some(inbound) = self.client.try_recv() {
            match inbound {
                LspInbound::Message(msg) => self.dispatch(msg, &mut events)?,
                LspInbound::IoError(err) => return Err(LspError::Stopped(err)),
            }
        }

        Ok(events)
    }

    fn dispatch(&mut self, msg: Value, events: &mut Vec<YamlEvent>) -> Result<(), LspError> {
        if is_server_request(&msg) {
            return self.client.handle_server_request(&msg);
        }

        if let Some(id) = self.pending_symbols
            && is_response_to(&msg, id)
        {
            self.pending_symbols = None;
            if let Some(err) = response_error(&msg) {
                tracing::warn!("documentSymbol failed: {err}");
                return Ok(());
            }
            let result = msg.get("result").unwrap_or(&Value::Null);
            events.push(YamlEvent::Outline(outline_from_document_symbols(
                &self.lines,
                result,
            )));
            return Ok(());
        }

        let method = msg.get("method").and_then(Value::as_str).unwrap_or("");
        let params = msg.get("params").unwrap_or(&Value::Null);
        match method {
            "textDocument/publishDiagnostics" => {
                if let Some((uri, markers)) = markers_from_publish_diagnostics(&self.lines, params)
                {
                    tracing::debug!(count = markers.len(), "diagnostics published for {uri}");
                    events.push(YamlEvent::Markers { uri, markers });
                }
            }
            "window/showMessage" => {
                if let Some(text) = params.get("message").and_then(Value::as_str) {
                    events.push(YamlEvent::Message(text.to_string()));
                }
            }
            "window/logMessage" => {
                if let Some(text) = params.get("message").and_then(Value::as_str) {
                    tracing::debug!("yaml-language-server: {text}");
                }
            }
            "" => tracing::trace!("ignoring stale response: {msg}"),
            other => tracing::trace!("ignoring notification `{other}`"),
        }
        Ok(())
    }

    /// Ask the server to shut down and exit.
    pub fn shutdown(mut self) -> Result<(), LspError> {
        let id = self.client.request("shutdown", Value::Null)?;
        self.client
            .wait_for_response(id, Duration::from_millis(500))?;
        self.client.notify("exit", Value::Null)
    }
}
