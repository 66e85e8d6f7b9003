//! `cfgpad`: terminal editor for a YAML config document served over HTTP.
//!
//! Built with crossterm and ratatui on top of `cfgpad-core`.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cfgpad-tui -- --server http://127.0.0.1:8080
//! ```
//!
//! The document is loaded from `GET /api/v1/cfg/get` at startup and saved with
//! `POST /api/v1/cfg/save`. Problems are listed in the panel on the right.
//!
//! # Language server (optional)
//!
//! `yaml-language-server --stdio` is started when installed; it validates the document
//! against `/api/v1/cfg/schema` and provides the outline for the breadcrumb. Without it the
//! built-in checks report syntax errors and derive the outline from indentation.
//!
//! ```bash
//! CFGPAD_LSP_CMD=/opt/yls/bin/yaml-language-server CFGPAD_LSP_ARGS=--stdio cargo run -p cfgpad-tui
//! ```
//!
//! # Environment
//!
//! - `CFGPAD_SERVER`: server base URL
//! - `CFGPAD_LSP_CMD` / `CFGPAD_LSP_ARGS`: language server command and arguments
//! - `CFGPAD_LOG`: log filter (the log goes to a file, see `--log-file`)
//!
//! # Keys
//!
//! - Arrows, Home/End, PageUp/PageDown: move the cursor
//! - Ctrl+S: save to the server
//! - Ctrl+R: reload from the server
//! - Ctrl+G: hash prompt (Enter replaces the input with the server's digest)
//! - Ctrl+K: shut the server down
//! - F8: focus the problem panel (Up/Down select, Enter jumps, Esc returns)
//! - Ctrl+Q: quit

mod app;
mod config;
mod logging;
mod ui;

use app::{App, ConfigService};
use cfgpad_core::SchemaSettings;
use cfgpad_lsp::YamlSessionOptions;
use cfgpad_remote::{ConfigClient, RemoteError};
use clap::Parser;
use config::{Cli, Settings};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, stdout},
    process,
    time::Duration,
};

/// Language server options with schema URIs made absolute against the server.
fn session_options(
    settings: &Settings,
    client: &ConfigClient,
) -> Result<Option<YamlSessionOptions>, RemoteError> {
    let Some(lsp) = &settings.lsp else {
        return Ok(None);
    };

    let mut schemas = Vec::new();
    for schema in settings.schemas.settings() {
        let uri = if schema.is_relative() {
            client.resolve(&schema.uri)?.to_string()
        } else {
            schema.uri.clone()
        };
        schemas.push(SchemaSettings::new(uri, schema.file_match.clone()));
    }

    let mut opts = YamlSessionOptions::new(settings.document_uri(), String::new());
    opts.command = lsp.command.clone();
    opts.args = lsp.args.clone();
    opts.schemas = schemas;
    Ok(Some(opts))
}

fn exit_with(err: impl std::fmt::Display) -> ! {
    eprintln!("cfgpad: {err}");
    process::exit(2);
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli).unwrap_or_else(|err| exit_with(err));
    if let Err(err) = logging::init_file_logging(&settings.log_level, &settings.log_file) {
        exit_with(err);
    }

    let client =
        ConfigClient::with_options(&settings.server, settings.endpoints.clone(), settings.timeout)
            .unwrap_or_else(|err| exit_with(err));
    let lsp_options = session_options(&settings, &client).unwrap_or_else(|err| exit_with(err));
    tracing::info!(server = %settings.server, document = %settings.document, "starting cfgpad");

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&settings.document_uri(), client);
    app.schema_label = settings
        .schemas
        .schema_for(&settings.document)
        .map(|schema| schema.uri.clone());
    if let Some(opts) = lsp_options {
        app.start_language_server(opts);
    }
    app.reload();

    let result = run_app(&mut terminal, &mut app);
    app.stop_language_server();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("terminal error: {err}");
        eprintln!("cfgpad: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: ConfigService>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Paste(text) => app.handle_paste(&text),
                // Redrawn on the next iteration.
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}
