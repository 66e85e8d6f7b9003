//! Editor state, key handling and the remote/LSP actions.

use cfgpad_core::{
    Document, DocumentOutline, ListSurface, MarkerStore, ProblemPanel, yaml,
};
use cfgpad_lsp::{YamlEvent, YamlLanguageSession, YamlSessionOptions};
use cfgpad_remote::{ConfigClient, RemoteError, SaveOutcome};
use chrono::{SecondsFormat, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Text shown until the first load answers.
pub const PLACEHOLDER_TEXT: &str = "# Waiting for the config server";

/// Idle time after an edit before the document is re-checked.
const ANALYSIS_DELAY: Duration = Duration::from_millis(200);

/// The config server operations the editor needs.
pub trait ConfigService {
    fn load(&self) -> Result<String, RemoteError>;
    fn save(&self, text: &str) -> Result<SaveOutcome, RemoteError>;
    fn hash(&self, text: &str) -> Result<String, RemoteError>;
    fn shutdown(&self) -> Result<u16, RemoteError>;
}

impl ConfigService for ConfigClient {
    fn load(&self) -> Result<String, RemoteError> {
        ConfigClient::load(self)
    }

    fn save(&self, text: &str) -> Result<SaveOutcome, RemoteError> {
        ConfigClient::save(self, text)
    }

    fn hash(&self, text: &str) -> Result<String, RemoteError> {
        ConfigClient::hash(self, text)
    }

    fn shutdown(&self) -> Result<u16, RemoteError> {
        ConfigClient::shutdown(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    HashPrompt,
    ConfirmQuit,
    ConfirmReload,
    ConfirmShutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Problems,
}

pub type SharedPanel = Arc<Mutex<ProblemPanel<ListSurface>>>;

/// Lock the problem panel. A listener that panicked mid-render leaves rows that are still
/// displayable, so poisoning is ignored.
pub fn lock_panel(panel: &SharedPanel) -> MutexGuard<'_, ProblemPanel<ListSurface>> {
    panel.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `length` is in UTF-16 code units, the unit the server side reports string lengths in.
pub fn loaded_status(length: usize, at: &str) -> String {
    format!("Config Loaded Length {length} {at}")
}

pub fn saved_status(reason: &str, at: &str) -> String {
    format!("Config Saved {reason} {at}")
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Application state.
pub struct App<S> {
    pub(crate) document: Document,
    remote: S,
    pub(crate) markers: MarkerStore,
    /// Problem list, re-rendered by the marker store subscription.
    pub(crate) panel: SharedPanel,
    pub(crate) outline: DocumentOutline,
    lsp: Option<YamlLanguageSession>,
    /// Server name while the language server is connected.
    pub(crate) lsp_label: Option<String>,
    /// Schema applied to the document, for the title bar.
    pub(crate) schema_label: Option<String>,
    /// Time of the last unchecked edit.
    pending_analysis: Option<Instant>,
    pub(crate) focus: Focus,
    pub(crate) selected_problem: usize,
    pub(crate) input_mode: InputMode,
    /// Hash prompt contents; replaced by the digest after a successful request.
    pub(crate) hash_input: String,
    /// Message shown in a popup until the next key press.
    pub(crate) alert: Option<String>,
    pub(crate) status_message: String,
    pub(crate) should_quit: bool,
    pub(crate) scroll_top: usize,
    pub(crate) scroll_left: usize,
    pub(crate) viewport_height: usize,
    pub(crate) viewport_width: usize,
}

impl<S: ConfigService> App<S> {
    pub fn new(document_uri: &str, remote: S) -> Self {
        let panel: SharedPanel = Arc::new(Mutex::new(ProblemPanel::new(ListSurface::new())));
        let mut markers = MarkerStore::new();
        {
            let panel = Arc::clone(&panel);
            let uri = document_uri.to_string();
            markers.subscribe(move |resource, changed| {
                if resource == uri {
                    lock_panel(&panel).render(changed);
                }
            });
        }

        Self {
            document: Document::new(document_uri, PLACEHOLDER_TEXT),
            remote,
            markers,
            panel,
            outline: DocumentOutline::default(),
            lsp: None,
            lsp_label: None,
            schema_label: None,
            pending_analysis: None,
            focus: Focus::Editor,
            selected_problem: 0,
            input_mode: InputMode::Normal,
            hash_input: String::new(),
            alert: None,
            status_message: String::new(),
            should_quit: false,
            scroll_top: 0,
            scroll_left: 0,
            viewport_height: 0,
            viewport_width: 0,
        }
    }

    /// Start the language server for the current text. Failure keeps the built-in checks.
    pub fn start_language_server(&mut self, mut opts: YamlSessionOptions) {
        let command = opts.command.clone();
        opts.initial_text = self.document.text();

        match YamlLanguageSession::start(opts) {
            Ok(session) => {
                let label = session.server_name().unwrap_or(&command).to_string();
                self.status_message = format!("Connected to {label}");
                self.lsp_label = Some(label);
                self.lsp = Some(session);
                self.analyze_now();
            }
            Err(err) if err.is_not_found() => {
                tracing::warn!("language server `{command}` not found");
                self.status_message =
                    format!("Language server `{command}` not found; using built-in YAML checks");
            }
            Err(err) => {
                tracing::warn!("language server failed to start: {err}");
                self.status_message =
                    format!("Language server failed to start ({err}); using built-in YAML checks");
            }
        }
    }

    /// Shut the language server down, if one is running.
    pub fn stop_language_server(&mut self) {
        self.lsp_label = None;
        if let Some(session) = self.lsp.take()
            && let Err(err) = session.shutdown()
        {
            tracing::debug!("language server shutdown: {err}");
        }
    }

    fn disable_lsp(&mut self, reason: String) {
        tracing::warn!("{reason}");
        self.lsp = None;
        self.lsp_label = None;
        self.status_message = format!("{reason}; using built-in YAML checks");
        let text = self.document.text();
        self.run_builtin_checks(&text);
    }

    /// Called once per UI loop iteration.
    pub fn tick(&mut self) {
        self.poll_lsp();
        if self
            .pending_analysis
            .is_some_and(|since| since.elapsed() >= ANALYSIS_DELAY)
        {
            self.analyze_now();
        }
    }

    fn poll_lsp(&mut self) {
        let result = match self.lsp.as_mut() {
            Some(lsp) => lsp.poll(),
            None => return,
        };

        match result {
            Ok(events) => {
                for event in events {
                    self.apply_event(event);
                }
            }
            Err(err) => self.disable_lsp(format!("Language server stopped ({err})")),
        }
    }

    fn apply_event(&mut self, event: YamlEvent) {
        match event {
            YamlEvent::Markers { uri, markers } => self.markers.set_markers(&uri, markers),
            YamlEvent::Outline(outline) => self.outline = outline,
            YamlEvent::Message(text) => self.status_message = text,
        }
    }

    /// Re-check the document now: through the language server when connected, otherwise
    /// with the built-in checks.
    pub fn analyze_now(&mut self) {
        self.pending_analysis = None;
        let text = self.document.text();

        let sent = self.lsp.as_mut().map(|lsp| {
            lsp.did_change(&text)
                .and_then(|()| lsp.request_outline())
        });
        match sent {
            Some(Ok(())) => {}
            Some(Err(err)) => self.disable_lsp(format!("Language server stopped ({err})")),
            None => self.run_builtin_checks(&text),
        }
    }

    fn run_builtin_checks(&mut self, text: &str) {
        let uri = self.document.uri().to_string();
        self.markers
            .set_markers(&uri, yaml::syntax_markers(&uri, text));
        self.outline = yaml::indent_outline(text);
    }

    fn text_changed(&mut self) {
        self.pending_analysis = Some(Instant::now());
    }

    fn show_alert(&mut self, err: impl Display) {
        tracing::warn!("{err}");
        self.alert = Some(err.to_string());
    }

    /// Replace the document with the server's copy.
    pub fn reload(&mut self) {
        match self.remote.load() {
            Ok(text) => {
                self.document.set_text(&text);
                self.document.mark_saved();
                self.status_message = loaded_status(text.encode_utf16().count(), &timestamp());
                self.analyze_now();
                self.adjust_scroll();
            }
            Err(err) => self.show_alert(err),
        }
    }

    /// Upload the document. Returns true if the server accepted it.
    pub fn save(&mut self) -> bool {
        let text = self.document.text();
        match self.remote.save(&text) {
            Ok(outcome) => {
                if outcome.is_success() {
                    self.document.mark_saved();
                }
                self.status_message = saved_status(&outcome.reason, &timestamp());
                outcome.is_success()
            }
            Err(err) => {
                self.show_alert(err);
                false
            }
        }
    }

    fn submit_hash(&mut self) {
        match self.remote.hash(&self.hash_input) {
            Ok(digest) => {
                self.hash_input = digest;
                self.status_message = "Hash computed".to_string();
            }
            Err(err) => self.show_alert(err),
        }
    }

    fn shutdown_server(&mut self) {
        match self.remote.shutdown() {
            Ok(status) => self.alert = Some(format!("Shutdown answered with HTTP {status}")),
            Err(err) => self.show_alert(err),
        }
    }

    /// Names of the outline symbols containing the cursor, outermost first.
    pub fn breadcrumb(&self) -> Vec<&str> {
        self.outline.breadcrumb(self.document.cursor())
    }

    /// Last path segment of the document URI.
    pub fn document_name(&self) -> &str {
        let uri = self.document.uri();
        uri.rsplit('/').next().unwrap_or(uri)
    }

    /// Jump to the marker of the selected problem row, like clicking it.
    pub fn open_selected_problem(&mut self) {
        let mut target = None;
        lock_panel(&self.panel).click(self.selected_problem, |marker| {
            target = Some(marker.start);
        });

        if let Some(position) = target {
            self.document.set_position(position);
            self.focus = Focus::Editor;
            self.adjust_scroll();
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Editor => Focus::Problems,
            Focus::Problems => Focus::Editor,
        };
        self.clamp_selection();
    }

    pub(crate) fn clamp_selection(&mut self) {
        let rows = lock_panel(&self.panel).rows().len();
        self.selected_problem = self.selected_problem.min(rows.saturating_sub(1));
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Any key dismisses an alert and does nothing else.
        if self.alert.take().is_some() {
            return;
        }

        match self.input_mode {
            InputMode::Normal => {}
            InputMode::HashPrompt => {
                self.handle_hash_prompt_key(key);
                return;
            }
            mode => {
                self.handle_confirm_key(mode, key);
                return;
            }
        }

        if self.handle_global_shortcut(key) {
            return;
        }

        match self.focus {
            Focus::Editor => self.handle_editor_key(key),
            Focus::Problems => self.handle_problems_key(key),
        }
    }

    fn handle_global_shortcut(&mut self, key: KeyEvent) -> bool {
        match (key.modifiers, key.code) {
            // Ctrl+S: save
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                self.save();
            }
            // Ctrl+R: reload from the server
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                if self.document.is_modified() {
                    self.input_mode = InputMode::ConfirmReload;
                } else {
                    self.reload();
                }
            }
            // Ctrl+G: hash prompt
            (KeyModifiers::CONTROL, KeyCode::Char('g')) => {
                self.input_mode = InputMode::HashPrompt;
            }
            // Ctrl+K: shut the server down
            (KeyModifiers::CONTROL, KeyCode::Char('k')) => {
                self.input_mode = InputMode::ConfirmShutdown;
            }
            // Ctrl+Q: quit
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
                if self.document.is_modified() {
                    self.input_mode = InputMode::ConfirmQuit;
                } else {
                    self.should_quit = true;
                }
            }
            (_, KeyCode::F(8)) => self.toggle_focus(),
            _ => return false,
        }
        true
    }

    fn handle_confirm_key(&mut self, mode: InputMode, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y' | 'Y') => {
                self.input_mode = InputMode::Normal;
                match mode {
                    InputMode::ConfirmQuit => {
                        if self.save() {
                            self.should_quit = true;
                        }
                    }
                    InputMode::ConfirmReload => self.reload(),
                    InputMode::ConfirmShutdown => self.shutdown_server(),
                    InputMode::Normal | InputMode::HashPrompt => {}
                }
            }
            KeyCode::Char('n' | 'N') => {
                self.input_mode = InputMode::Normal;
                if mode == InputMode::ConfirmQuit {
                    self.should_quit = true;
                }
            }
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            _ => {}
        }
    }

    fn handle_hash_prompt_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => self.input_mode = InputMode::Normal,
            (_, KeyCode::Enter) => self.submit_hash(),
            (_, KeyCode::Backspace) => {
                self.hash_input.pop();
            }
            (mods, KeyCode::Char(c)) if !mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.hash_input.push(c);
            }
            _ => {}
        }
    }

    fn handle_problems_key(&mut self, key: KeyEvent) {
        let rows = lock_panel(&self.panel).rows().len();
        match key.code {
            KeyCode::Up => self.selected_problem = self.selected_problem.saturating_sub(1),
            KeyCode::Down => {
                if self.selected_problem + 1 < rows {
                    self.selected_problem += 1;
                }
            }
            KeyCode::Home => self.selected_problem = 0,
            KeyCode::End => self.selected_problem = rows.saturating_sub(1),
            KeyCode::Enter => self.open_selected_problem(),
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Editor,
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let page = self.viewport_height.max(1);
        let edited = match (key.modifiers, key.code) {
            (_, KeyCode::Left) => {
                self.document.move_left();
                false
            }
            (_, KeyCode::Right) => {
                self.document.move_right();
                false
            }
            (_, KeyCode::Up) => {
                self.document.move_up(1);
                false
            }
            (_, KeyCode::Down) => {
                self.document.move_down(1);
                false
            }
            (_, KeyCode::Home) => {
                self.document.move_home();
                false
            }
            (_, KeyCode::End) => {
                self.document.move_end();
                false
            }
            (_, KeyCode::PageUp) => {
                self.document.move_up(page);
                false
            }
            (_, KeyCode::PageDown) => {
                self.document.move_down(page);
                false
            }
            (_, KeyCode::Backspace) => self.document.backspace(),
            (_, KeyCode::Delete) => self.document.delete(),
            (_, KeyCode::Enter) => {
                self.document.insert_newline();
                true
            }
            (_, KeyCode::Tab) => {
                self.document.insert_tab();
                true
            }
            (mods, KeyCode::Char(c)) if !mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.document.insert_char(c);
                true
            }
            _ => false,
        };

        if edited {
            self.text_changed();
        }
        self.adjust_scroll();
    }

    /// Bracketed paste: into the hash prompt when open, otherwise at the cursor.
    pub fn handle_paste(&mut self, text: &str) {
        if self.alert.is_some() {
            return;
        }
        let text = text.replace("\r\n", "\n");
        match (self.input_mode, self.focus) {
            (InputMode::HashPrompt, _) => self.hash_input.push_str(&text),
            (InputMode::Normal, Focus::Editor) => {
                self.document.insert_text(&text);
                self.text_changed();
                self.adjust_scroll();
            }
            _ => {}
        }
    }

    /// Scroll so the cursor stays inside the viewport.
    pub(crate) fn adjust_scroll(&mut self) {
        let cursor = self.document.cursor();
        let row = cursor.line - 1;
        let col = cursor.column - 1;

        if self.viewport_height > 0 {
            if row < self.scroll_top {
                self.scroll_top = row;
            }
            if row >= self.scroll_top + self.viewport_height {
                self.scroll_top = row + 1 - self.viewport_height;
            }
        }
        if self.viewport_width > 0 {
            if col < self.scroll_left {
                self.scroll_left = col;
            }
            if col >= self.scroll_left + self.viewport_width {
                self.scroll_left = col + 1 - self.viewport_width;
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeRemote;
    use super::*;
    use cfgpad_core::{NO_PROBLEMS_TEXT, Position, ProblemIcon};
    use pretty_assertions::assert_eq;

    const URI: &str = "file:///config.yaml";

    fn app(config: &str) -> App<FakeRemote> {
        App::new(URI, FakeRemote::serving(config))
    }

    fn press(app: &mut App<FakeRemote>, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App<FakeRemote>, c: char) {
        app.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App<FakeRemote>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn panel_texts(app: &App<FakeRemote>) -> Vec<String> {
        lock_panel(&app.panel)
            .surface()
            .rows()
            .iter()
            .map(|row| row.text.clone())
            .collect()
    }

    #[test]
    fn test_startup_shows_placeholder_and_all_clear() {
        let app = app("a: 1\n");
        assert_eq!(app.document.text(), PLACEHOLDER_TEXT);
        assert_eq!(panel_texts(&app), vec![NO_PROBLEMS_TEXT.to_string()]);
        assert_eq!(app.document_name(), "config.yaml");
        assert!(!app.document.is_modified());
    }

    #[test]
    fn test_reload_replaces_text_and_reports_length() {
        let mut app = app("server:\n  port: 80\n");
        app.reload();

        assert_eq!(app.document.text(), "server:\n  port: 80\n");
        assert!(!app.document.is_modified());
        assert!(
            app.status_message.starts_with("Config Loaded Length 19 "),
            "{}",
            app.status_message
        );
        assert_eq!(panel_texts(&app), vec![NO_PROBLEMS_TEXT.to_string()]);

        app.document.set_position(Position::new(2, 4));
        assert_eq!(app.breadcrumb(), vec!["server", "port"]);
    }

    #[test]
    fn test_loaded_length_counts_utf16_units() {
        let mut app = app("name: \u{1F44B}\n");
        app.reload();
        assert!(
            app.status_message.starts_with("Config Loaded Length 9 "),
            "{}",
            app.status_message
        );
    }

    #[test]
    fn test_load_failure_shows_alert_and_keeps_text() {
        let mut app = app("a: 1\n");
        app.remote.fail_with.set(Some(500));
        app.reload();

        let alert = app.alert.clone().unwrap();
        assert!(alert.contains("500"), "{alert}");
        assert_eq!(app.document.text(), PLACEHOLDER_TEXT);

        // The key that dismisses the alert is not typed.
        press(&mut app, KeyCode::Char('x'));
        assert!(app.alert.is_none());
        assert_eq!(app.document.text(), PLACEHOLDER_TEXT);
    }

    #[test]
    fn test_syntax_error_lists_problem_and_enter_jumps_to_it() {
        let mut app = app("a: 1\n");
        app.reload();

        type_text(&mut app, "[");
        assert!(app.document.is_modified());
        app.analyze_now();

        let marker = app.markers.markers(URI)[0].clone();
        {
            let panel = lock_panel(&app.panel);
            assert_eq!(panel.problem_count(), 1);
            assert_eq!(panel.rows()[0].icon, ProblemIcon::Error);
            assert_eq!(panel.rows()[0].text, marker.message);
        }

        app.document.set_position(Position::new(2, 1));
        app.handle_key_event(KeyEvent::new(KeyCode::F(8), KeyModifiers::NONE));
        assert_eq!(app.focus, Focus::Problems);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.focus, Focus::Editor);
        assert_eq!(app.document.cursor(), app.document.clamp(marker.start));

        // Fixing the text clears the panel on the next check.
        press(&mut app, KeyCode::Home);
        app.document.set_position(Position::new(1, 2));
        press(&mut app, KeyCode::Backspace);
        app.analyze_now();
        assert_eq!(app.document.text(), "a: 1\n");
        assert_eq!(panel_texts(&app), vec![NO_PROBLEMS_TEXT.to_string()]);
    }

    #[test]
    fn test_all_clear_row_is_not_selectable() {
        let mut app = app("a: 1\n");
        app.reload();
        let before = app.document.cursor();

        app.handle_key_event(KeyEvent::new(KeyCode::F(8), KeyModifiers::NONE));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.focus, Focus::Problems);
        assert_eq!(app.document.cursor(), before);
    }

    #[test]
    fn test_save_uploads_text_and_sets_status() {
        let mut app = app("a: 1\n");
        app.reload();
        type_text(&mut app, "b: 2\n");
        ctrl(&mut app, 's');

        assert_eq!(*app.remote.saved.borrow(), vec!["b: 2\na: 1\n".to_string()]);
        assert!(!app.document.is_modified());
        assert!(app.status_message.starts_with("Config Saved OK "));
    }

    #[test]
    fn test_save_failure_alerts_and_stays_modified() {
        let mut app = app("a: 1\n");
        app.reload();
        type_text(&mut app, "#");
        app.remote.fail_with.set(Some(503));
        ctrl(&mut app, 's');

        assert!(app.alert.is_some());
        assert!(app.document.is_modified());
    }

    #[test]
    fn test_rejected_save_only_reports_in_status_line() {
        let mut app = app("a: 1\n");
        app.reload();
        type_text(&mut app, "#");
        *app.remote.save_answer.borrow_mut() = Some((400, "Bad Request".to_string()));

        assert!(!app.save());
        assert!(app.alert.is_none());
        assert!(
            app.status_message.starts_with("Config Saved Bad Request "),
            "{}",
            app.status_message
        );
        assert!(app.document.is_modified());
    }

    #[test]
    fn test_hash_prompt_replaces_input_with_digest() {
        let mut app = app("a: 1\n");
        app.reload();

        ctrl(&mut app, 'g');
        assert_eq!(app.input_mode, InputMode::HashPrompt);
        type_text(&mut app, "pw");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.hash_input, "digest(pw)");
        assert_eq!(*app.remote.hashed.borrow(), vec!["pw".to_string()]);
        assert_eq!(app.document.text(), "a: 1\n");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_shutdown_requires_confirmation() {
        let mut app = app("a: 1\n");

        ctrl(&mut app, 'k');
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.remote.shutdowns.get(), 0);
        assert!(!app.should_quit);

        ctrl(&mut app, 'k');
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.remote.shutdowns.get(), 1);
        assert!(app.alert.as_deref().unwrap().contains("200"));
    }

    #[test]
    fn test_reload_of_modified_document_asks_first() {
        let mut app = app("a: 1\n");
        app.reload();
        type_text(&mut app, "x");

        ctrl(&mut app, 'r');
        assert_eq!(app.input_mode, InputMode::ConfirmReload);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.document.text(), "xa: 1\n");

        ctrl(&mut app, 'r');
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.document.text(), "a: 1\n");
    }

    #[test]
    fn test_quit_confirms_only_when_modified() {
        let mut app = app("a: 1\n");
        app.reload();
        ctrl(&mut app, 'q');
        assert!(app.should_quit);

        let mut app = self::app("a: 1\n");
        app.reload();
        type_text(&mut app, "x");
        ctrl(&mut app, 'q');
        assert!(!app.should_quit);
        assert_eq!(app.input_mode, InputMode::ConfirmQuit);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.should_quit);
        assert!(app.remote.saved.borrow().is_empty());
    }

    #[test]
    fn test_paste_goes_to_editor_or_prompt() {
        let mut app = app("");
        app.reload();
        app.handle_paste("a: 1\r\nb: 2");
        assert_eq!(app.document.text(), "a: 1\nb: 2");

        ctrl(&mut app, 'g');
        app.handle_paste("secret");
        assert_eq!(app.hash_input, "secret");
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let text: String = (1..=50).map(|i| format!("k{i}: {i}\n")).collect();
        let mut app = app(&text);
        app.reload();
        app.viewport_height = 10;
        app.viewport_width = 20;

        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.document.cursor().line, 21);
        assert_eq!(app.scroll_top, 11);

        press(&mut app, KeyCode::PageUp);
        press(&mut app, KeyCode::PageUp);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.scroll_top, 0);
    }
}
