//! Drawing: editor pane, problem panel, breadcrumb, status and shortcut lines, alert popup.

use crate::app::{App, ConfigService, Focus, InputMode, lock_panel};
use cfgpad_core::{Marker, MarkerSeverity, Position, ProblemIcon};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const BREADCRUMB_SEPARATOR: &str = " › ";

impl<S: ConfigService> App<S> {
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // editor + problems
                Constraint::Length(1), // breadcrumb
                Constraint::Length(1), // status
                Constraint::Length(1), // shortcuts
            ])
            .split(size);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Percentage(35)])
            .split(rows[0]);

        // Viewport inside the borders, minus the line-number gutter.
        let editor_area = columns[0];
        self.viewport_height = editor_area.height.saturating_sub(2) as usize;
        self.viewport_width =
            (editor_area.width.saturating_sub(2) as usize).saturating_sub(self.gutter_width());
        self.scroll_top = self
            .scroll_top
            .min(self.document.line_count().saturating_sub(1));
        self.clamp_selection();
        self.adjust_scroll();

        self.render_editor(frame, editor_area);
        self.render_problems(frame, columns[1]);
        self.render_breadcrumb(frame, rows[1]);
        self.render_status_line(frame, rows[2]);
        self.render_shortcuts(frame, rows[3]);

        if let Some(message) = &self.alert {
            render_alert(frame, size, message);
        }
    }

    fn gutter_width(&self) -> usize {
        self.document.line_count().to_string().len().max(3) + 1
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let gutter = self.gutter_width();
        let markers = self.markers.markers(self.document.uri());
        let line_count = self.document.line_count();

        let mut display_lines = Vec::with_capacity(self.viewport_height);
        for row in 0..self.viewport_height {
            let line = self.scroll_top + row + 1;
            if line > line_count {
                display_lines.push(Line::from(""));
                continue;
            }

            let text = self.document.line_text(line).unwrap_or_default();
            let mut spans = vec![Span::styled(
                format!("{line:>width$} ", width = gutter - 1),
                Style::default().fg(Color::DarkGray),
            )];
            spans.extend(marked_spans(&text, line, markers, self.scroll_left));
            display_lines.push(Line::from(spans));
        }

        let mut title = format!(" {}", self.document_name());
        if let Some(schema) = &self.schema_label {
            title.push_str(&format!(" [{schema}]"));
        }
        if self.document.is_modified() {
            title.push_str(" [+]");
        }
        title.push(' ');

        let paragraph =
            Paragraph::new(display_lines).block(focus_block(title, self.focus == Focus::Editor));
        frame.render_widget(paragraph, area);

        if self.focus != Focus::Editor
            || self.input_mode != InputMode::Normal
            || self.alert.is_some()
            || self.viewport_height == 0
            || self.viewport_width == 0
        {
            return;
        }

        let cursor = self.document.cursor();
        let row = cursor.line - 1;
        if row < self.scroll_top || row >= self.scroll_top + self.viewport_height {
            return;
        }
        let line = self.document.line_text(cursor.line).unwrap_or_default();
        let cursor_x: usize = line
            .chars()
            .skip(self.scroll_left)
            .take((cursor.column - 1).saturating_sub(self.scroll_left))
            .map(|c| c.width().unwrap_or(1))
            .sum();

        let inner_right = area.x + area.width.saturating_sub(2);
        let x = (area.x + 1 + (gutter + cursor_x) as u16).min(inner_right);
        let y = area.y + 1 + (row - self.scroll_top) as u16;
        frame.set_cursor_position((x, y));
    }

    fn render_problems(&self, frame: &mut Frame, area: Rect) {
        let panel = lock_panel(&self.panel);
        let rows = panel.surface().rows();

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let (glyph, color) = icon_glyph(row.icon);
                let mut spans = vec![
                    Span::styled(format!("{glyph} "), Style::default().fg(color)),
                    Span::raw(row.text.replace('\n', " ")),
                ];
                if let Some(marker) = &row.marker {
                    spans.push(Span::styled(
                        format!("  {}", marker.start),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let title = format!(" Problems ({}) ", panel.problem_count());
        let list = List::new(items)
            .block(focus_block(title, self.focus == Focus::Problems))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if self.focus == Focus::Problems {
            state.select(Some(self.selected_problem));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_breadcrumb(&self, frame: &mut Frame, area: Rect) {
        let mut text = format!(" {}", self.document_name());
        for name in self.breadcrumb() {
            text.push_str(BREADCRUMB_SEPARATOR);
            text.push_str(name);
        }
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::Gray)),
            area,
        );
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let message = match self.input_mode {
            InputMode::Normal => self.status_message.clone(),
            InputMode::HashPrompt => format!("Hash > {}", self.hash_input),
            InputMode::ConfirmQuit => {
                "Config modified. Save to the server before quitting? (y/n)".to_string()
            }
            InputMode::ConfirmReload => {
                "Discard local changes and reload from the server? (y/n)".to_string()
            }
            InputMode::ConfirmShutdown => "Shut down the config server? (y/n)".to_string(),
        };

        let cursor = self.document.cursor();
        let (errors, warnings) = self.markers.problem_counts(self.document.uri());
        let position = format!(
            "Ln {}, Col {} | {errors} errors {warnings} warnings | {} ",
            cursor.line,
            cursor.column,
            self.lsp_label.as_deref().unwrap_or("built-in checks"),
        );

        let style = Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(position.width() as u16),
            ])
            .split(area);

        frame.render_widget(Paragraph::new(format!(" {message}")).style(style), parts[0]);
        frame.render_widget(Paragraph::new(position).style(style), parts[1]);

        if self.input_mode == InputMode::HashPrompt && self.alert.is_none() {
            let x = parts[0].x + 1 + format!("Hash > {}", self.hash_input).width() as u16;
            frame.set_cursor_position((x.min(parts[0].right().saturating_sub(1)), parts[0].y));
        }
    }

    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = match (self.input_mode, self.focus) {
            (InputMode::HashPrompt, _) => "Enter:Hash  Esc:Close",
            (InputMode::Normal, Focus::Problems) => {
                "Up/Down:Select  Enter:Go to problem  Esc/F8:Editor  Ctrl-S:Save  Ctrl-Q:Quit"
            }
            (InputMode::Normal, Focus::Editor) => {
                "Ctrl-S:Save  Ctrl-R:Reload  Ctrl-G:Hash  Ctrl-K:Shutdown  F8:Problems  Ctrl-Q:Quit"
            }
            _ => "Y:Yes  N:No  Esc:Cancel",
        };

        frame.render_widget(
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White)),
            area,
        );
    }
}

fn focus_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn icon_glyph(icon: ProblemIcon) -> (&'static str, Color) {
    match icon {
        ProblemIcon::Warning => ("⚠", Color::Yellow),
        ProblemIcon::Error => ("✖", Color::LightRed),
        ProblemIcon::Check => ("✔", Color::Green),
    }
}

fn severity_style(severity: MarkerSeverity) -> Style {
    match severity {
        MarkerSeverity::Error | MarkerSeverity::Info => Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::UNDERLINED),
        MarkerSeverity::Warning => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::UNDERLINED),
        MarkerSeverity::Hint => Style::default().add_modifier(Modifier::DIM),
    }
}

/// Highest severity among the markers covering `position`.
///
/// Marker ends are exclusive; an empty marker covers the character at its start.
fn severity_at(markers: &[Marker], position: Position) -> Option<MarkerSeverity> {
    markers
        .iter()
        .filter(|marker| {
            marker.start <= position
                && (position < marker.end || (marker.start == marker.end && position == marker.start))
        })
        .map(|marker| marker.severity)
        .max()
}

/// Split one line into spans styled by the markers covering each character.
fn marked_spans(
    text: &str,
    line: usize,
    markers: &[Marker],
    skip: usize,
) -> Vec<Span<'static>> {
    let on_line: Vec<Marker> = markers
        .iter()
        .filter(|marker| marker.touches_line(line))
        .cloned()
        .collect();

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut current_severity = None;

    for (index, ch) in text.chars().enumerate().skip(skip) {
        let severity = severity_at(&on_line, Position::new(line, index + 1));
        if severity != current_severity && !current.is_empty() {
            spans.push(styled(std::mem::take(&mut current), current_severity));
        }
        current_severity = severity;
        current.push(if ch == '\t' { ' ' } else { ch });
    }
    if !current.is_empty() {
        spans.push(styled(current, current_severity));
    }
    spans
}

fn styled(text: String, severity: Option<MarkerSeverity>) -> Span<'static> {
    match severity {
        Some(severity) => Span::styled(text, severity_style(severity)),
        None => Span::raw(text),
    }
}

fn centered_rect(width_percent: u16, height: u16, area: Rect) -> Rect {
    let width = ((u32::from(area.width) * u32::from(width_percent) / 100) as u16)
        .max(20)
        .min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(60, 7, area);
    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightRed))
        .title(" Alert ");

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}
