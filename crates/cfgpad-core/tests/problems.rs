use cfgpad_core::{
    ListSurface, Marker, MarkerSeverity, NO_PROBLEMS_TEXT, Position, ProblemIcon, ProblemPanel,
    ProblemRow, ProblemSurface, problem_rows,
};
use pretty_assertions::assert_eq;
use std::cell::Cell;

fn marker(severity: MarkerSeverity, message: &str, line: usize) -> Marker {
    Marker::new(
        "config.yaml",
        severity,
        message,
        Position::new(line, 3),
        Position::new(line, 9),
    )
}

fn texts(rows: &[ProblemRow]) -> Vec<&str> {
    rows.iter().map(|row| row.text.as_str()).collect()
}

/// Surface that records every call, to check clear-then-append ordering.
#[derive(Default)]
struct RecordingSurface {
    calls: Vec<String>,
}

impl ProblemSurface for RecordingSurface {
    fn clear(&mut self) {
        self.calls.push("clear".to_string());
    }

    fn append(&mut self, row: ProblemRow) {
        self.calls.push(format!("append {}", row.text));
    }
}

#[test]
fn test_new_panel_shows_all_clear() {
    let panel = ProblemPanel::new(ListSurface::new());

    let rows = panel.surface().rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text, NO_PROBLEMS_TEXT);
    assert_eq!(rows[0].icon, ProblemIcon::Check);
    assert_eq!(panel.problem_count(), 0);
}

#[test]
fn test_render_empty_shows_all_clear() {
    let mut panel = ProblemPanel::new(ListSurface::new());
    panel.render(&[]);

    assert_eq!(texts(panel.surface().rows()), vec!["No Problems Found"]);
}

#[test]
fn test_hints_are_excluded() {
    let mut panel = ProblemPanel::new(ListSurface::new());
    panel.render(&[marker(MarkerSeverity::Hint, "just a hint", 1)]);

    assert_eq!(texts(panel.surface().rows()), vec!["No Problems Found"]);
    assert_eq!(panel.problem_count(), 0);
}

#[test]
fn test_warning_and_error_rows_in_order() {
    let mut panel = ProblemPanel::new(ListSurface::new());
    panel.render(&[
        marker(MarkerSeverity::Warning, "m1", 1),
        marker(MarkerSeverity::Hint, "skipped", 2),
        marker(MarkerSeverity::Error, "m2", 3),
    ]);

    let rows = panel.surface().rows();
    assert_eq!(texts(rows), vec!["m1", "m2"]);
    assert_eq!(rows[0].icon, ProblemIcon::Warning);
    assert_eq!(rows[1].icon, ProblemIcon::Error);
    assert_ne!(rows[0].icon.class_name(), rows[1].icon.class_name());
}

#[test]
fn test_click_selects_marker_exactly_once_per_click() {
    let m1 = marker(MarkerSeverity::Warning, "m1", 4);
    let m2 = marker(MarkerSeverity::Error, "m2", 8);

    let mut panel = ProblemPanel::new(ListSurface::new());
    panel.render(&[m1.clone(), m2.clone()]);

    let calls = Cell::new(0);
    let mut selected = Vec::new();
    assert!(panel.click(1, |m| {
        calls.set(calls.get() + 1);
        selected.push(m.clone());
    }));
    assert_eq!(calls.get(), 1);

    assert!(panel.click(1, |m| {
        calls.set(calls.get() + 1);
        selected.push(m.clone());
    }));
    assert_eq!(calls.get(), 2);
    assert_eq!(selected, vec![m2.clone(), m2]);

    let mut first = None;
    panel.click(0, |m| first = Some(m.start));
    assert_eq!(first, Some(m1.start));
}

#[test]
fn test_click_on_all_clear_or_past_end_does_nothing() {
    let panel = ProblemPanel::new(ListSurface::new());
    let calls = Cell::new(0);

    assert!(!panel.click(0, |_| calls.set(calls.get() + 1)));
    assert!(!panel.click(7, |_| calls.set(calls.get() + 1)));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_second_render_replaces_first() {
    let mut panel = ProblemPanel::new(ListSurface::new());
    panel.render(&[
        marker(MarkerSeverity::Error, "old 1", 1),
        marker(MarkerSeverity::Error, "old 2", 2),
    ]);
    panel.render(&[marker(MarkerSeverity::Warning, "new", 3)]);

    assert_eq!(texts(panel.surface().rows()), vec!["new"]);

    panel.render(&[]);
    assert_eq!(texts(panel.surface().rows()), vec!["No Problems Found"]);
}

#[test]
fn test_render_is_idempotent() {
    let markers = vec![
        marker(MarkerSeverity::Warning, "w", 1),
        marker(MarkerSeverity::Error, "e", 2),
    ];
    let mut panel = ProblemPanel::new(ListSurface::new());

    panel.render(&markers);
    let first = panel.surface().clone();
    panel.render(&markers);
    assert_eq!(panel.surface(), &first);
    assert_eq!(problem_rows(&markers), first.rows().to_vec());
}

#[test]
fn test_surface_is_cleared_before_rows_are_appended() {
    let mut panel = ProblemPanel::new(RecordingSurface::default());
    panel.render(&[
        marker(MarkerSeverity::Error, "a", 1),
        marker(MarkerSeverity::Warning, "b", 2),
    ]);

    assert_eq!(
        panel.surface().calls,
        vec![
            "clear",
            "append No Problems Found",
            "clear",
            "append a",
            "append b",
        ]
    );
}
