use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::text::Line;

use crate::model::{Proxy, Snapshot};
use crate::tui::app::{App, Event};
use crate::tui::theme::Theme;

use super::*;

fn group(name: &str, kind: &str, now: &str, members: &[&str]) -> Proxy {
    Proxy {
        name: name.to_string(),
        proxy_type: kind.to_string(),
        now: now.to_string(),
        all: members.iter().map(|m| m.to_string()).collect(),
        ..Proxy::default()
    }
}

fn snapshot(groups: Vec<Proxy>) -> Snapshot {
    let table: HashMap<String, Proxy> = groups.into_iter().map(|p| (p.name.clone(), p)).collect();
    Snapshot::from_proxies(table)
}

fn two_groups() -> Snapshot {
    snapshot(vec![
        group("Alpha", "Selector", "p2", &["p1", "p2", "p3"]),
        group("Beta", "URLTest", "q1", &["q1", "q2"]),
    ])
}

fn load(app: &mut App, snapshot: Snapshot) {
    let cmd = app.request_reload();
    app.update(Event::Loaded {
        seq: cmd.seq(),
        snapshot,
    });
}

fn press(app: &mut App, code: KeyCode) {
    app.update(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
}

/// Flatten styled lines to plain text, one string per row.
fn rendered(lines: &[Line<'_>]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.clone())
                .collect::<String>()
        })
        .collect()
}

#[test]
fn loading_screen_shows_banner() {
    let app = App::new();
    let lines = rendered(&frame_lines(&app, &Theme::default()));
    assert_eq!(lines, vec!["═".repeat(39), "  Loading proxies...".to_string()]);
}

#[test]
fn error_screen_shows_message_and_retry_hint() {
    let mut app = App::new();
    let cmd = app.request_reload();
    app.update(Event::Failed {
        seq: cmd.seq(),
        message: "dial tcp: connection refused".to_string(),
    });

    let lines = rendered(&frame_lines(&app, &Theme::default()));
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "  Error");
    assert_eq!(lines[2], "  dial tcp: connection refused");
    assert_eq!(lines[3], "  Press [r] retry, [q] quit");
}

#[test]
fn empty_snapshot_screen_offers_refresh() {
    let mut app = App::new();
    load(&mut app, snapshot(vec![]));

    let lines = rendered(&frame_lines(&app, &Theme::default()));
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "  No proxy groups found");
    assert_eq!(lines[2], "  Press [r] refresh, [q] quit");
}

#[test]
fn browser_fills_exactly_the_terminal_height() {
    let mut app = App::new();
    load(&mut app, two_groups());

    let lines = rendered(&frame_lines(&app, &Theme::default()));
    assert_eq!(lines.len(), 24);
    assert_eq!(lines[0], "   Alpha   ");
    assert_eq!(lines[1], "   p1");
    assert_eq!(lines[2], ">> p2", "cursor plus active member");
    assert_eq!(lines[3], "   p3");
    assert!(
        lines[4..22].iter().all(|l| l.is_empty()),
        "padding pushes the footer to the bottom"
    );
    assert_eq!(lines[22], "   Beta     [q1]");
    assert_eq!(
        lines[23],
        " [←h]Prev [→l]Next  [↑k]↑ [↓j]↓  [Ent]Select  [r]Reload  [q]Quit"
    );
}

#[test]
fn cursor_and_active_markers_are_distinct() {
    let mut app = App::new();
    load(&mut app, two_groups());
    press(&mut app, KeyCode::Char('j'));

    let lines = rendered(&frame_lines(&app, &Theme::default()));
    assert_eq!(lines[1], "   p1");
    assert_eq!(lines[2], " > p2", "active member keeps its margin marker");
    assert_eq!(lines[3], ">  p3", "cursor alone uses the plain arrow");
}

#[test]
fn overflowing_list_shows_position_on_cursor_row_only() {
    let members: Vec<String> = (0..50).map(|i| format!("node-{i:02}")).collect();
    let big = Proxy {
        name: "Big".to_string(),
        proxy_type: "Selector".to_string(),
        now: members[40].clone(),
        all: members,
        ..Proxy::default()
    };
    let mut app = App::new();
    load(&mut app, snapshot(vec![big]));

    let lines = rendered(&frame_lines(&app, &Theme::default()));
    assert_eq!(lines.len(), 24);
    // Window is the 22 rows ending on the cursor.
    assert_eq!(lines[1], "   node-19");
    assert_eq!(lines[22], ">> node-40 (41/50)");
    let tagged = lines.iter().filter(|l| l.contains("(41/50)")).count();
    assert_eq!(tagged, 1);
}

#[test]
fn short_terminals_get_the_compact_help_line() {
    let mut app = App::new();
    app.update(Event::Resize { height: 14 });
    load(&mut app, two_groups());

    let lines = rendered(&frame_lines(&app, &Theme::default()));
    assert_eq!(lines.len(), 14);
    assert_eq!(lines[13], " h/l:grp  j/k:prox  Ent:sel  r:reload  q:quit");
}

#[test]
fn group_without_members_renders_header_only() {
    let mut app = App::new();
    load(
        &mut app,
        snapshot(vec![
            group("B", "Selector", "b1", &["b1"]),
            group("Void", "Selector", "", &[]),
        ]),
    );
    press(&mut app, KeyCode::Char('l'));

    let lines = rendered(&frame_lines(&app, &Theme::default()));
    assert_eq!(lines.len(), 24);
    assert_eq!(lines[0], "   Void   ");
    assert!(lines[1..22].iter().all(|l| l.is_empty()));
    assert_eq!(lines[22], "   B       [b1]");
}

#[test]
fn draw_renders_into_a_test_backend() {
    let backend = TestBackend::new(60, 24);
    let mut terminal = Terminal::new(backend).expect("terminal");
    let mut app = App::new();
    load(&mut app, two_groups());
    let theme = Theme::default();

    terminal
        .draw(|frame| draw(frame, &app, &theme))
        .expect("draw");

    let buffer = terminal.backend().buffer();
    let header: String = (0u16..11)
        .map(|x| {
            buffer
                .cell((x, 0))
                .map(|c| c.symbol().to_string())
                .unwrap_or_default()
        })
        .collect();
    assert_eq!(header, "   Alpha   ");
}
