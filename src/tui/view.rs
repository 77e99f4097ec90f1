//! Pure projection of [`App`] state into terminal lines. Nothing in
//! here mutates state or talks to the daemon, which is what makes the
//! layout testable without a terminal.

use ratatui::Frame;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;

use super::app::App;
use super::theme::Theme;

const SEPARATOR_WIDTH: usize = 39;

/// Rows the ready screen always spends below the member window: the
/// key hint line.
const FOOTER_ROWS: usize = 1;

pub fn draw(frame: &mut Frame, app: &App, theme: &Theme) {
    let area = frame.area();
    let lines = frame_lines(app, theme);
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// Build the full frame for the current state. One of four screens:
/// loading, error, empty, or the group browser.
pub fn frame_lines(app: &App, theme: &Theme) -> Vec<Line<'static>> {
    if app.loading() {
        return vec![
            separator(theme),
            Line::from(Span::styled("  Loading proxies...".to_string(), theme.banner)),
        ];
    }
    if let Some(err) = app.error() {
        return vec![
            separator(theme),
            Line::from(Span::styled("  Error".to_string(), theme.banner)),
            Line::from(format!("  {err}")),
            Line::from(Span::styled(
                "  Press [r] retry, [q] quit".to_string(),
                theme.help,
            )),
        ];
    }
    let groups = app.snapshot().groups();
    if groups.is_empty() {
        return vec![
            separator(theme),
            Line::from(Span::styled(
                "  No proxy groups found".to_string(),
                theme.banner,
            )),
            Line::from(Span::styled(
                "  Press [r] refresh, [q] quit".to_string(),
                theme.help,
            )),
        ];
    }

    let max_width = groups.iter().map(|g| g.chars().count()).max().unwrap_or(0);
    let mut lines = Vec::new();
    let mut content_rows = 0usize;

    if let Some(group) = app.focused_group() {
        lines.push(Line::from(Span::styled(
            padded_group(&group.name, max_width),
            theme.group_focused,
        )));
        content_rows += 1;

        let capacity = app.visible_capacity();
        let total = group.all.len();
        let overflow = total > capacity;
        let start = if overflow { app.viewport_top() } else { 0 };
        let end = if overflow {
            (start + capacity).min(total)
        } else {
            total
        };
        for (row, member) in group.all[start..end].iter().enumerate() {
            let idx = start + row;
            let is_active = *member == group.now;
            let is_cursor = idx == app.cursor();
            let mut spans = if is_cursor && is_active {
                vec![
                    Span::styled(">> ".to_string(), theme.cursor),
                    Span::styled(member.clone(), theme.member_active),
                ]
            } else if is_cursor {
                vec![
                    Span::styled(">  ".to_string(), theme.cursor),
                    Span::raw(member.clone()),
                ]
            } else if is_active {
                vec![
                    Span::raw(" ".to_string()),
                    Span::styled(">".to_string(), theme.active_marker),
                    Span::raw(" ".to_string()),
                    Span::styled(member.clone(), theme.member_active),
                ]
            } else {
                vec![
                    Span::raw("   ".to_string()),
                    Span::styled(member.clone(), theme.member),
                ]
            };
            if is_cursor && overflow {
                spans.push(Span::styled(
                    format!(" ({}/{})", app.cursor() + 1, total),
                    theme.help,
                ));
            }
            lines.push(Line::from(spans));
            content_rows += 1;
        }
    }

    // Push the collapsed summaries and the help line to the bottom of
    // the screen.
    if content_rows > 0 {
        let summaries = groups.len() - 1;
        let padding = (app.height() as usize).saturating_sub(content_rows + summaries + FOOTER_ROWS);
        for _ in 0..padding {
            lines.push(Line::default());
        }
    }

    for (i, name) in groups.iter().enumerate() {
        if i == app.current() {
            continue;
        }
        let Some(proxy) = app.snapshot().get(name) else {
            continue;
        };
        lines.push(Line::from(vec![
            Span::styled(padded_group(name, max_width), theme.group_summary),
            Span::raw(" ".to_string()),
            Span::styled(format!("[{}]", proxy.now), theme.help),
        ]));
    }

    let help = if app.height() < 15 {
        " h/l:grp  j/k:prox  Ent:sel  r:reload  q:quit"
    } else {
        " [←h]Prev [→l]Next  [↑k]↑ [↓j]↓  [Ent]Select  [r]Reload  [q]Quit"
    };
    lines.push(Line::from(Span::styled(help.to_string(), theme.help)));
    lines
}

fn separator(theme: &Theme) -> Line<'static> {
    Line::from(Span::styled("═".repeat(SEPARATOR_WIDTH), theme.separator))
}

fn padded_group(name: &str, max_width: usize) -> String {
    let pad = max_width.saturating_sub(name.chars().count());
    format!("   {}{}   ", name, " ".repeat(pad))
}

#[cfg(test)]
#[path = "../tests/tui/view_tests.rs"]
mod tests;
