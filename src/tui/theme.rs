use ratatui::style::{Color, Modifier, Style};

/// Render palette. Built once at startup and passed by reference into
/// the view; nothing mutates it afterwards.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Status banners (loading, error, empty).
    pub banner: Style,
    /// The focused group's header bar.
    pub group_focused: Style,
    /// Collapsed one-line summaries of the other groups.
    pub group_summary: Style,
    pub member: Style,
    pub member_active: Style,
    /// The `>` margin marker on the active member's row.
    pub active_marker: Style,
    /// The `>>` / `>` cursor prefix.
    pub cursor: Style,
    /// Key hints and the scroll position indicator.
    pub help: Style,
    pub separator: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            banner: Style::default()
                .fg(Color::Indexed(147))
                .add_modifier(Modifier::BOLD),
            group_focused: Style::default()
                .bg(Color::Indexed(45))
                .fg(Color::Indexed(231))
                .add_modifier(Modifier::BOLD),
            group_summary: Style::default().bg(Color::Indexed(45)).fg(Color::Indexed(245)),
            member: Style::default().fg(Color::Indexed(245)),
            member_active: Style::default()
                .fg(Color::Indexed(86))
                .add_modifier(Modifier::BOLD),
            active_marker: Style::default()
                .fg(Color::Indexed(208))
                .add_modifier(Modifier::BOLD),
            cursor: Style::default()
                .fg(Color::Indexed(51))
                .add_modifier(Modifier::BOLD),
            help: Style::default().fg(Color::Indexed(244)),
            separator: Style::default().fg(Color::Indexed(240)),
        }
    }
}
