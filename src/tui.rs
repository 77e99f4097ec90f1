//! Terminal lifecycle and the interaction engine.
//!
//! [`run`] owns the terminal from raw-mode entry to restore; the state
//! machine lives in [`app`], the layout in [`view`], and the worker
//! plumbing in the event loop. A panic anywhere still restores the
//! terminal before the report prints.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use crate::clash::ClashApi;

pub mod app;
mod event_loop;
pub mod theme;
pub mod view;

pub use self::app::{App, Cmd, Event};
pub use self::event_loop::run_cmd;
pub use self::theme::Theme;

/// Run the interface against `api` until the user quits.
pub fn run(api: Arc<dyn ClashApi>) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        bail!("an interactive terminal is required");
    }

    enable_raw_mode().context("enable raw mode")?;
    if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(err).context("enter alternate screen");
    }

    // Panics must not leave the terminal raw; restore first, then let
    // the default hook print the report on a usable screen.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        default_hook(panic_info);
    }));

    let result = run_session(api);

    restore_terminal();
    let _ = std::panic::take_hook();
    result
}

fn run_session(api: Arc<dyn ClashApi>) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().context("clear terminal")?;

    let mut app = App::new();
    if let Ok((_, rows)) = crossterm::terminal::size() {
        app.update(Event::Resize { height: rows });
    }
    let theme = Theme::default();
    info!("starting session");
    let result = event_loop::run_loop(&mut terminal, &mut app, api, &theme);
    let _ = terminal.show_cursor();
    result
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}
