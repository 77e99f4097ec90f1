use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, info, warn};

use crate::clash::ClashApi;

use super::app::{App, Cmd, Event};
use super::theme::Theme;
use super::view;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pause between a successful selection and the follow-up fetch, so
/// the daemon has applied the switch before we read it back.
const SELECT_SETTLE: Duration = Duration::from_millis(200);

/// Drive the interface until the user quits. Keys come from the
/// terminal; command completions come back over a channel from worker
/// threads, so drawing never blocks on the daemon.
pub(super) fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    api: Arc<dyn ClashApi>,
    theme: &Theme,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    dispatch(app.request_reload(), &api, &tx);

    loop {
        terminal
            .draw(|frame| view::draw(frame, app, theme))
            .context("draw frame")?;
        if app.should_quit() {
            info!("quit requested");
            return Ok(());
        }

        if event::poll(POLL_INTERVAL).context("poll terminal events")? {
            match event::read().context("read terminal event")? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(cmd) = app.update(Event::Key(key)) {
                        dispatch(cmd, &api, &tx);
                    }
                }
                TermEvent::Resize(_, rows) => {
                    app.update(Event::Resize { height: rows });
                }
                _ => {}
            }
        }

        while let Ok(completion) = rx.try_recv() {
            app.update(completion);
        }
    }
}

/// Run `cmd` on a worker thread; its completion event lands on `tx`.
fn dispatch(cmd: Cmd, api: &Arc<dyn ClashApi>, tx: &Sender<Event>) {
    let api = Arc::clone(api);
    let tx = tx.clone();
    thread::spawn(move || {
        // The receiver is gone once the loop exits; nothing to do with
        // a completion then.
        let _ = tx.send(run_cmd(cmd, api.as_ref()));
    });
}

/// Execute one command to completion and return the event it resolves
/// to. Exactly one `Loaded` or `Failed` per command, tagged with the
/// command's sequence number.
pub fn run_cmd(cmd: Cmd, api: &dyn ClashApi) -> Event {
    match cmd {
        Cmd::Reload { seq } => {
            debug!(seq, "reloading proxy table");
            fetch_completion(api, seq)
        }
        Cmd::Select { seq, group, member } => {
            debug!(seq, group, member, "applying selection");
            if let Err(err) = api.select(&group, &member) {
                warn!(seq, error = %err, "selection failed");
                return Event::Failed {
                    seq,
                    message: err.to_string(),
                };
            }
            thread::sleep(SELECT_SETTLE);
            fetch_completion(api, seq)
        }
    }
}

fn fetch_completion(api: &dyn ClashApi, seq: u64) -> Event {
    match api.fetch_snapshot() {
        Ok(snapshot) => Event::Loaded { seq, snapshot },
        Err(err) => {
            warn!(seq, error = %err, "fetch failed");
            Event::Failed {
                seq,
                message: err.to_string(),
            }
        }
    }
}
