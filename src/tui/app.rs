use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::{Proxy, Snapshot};

/// Terminal rows assumed until the first resize notification arrives.
const DEFAULT_HEIGHT: u16 = 24;

/// Rows reserved for the focused group's header bar.
const HEADER_ROWS: usize = 1;

/// Rows reserved for the key hint line.
const HELP_ROWS: usize = 1;

/// Closed union of everything that can reach the state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A key press from the terminal.
    Key(KeyEvent),
    /// A background fetch finished with a fresh snapshot.
    Loaded { seq: u64, snapshot: Snapshot },
    /// A background operation failed; `message` is shown verbatim.
    Failed { seq: u64, message: String },
    /// The terminal changed size.
    Resize { height: u16 },
}

/// Work a transition asks the runtime to perform off-thread. Each
/// command resolves to exactly one `Loaded` or `Failed` event tagged
/// with the same `seq`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cmd {
    /// Re-fetch the proxy table.
    Reload { seq: u64 },
    /// Switch `group` to `member`, then re-fetch.
    Select {
        seq: u64,
        group: String,
        member: String,
    },
}

impl Cmd {
    pub fn seq(&self) -> u64 {
        match self {
            Cmd::Reload { seq } => *seq,
            Cmd::Select { seq, .. } => *seq,
        }
    }
}

/// The whole interface state. Mutated only through [`App::update`];
/// rendering reads it and never writes.
pub struct App {
    snapshot: Snapshot,
    /// Index into `snapshot.groups()` of the expanded group.
    current: usize,
    /// Index into the focused group's member list.
    cursor: usize,
    /// First member row visible in the scroll window.
    viewport_top: usize,
    loading: bool,
    err: Option<String>,
    height: u16,
    quit: bool,
    /// Member name the cursor sat on before the last reload, so a
    /// refresh puts the cursor back where the user left it.
    last_cursor_member: Option<String>,
    /// Sequence number of the newest issued command. Completions
    /// tagged with anything older are superseded and dropped.
    issued_seq: u64,
}

impl App {
    pub fn new() -> Self {
        Self {
            snapshot: Snapshot::default(),
            current: 0,
            cursor: 0,
            viewport_top: 0,
            loading: true,
            err: None,
            height: DEFAULT_HEIGHT,
            quit: false,
            last_cursor_member: None,
            issued_seq: 0,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn viewport_top(&self) -> usize {
        self.viewport_top
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.err.as_deref()
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// The group currently expanded, if the snapshot has one.
    pub fn focused_group(&self) -> Option<&Proxy> {
        let name = self.snapshot.groups().get(self.current)?;
        self.snapshot.get(name)
    }

    pub fn focused_group_name(&self) -> Option<&str> {
        self.snapshot.groups().get(self.current).map(String::as_str)
    }

    /// Member rows that fit between the group header and the footer.
    pub fn visible_capacity(&self) -> usize {
        let summaries = self.snapshot.groups().len().saturating_sub(1);
        (self.height as usize)
            .saturating_sub(summaries + HEADER_ROWS + HELP_ROWS)
            .max(1)
    }

    /// Issue a reload. Used for the initial fetch and the `r` key;
    /// also valid mid-load, where it supersedes the outstanding
    /// request.
    pub fn request_reload(&mut self) -> Cmd {
        self.loading = true;
        self.issued_seq += 1;
        Cmd::Reload {
            seq: self.issued_seq,
        }
    }

    /// Apply one event, returning the background work it triggers.
    pub fn update(&mut self, event: Event) -> Option<Cmd> {
        match event {
            Event::Key(key) => self.on_key(key),
            Event::Loaded { seq, snapshot } => {
                self.on_loaded(seq, snapshot);
                None
            }
            Event::Failed { seq, message } => {
                self.on_failed(seq, message);
                None
            }
            Event::Resize { height } => {
                self.height = height;
                self.clamp_viewport();
                None
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Option<Cmd> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return None;
        }
        match key.code {
            KeyCode::Char('q') => {
                self.quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1);
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.move_group(-1);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_group(1);
                None
            }
            KeyCode::Char('r') => Some(self.request_reload()),
            KeyCode::Enter => self.confirm_selection(),
            _ => None,
        }
    }

    fn on_loaded(&mut self, seq: u64, snapshot: Snapshot) {
        if seq < self.issued_seq {
            return;
        }
        self.snapshot = snapshot;
        self.loading = false;
        self.err = None;
        if self.current >= self.snapshot.groups().len() {
            self.current = 0;
        }
        self.cursor = self.restored_cursor();
        self.viewport_top = 0;
        self.clamp_viewport();
        self.remember_cursor();
    }

    fn on_failed(&mut self, seq: u64, message: String) {
        if seq < self.issued_seq {
            return;
        }
        self.loading = false;
        self.err = Some(message);
    }

    /// Where the cursor lands after a load: the member it sat on
    /// before if that still exists, else the active member, else the
    /// top.
    fn restored_cursor(&self) -> usize {
        let Some(group) = self.focused_group() else {
            return 0;
        };
        if let Some(name) = &self.last_cursor_member
            && let Some(idx) = group.member_index(name)
        {
            return idx;
        }
        group.active_index().unwrap_or(0)
    }

    fn confirm_selection(&mut self) -> Option<Cmd> {
        if self.loading {
            return None;
        }
        let group = self.focused_group_name()?.to_string();
        let member = self.snapshot.get(&group)?.all.get(self.cursor)?.clone();
        self.loading = true;
        self.issued_seq += 1;
        Some(Cmd::Select {
            seq: self.issued_seq,
            group,
            member,
        })
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.loading {
            return;
        }
        let Some(count) = self.focused_group().map(|g| g.all.len()) else {
            return;
        };
        if count == 0 {
            return;
        }
        self.cursor = clamp_add(self.cursor, delta, count - 1);
        self.clamp_viewport();
        self.remember_cursor();
    }

    fn move_group(&mut self, delta: isize) {
        if self.loading {
            return;
        }
        let count = self.snapshot.groups().len();
        if count == 0 {
            return;
        }
        self.current = clamp_add(self.current, delta, count - 1);
        self.cursor = self
            .focused_group()
            .and_then(Proxy::active_index)
            .unwrap_or(0);
        self.viewport_top = 0;
        self.clamp_viewport();
        self.remember_cursor();
    }

    /// Restore the scroll invariants: the top never leaves rows blank
    /// at the bottom while rows are hidden at the top, and the cursor
    /// stays inside the window, moving it the minimum amount.
    fn clamp_viewport(&mut self) {
        let Some(count) = self.focused_group().map(|g| g.all.len()) else {
            self.viewport_top = 0;
            return;
        };
        if count == 0 {
            self.viewport_top = 0;
            return;
        }
        let capacity = self.visible_capacity();
        self.viewport_top = self.viewport_top.min(count.saturating_sub(capacity));
        if self.cursor < self.viewport_top {
            self.viewport_top = self.cursor;
        } else if self.cursor >= self.viewport_top + capacity {
            self.viewport_top = self.cursor + 1 - capacity;
        }
    }

    fn remember_cursor(&mut self) {
        self.last_cursor_member = self
            .focused_group()
            .and_then(|g| g.all.get(self.cursor))
            .cloned();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_add(value: usize, delta: isize, max: usize) -> usize {
    (value as isize + delta).clamp(0, max as isize) as usize
}

#[cfg(test)]
#[path = "../tests/tui/app_tests.rs"]
mod tests;
