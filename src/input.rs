use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::components::Dir;
use crate::session::Command;

fn dir_for(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}

/// Maps a raw key event to a session command.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if let Some(dir) = dir_for(key.code) {
        return match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => Some(Command::Press(dir)),
            KeyEventKind::Release => Some(Command::Release(dir)),
        };
    }
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::TogglePause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
        KeyCode::Enter => Some(Command::Confirm),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Tracks the held direction key.
///
/// Most terminals never report key releases. Until one is seen, a key counts as
/// released once no press or repeat for it has arrived within the hold window.
#[derive(Debug)]
pub struct HeldKeys {
    held: Option<(Dir, Instant)>,
    hold: Duration,
    releases_reported: bool,
}

impl HeldKeys {
    pub fn new(hold: Duration) -> Self {
        Self {
            held: None,
            hold,
            releases_reported: false,
        }
    }

    pub fn observe(&mut self, key: &KeyEvent, now: Instant) -> Option<Command> {
        let command = command_for(key)?;
        match command {
            Command::Press(dir) => self.held = Some((dir, now)),
            Command::Release(dir) => {
                self.releases_reported = true;
                if self.held.is_some_and(|(held, _)| held == dir) {
                    self.held = None;
                }
            }
            _ => {}
        }
        Some(command)
    }

    /// Synthesizes a release for a key that went quiet.
    pub fn expire(&mut self, now: Instant) -> Option<Command> {
        if self.releases_reported {
            return None;
        }
        let (dir, seen) = self.held?;
        if now.saturating_duration_since(seen) < self.hold {
            return None;
        }
        self.held = None;
        Some(Command::Release(dir))
    }
}
