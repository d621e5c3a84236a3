//! Keystroke classification and application.
//!
//! Terminal key events are reduced to [`KeyAction`] at the boundary; the
//! [`InputProcessor`] only ever sees plain characters.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    error::Result,
    passage::{Passage, Status},
    timer::Phase,
};

/// A classified keystroke
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Character(char),
    Delete,
    Reset,
    Ignored,
}

impl From<KeyEvent> for KeyAction {
    fn from(key: KeyEvent) -> Self {
        if key.kind == KeyEventKind::Release {
            return KeyAction::Ignored;
        }
        // chords are shortcuts, not text
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
        {
            return KeyAction::Ignored;
        }

        match key.code {
            KeyCode::Backspace => KeyAction::Delete,
            KeyCode::Tab => KeyAction::Reset,
            KeyCode::Char(c) if !c.is_control() => KeyAction::Character(fold_case(c)),
            _ => KeyAction::Ignored,
        }
    }
}

/// Single character lowercase form; characters whose lowercase expands to
/// several chars are kept as typed.
fn fold_case(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Result of applying a keystroke to the passage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// Nothing changed
    Ignored,
    /// Cursor advanced; `first` is set for the first character accepted this session
    Advanced { correct: bool, first: bool },
    Retreated,
}

/// Owns the cursor and applies characters and deletions to a passage
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputProcessor {
    cursor_pos: usize,
    has_accepted: bool,
}

impl InputProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    pub fn on_character(
        &mut self,
        passage: &mut Passage,
        c: char,
        phase: Phase,
    ) -> Result<Applied> {
        if phase == Phase::Expired {
            return Ok(Applied::Ignored);
        }
        let Some(expected) = passage.target(self.cursor_pos) else {
            return Ok(Applied::Ignored);
        };

        let correct = fold_case(c) == fold_case(expected);
        let status = if correct {
            Status::Correct
        } else {
            Status::Incorrect
        };
        passage.set_status(self.cursor_pos, status)?;
        self.cursor_pos += 1;

        let first = !self.has_accepted;
        self.has_accepted = true;

        Ok(Applied::Advanced { correct, first })
    }

    pub fn on_delete(&mut self, passage: &mut Passage, phase: Phase) -> Result<Applied> {
        if phase == Phase::Expired || self.cursor_pos == 0 {
            return Ok(Applied::Ignored);
        }

        passage.set_status(self.cursor_pos - 1, Status::Pending)?;
        self.cursor_pos -= 1;

        Ok(Applied::Retreated)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
