use serde::Serialize;

use crate::error::{EngineError, Result};

/// Entry state of a single passage character
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CharacterEntry {
    pub target: char,
    pub status: Status,
}

impl CharacterEntry {
    pub fn pending(target: char) -> Self {
        Self {
            target,
            status: Status::Pending,
        }
    }
}

/// The target text of a session and the entry state of each character.
///
/// Targets are fixed at construction. Statuses change only through
/// [`Passage::set_status`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    entries: Vec<CharacterEntry>,
}

impl Passage {
    pub fn new(text: &str) -> Self {
        Self {
            entries: text.chars().map(CharacterEntry::pending).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn target(&self, idx: usize) -> Option<char> {
        self.entries.get(idx).map(|e| e.target)
    }

    pub fn status(&self, idx: usize) -> Option<Status> {
        self.entries.get(idx).map(|e| e.status)
    }

    pub fn set_status(&mut self, idx: usize, status: Status) -> Result<()> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(idx)
            .ok_or(EngineError::Index { index: idx, len })?;
        entry.status = status;
        Ok(())
    }

    pub fn entries(&self) -> &[CharacterEntry] {
        &self.entries
    }

    /// Owned copy of the current entries
    pub fn snapshot(&self) -> Vec<CharacterEntry> {
        self.entries.clone()
    }

    pub fn text(&self) -> String {
        self.entries.iter().map(|e| e.target).collect()
    }
}
