//! Typing metrics computed from a snapshot of passage entries.
//!
//! Words are delimited by space characters in the target text. A word only
//! counts once its terminating space has been typed, so a final word with no
//! trailing space never earns credit.

use serde::Serialize;

use crate::passage::{CharacterEntry, Status};

/// Words typed correctly per minute, extrapolated over `duration_secs`
pub fn wpm(entries: &[CharacterEntry], duration_secs: u32) -> u32 {
    let words = count_words(entries, |status| status == Status::Correct);
    per_minute(words, duration_secs)
}

/// Words attempted per minute; incorrect characters do not spoil a word
pub fn raw_wpm(entries: &[CharacterEntry], duration_secs: u32) -> u32 {
    let words = count_words(entries, |status| status != Status::Pending);
    per_minute(words, duration_secs)
}

/// Percentage of attempted characters that matched, rounded to 2 decimals.
/// Zero when nothing was attempted.
pub fn accuracy(entries: &[CharacterEntry]) -> f64 {
    let (correct, incorrect) = char_counts(entries);
    let attempted = correct + incorrect;
    if attempted == 0 {
        return 0.0;
    }
    round2(correct as f64 / attempted as f64 * 100.0)
}

/// (correct, incorrect) character counts
pub fn char_counts(entries: &[CharacterEntry]) -> (usize, usize) {
    entries
        .iter()
        .fold((0, 0), |(correct, incorrect), e| match e.status {
            Status::Correct => (correct + 1, incorrect),
            Status::Incorrect => (correct, incorrect + 1),
            Status::Pending => (correct, incorrect),
        })
}

/// Scan for completed words. An entry whose status is not `counts` spoils the
/// current word and is skipped, so it never acts as a boundary itself.
fn count_words(entries: &[CharacterEntry], counts: impl Fn(Status) -> bool) -> u32 {
    let mut words = 0;
    let mut word_ok = true;

    for entry in entries {
        if !counts(entry.status) {
            word_ok = false;
            continue;
        }
        if entry.target == ' ' {
            if word_ok {
                words += 1;
            }
            word_ok = true;
        }
    }

    words
}

fn per_minute(words: u32, duration_secs: u32) -> u32 {
    if duration_secs == 0 {
        return 0;
    }
    (words * 60).div_ceil(duration_secs)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Final metrics of a session
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Results {
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: f64,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
}

impl Results {
    pub fn from_entries(entries: &[CharacterEntry], duration_secs: u32) -> Self {
        let (correct_chars, incorrect_chars) = char_counts(entries);
        Self {
            wpm: wpm(entries, duration_secs),
            raw_wpm: raw_wpm(entries, duration_secs),
            accuracy: accuracy(entries),
            correct_chars,
            incorrect_chars,
        }
    }

    /// Accuracy as shown to the user, always two decimals
    pub fn accuracy_label(&self) -> String {
        format!("{:.2}", self.accuracy)
    }
}
