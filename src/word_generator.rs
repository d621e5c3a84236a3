use itertools::Itertools;
use rand::{seq::SliceRandom, RngCore};

use crate::{
    error::{EngineError, Result},
    language::Language,
    passage::Passage,
};

/// Configuration for word generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordGenConfig {
    pub number_of_words: usize,
}

/// Builds passages by sampling a corpus uniformly, with replacement
#[derive(Debug, Clone)]
pub struct WordGenerator {
    language: Language,
    config: WordGenConfig,
}

impl WordGenerator {
    pub fn new(language: Language, config: WordGenConfig) -> Result<Self> {
        if language.is_empty() {
            return Err(EngineError::configuration(format!(
                "corpus '{}' contains no words",
                language.name
            )));
        }
        if config.number_of_words == 0 {
            return Err(EngineError::configuration(
                "word count must be at least 1",
            ));
        }
        Ok(Self { language, config })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Generate the passage text: words joined by exactly one space
    pub fn generate_prompt(&self, rng: &mut dyn RngCore) -> String {
        (0..self.config.number_of_words)
            .filter_map(|_| self.language.words.choose(&mut *rng))
            .join(" ")
    }

    /// Generate a fresh all-pending passage
    pub fn generate(&self, rng: &mut dyn RngCore) -> Passage {
        Passage::new(&self.generate_prompt(rng))
    }
}
