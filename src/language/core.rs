use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, Result};

static LANG_DIR: Dir = include_dir!("src/lang");

/// A word corpus passages are sampled from
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    /// Load one of the corpora bundled into the binary
    pub fn new(name: &str) -> Result<Self> {
        let lang = read_language_from_file(&format!("{name}.json"))?;
        lang.validate()
    }

    /// Build a corpus from a whitespace separated word list.
    /// Runs of whitespace never produce empty words.
    pub fn from_word_list(name: impl Into<String>, text: &str) -> Result<Self> {
        let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        Self {
            name: name.into(),
            size: words.len() as u32,
            words,
        }
        .validate()
    }

    /// Load a user supplied word list from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            EngineError::configuration(format!("unable to read {}: {e}", path.display()))
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Self::from_word_list(name, &text)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn validate(self) -> Result<Self> {
        if self.is_empty() {
            return Err(EngineError::configuration(format!(
                "corpus '{}' contains no words",
                self.name
            )));
        }
        Ok(self)
    }
}

fn read_language_from_file(file_name: &str) -> Result<Language> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| EngineError::configuration(format!("language file {file_name} not found")))?;

    let file_as_str = file.contents_utf8().ok_or_else(|| {
        EngineError::configuration(format!("language file {file_name} is not utf-8"))
    })?;

    from_str(file_as_str)
        .map_err(|e| EngineError::configuration(format!("unable to parse {file_name}: {e}")))
}
