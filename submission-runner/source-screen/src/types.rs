use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{decode, error::Result};

/// Allowed libraries shipped with the crate, one accepted import substring per line.
pub const BUNDLED_ALLOWED_LIBRARIES: &str = include_str!("../allowed_libraries.txt");

/// Flat list of substrings matched against import lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryList {
    entries: Vec<String>,
}

impl LibraryList {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = S>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(Into::into)
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    /// Parse newline separated entries.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let lines = decode::read_lines(path)?;
        Ok(Self::new(lines))
    }

    pub fn bundled() -> Self {
        Self::parse(BUNDLED_ALLOWED_LIBRARIES)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// True when any entry occurs somewhere inside `line`.
    pub fn matches(&self, line: &str) -> bool {
        self.entries.iter().any(|entry| line.contains(entry.as_str()))
    }
}

/// Outcome of a non-fatal screening pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenReport {
    /// Every import line found in the submission.
    pub imports: Vec<String>,
    /// Import lines with no allow-list entry.
    pub unlisted: Vec<String>,
}

impl ScreenReport {
    pub fn is_clean(&self) -> bool {
        self.unlisted.is_empty()
    }
}
