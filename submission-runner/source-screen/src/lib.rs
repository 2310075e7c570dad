//! Source Screen
//!
//! Loads student submissions whatever their text encoding, extracts their
//! import statements and screens them against allow/deny library lists
//! before any submission code is run.

pub mod allowlist;
pub mod analyzer;
pub mod decode;
pub mod error;
pub mod screen;
mod types;

#[cfg(test)]
mod tests;

pub use allowlist::{print_allowed_libraries, print_bundled_allowed_libraries};
pub use analyzer::{ImportAnalyzer, PythonAnalyzer};
pub use decode::{read_source, TextEncoding, DEFAULT_ENCODINGS};
pub use error::{Error, Result};
pub use screen::Screen;
pub use types::{LibraryList, ScreenReport, BUNDLED_ALLOWED_LIBRARIES};

use std::path::Path;

/// Read `path` and screen its imports with `analyzer`.
pub fn screen_file(
    path: impl AsRef<Path>,
    analyzer: &dyn ImportAnalyzer,
    screen: &Screen,
    encodings: &[TextEncoding],
) -> Result<ScreenReport> {
    let source = read_source(path, encodings)?;
    let imports = analyzer.collect_imports(&source);
    screen.screen(&imports)
}
