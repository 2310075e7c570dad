use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::{error::Error, Result};

pub const SRC_DIR: &str = "src";
pub const TESTS_DIR: &str = "tests";
pub const RESULT_FILE: &str = "result.txt";
pub const SCRATCH_FILE: &str = "my_test_code.py";

/// The `src/` + `tests/` convention of one assignment project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name of the project, used in reports
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join(SRC_DIR)
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.root.join(TESTS_DIR)
    }

    pub fn result_file(&self) -> PathBuf {
        self.tests_dir().join(RESULT_FILE)
    }

    pub fn scratch_file(&self) -> PathBuf {
        self.tests_dir().join(SCRATCH_FILE)
    }

    /// First file in `src/` with the given extension, by file name
    pub async fn find_entry(&self, extension: &str) -> Result<PathBuf> {
        let src = self.src_dir();
        first_with_extension(&src, extension).await?.ok_or_else(|| {
            Error::NotFound(format!(
                "No .{} file found in the src directory: {}",
                extension,
                src.display()
            ))
        })
    }

    /// First file in the project root with the given extension, by file name
    pub async fn find_project_file(&self, extension: &str) -> Result<PathBuf> {
        first_with_extension(&self.root, extension).await?.ok_or_else(|| {
            Error::NotFound(format!(
                "No .{} file found in {}",
                extension,
                self.root.display()
            ))
        })
    }
}

async fn first_with_extension(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(format!("Directory not found: {}", dir.display())))
        }
        Err(e) => return Err(e.into()),
    };

    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == extension) {
            continue;
        }
        if fs::metadata(&path).await?.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();

    if candidates.len() > 1 {
        debug!(
            "Found {} .{} files in {}, using {}",
            candidates.len(),
            extension,
            dir.display(),
            candidates[0].display()
        );
    }
    Ok(candidates.into_iter().next())
}
