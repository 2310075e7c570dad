use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found at the specified path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Could not decode {} with any of the configured encodings", .0.display())]
    Decode(PathBuf),

    #[error("You are not allowed to use the following libraries on this task: {0:?}")]
    DeniedLibraries(Vec<String>),
}

impl Error {
    /// Map a failed read of `path`, keeping a missing file distinguishable
    /// from other I/O failures.
    pub fn from_read(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.into())
        } else {
            Error::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
