use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Build failed: {0}")]
    Build(String),

    #[error("Missing required tools: {0}")]
    MissingTools(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Background run failed: {0}")]
    Background(String),

    #[error(transparent)]
    Screen(#[from] source_screen::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
