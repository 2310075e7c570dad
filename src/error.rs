use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Runner(#[from] submission_runner::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Test suite error: {0}")]
    Suite(String),

    #[error("Invalid score: {0}")]
    Score(String),
}
