//! # Submission Runner
//!
//! Runs a student's submission from the `src/` + `tests/` layout of an
//! assignment project. Python sources are screened against allow/deny library
//! lists, .NET and C/C++ projects are built first, and the program is then
//! launched with arguments, stdin text and a timeout. A launch that fails for
//! any reason other than the timeout is retried once through the shell.

pub mod background;
pub mod config;
mod error;
pub mod executor;
pub mod languages;
pub mod layout;
pub mod process;
pub mod toolchain;
mod types;

#[cfg(test)]
mod tests;

pub use background::{spawn_run, BackgroundRun};
pub use config::RunnerConfig;
pub use error::Error;
pub use executor::SubmissionExecutor;
pub use languages::{
    create_runner, numbers_format, DotNetRunner, LanguageRunner, NativeRunner, NumbersFormat,
    PythonRunner,
};
pub use layout::ProjectLayout;
pub use process::Invocation;
pub use toolchain::BuildReport;
pub use types::{Language, RunOutcome, RunRequest, RunStatus};

/// Result type for submission runs
pub type Result<T> = std::result::Result<T, Error>;
