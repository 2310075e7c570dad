//! # Grading Harness
//!
//! Records unit-test scores for student assignment projects. A project keeps
//! the submission in `src/` and its suite in `tests/`; recording runs the
//! suite and writes `passed<TAB>total` to `tests/result.txt`. A batch pass
//! visits every project below a root and gathers those scores into one report.
//!
//! Running submissions and screening their imports is provided by
//! [`submission_runner`] and [`source_screen`], re-exported here.

pub mod batch;
pub mod config;
mod error;
pub mod recorder;
pub mod score;
pub mod suite;

pub use batch::{BatchEntry, BatchRecorder, BatchReport};
pub use config::{HarnessConfig, RecorderConfig};
pub use error::Error;
pub use recorder::{RecordOutcome, ResultRecorder};
pub use score::Score;
pub use suite::{parse_unittest_summary, SuiteRunner, SuiteSummary, UnittestSuite};

pub use source_screen;
pub use submission_runner;
pub use submission_runner::{
    spawn_run, Language, ProjectLayout, RunOutcome, RunRequest, RunnerConfig, SubmissionExecutor,
};

/// Result type for recording operations
pub type Result<T> = std::result::Result<T, Error>;
