use std::path::PathBuf;
use submission_runner::ProjectLayout;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::{
    config::RecorderConfig,
    score::Score,
    suite::{SuiteRunner, UnittestSuite},
    Result,
};

/// What one recording pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The suite ran and its score was written
    Recorded(Score),
    /// No suite file; nothing was run or written
    SuiteMissing,
}

/// Runs a project's unit tests and writes `passed<TAB>total` to its result file
pub struct ResultRecorder {
    layout: ProjectLayout,
    suite: Box<dyn SuiteRunner>,
    suite_file: String,
    result_file: String,
}

impl ResultRecorder {
    pub fn new(layout: ProjectLayout, config: &RecorderConfig) -> Self {
        Self {
            layout,
            suite: Box::new(UnittestSuite::from_config(config)),
            suite_file: config.suite_file.clone(),
            result_file: config.result_file.clone(),
        }
    }

    /// Replace the unittest runner
    pub fn with_suite(mut self, suite: Box<dyn SuiteRunner>) -> Self {
        self.suite = suite;
        self
    }

    pub fn result_path(&self) -> PathBuf {
        self.layout.tests_dir().join(&self.result_file)
    }

    pub fn suite_path(&self) -> PathBuf {
        self.layout.tests_dir().join(&self.suite_file)
    }

    pub async fn record(&self) -> Result<RecordOutcome> {
        let result_path = self.result_path();
        match fs::remove_file(&result_path).await {
            Ok(()) => debug!("Removed stale {}", result_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        if !fs::try_exists(self.suite_path()).await? {
            error!("TESTS.PY FILE NOT FOUND! CHECK PATH!");
            return Ok(RecordOutcome::SuiteMissing);
        }

        info!("Test {}", self.layout.name());
        let summary = self.suite.run(&self.layout).await?;
        let score = Score::from_counts(summary.total, summary.failures, summary.errors);

        fs::write(&result_path, score.to_string()).await?;

        if score.all_passed() {
            info!("{} tests completed successfully!", score.total);
        } else {
            warn!("{}/{} tests failed!!", score.failed(), score.total);
        }
        Ok(RecordOutcome::Recorded(score))
    }
}
