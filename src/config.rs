use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use submission_runner::RunnerConfig;

use crate::{error::Error, Result};

#[cfg(windows)]
const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
const DEFAULT_PYTHON: &str = "python3";

/// Settings for recording test results, per project and in batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Interpreter running `-m unittest`
    pub interpreter: String,
    /// Suite module inside `tests/`
    pub suite_file: String,
    /// Score file written inside `tests/`
    pub result_file: String,
    /// Aggregate report written in the batch root
    pub aggregate_file: String,
    /// Child directories the batch never visits
    pub skip_dirs: Vec<String>,
    /// Command run inside each project directory by the batch
    pub test_command: Vec<String>,
    pub suite_timeout_secs: u64,
    pub command_timeout_secs: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_PYTHON.to_string(),
            suite_file: "tests.py".to_string(),
            result_file: "result.txt".to_string(),
            aggregate_file: "results.txt".to_string(),
            skip_dirs: vec!["ex_template".to_string(), "helpers".to_string()],
            test_command: vec!["test_assignment".to_string()],
            suite_timeout_secs: 600,
            command_timeout_secs: 600,
        }
    }
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.test_command.is_empty() {
            return Err(Error::Config("test_command must not be empty".to_string()));
        }
        if self.suite_timeout_secs == 0 || self.command_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be positive".to_string()));
        }
        Ok(())
    }

    pub fn suite_timeout(&self) -> Duration {
        Duration::from_secs(self.suite_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_test_command<S: Into<String>>(mut self, command: impl IntoIterator<Item = S>) -> Self {
        self.test_command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_dirs<S: Into<String>>(mut self, dirs: impl IntoIterator<Item = S>) -> Self {
        self.skip_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_aggregate_file(mut self, name: impl Into<String>) -> Self {
        self.aggregate_file = name.into();
        self
    }
}

/// Runner and recorder settings read from one TOML document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub runner: RunnerConfig,
    pub recorder: RecorderConfig,
}

impl HarnessConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.runner.validate()?;
        config.recorder.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&text)
    }
}
