use async_trait::async_trait;
use regex::Regex;
use std::{process::Stdio, sync::OnceLock, time::Duration};
use submission_runner::{layout::TESTS_DIR, ProjectLayout};
use tokio::{process::Command, time};
use tracing::{debug, info};

use crate::{config::RecorderConfig, error::Error, Result};

/// Counts reported by one unit-test run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub total: usize,
    pub failures: usize,
    pub errors: usize,
}

/// Runs a project's unit-test suite and reports its counts
#[async_trait]
pub trait SuiteRunner: Send + Sync {
    async fn run(&self, layout: &ProjectLayout) -> Result<SuiteSummary>;
}

/// `python -m unittest discover` over `tests/<suite_file>`
pub struct UnittestSuite {
    interpreter: String,
    pattern: String,
    timeout: Duration,
}

impl UnittestSuite {
    pub fn new(interpreter: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            pattern: pattern.into(),
            timeout: RecorderConfig::default().suite_timeout(),
        }
    }

    pub fn from_config(config: &RecorderConfig) -> Self {
        Self::new(config.interpreter.clone(), config.suite_file.clone())
            .with_timeout(config.suite_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, layout: &ProjectLayout) -> Command {
        let mut command = Command::new(&self.interpreter);
        command
            .args(["-m", "unittest", "discover", "-s", TESTS_DIR, "-p"])
            .arg(&self.pattern)
            .arg("-v")
            .current_dir(layout.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl SuiteRunner for UnittestSuite {
    async fn run(&self, layout: &ProjectLayout) -> Result<SuiteSummary> {
        debug!(
            "Suite - Command: {} -m unittest discover -s {} -p {} -v",
            self.interpreter, TESTS_DIR, self.pattern
        );

        let child = self
            .command(layout)
            .spawn()
            .map_err(|e| Error::Suite(format!("Failed to start {}: {}", self.interpreter, e)))?;

        let output = time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::Suite(format!("Timed out after {} s", self.timeout.as_secs())))??;

        // unittest reports on stderr; submissions may print to stdout
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines().chain(stderr.lines()) {
            info!("{}", line);
        }

        parse_unittest_summary(&stderr)
    }
}

fn ran_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^Ran (\d+) tests? in ").expect("valid regex"))
}

fn failed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^FAILED \(([^)]*)\)").expect("valid regex"))
}

/// Parse the closing summary unittest writes to stderr.
///
/// Uses the last `Ran N tests` line and, when present, the counts of the
/// following `FAILED (failures=F, errors=E)` line.
pub fn parse_unittest_summary(text: &str) -> Result<SuiteSummary> {
    let ran = ran_pattern()
        .captures_iter(text)
        .last()
        .ok_or_else(|| Error::Suite("no `Ran N tests` line in unittest output".to_string()))?;
    let total = parse_count(&ran[1])?;
    let tail = &text[ran.get(0).map_or(0, |m| m.end())..];

    let mut summary = SuiteSummary {
        total,
        ..SuiteSummary::default()
    };

    if let Some(failed) = failed_pattern().captures(tail) {
        for item in failed[1].split(',') {
            match item.trim().split_once('=') {
                Some(("failures", count)) => summary.failures = parse_count(count)?,
                Some(("errors", count)) => summary.errors = parse_count(count)?,
                _ => {}
            }
        }
    }

    Ok(summary)
}

fn parse_count(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| Error::Suite(format!("invalid test count {:?}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_passing_run() {
        let text = "test_add (tests.Tests.test_add) ... ok\n\
                    \n----------------------------------------------------------------------\n\
                    Ran 3 tests in 0.002s\n\nOK\n";
        assert_eq!(
            parse_unittest_summary(text).unwrap(),
            SuiteSummary {
                total: 3,
                failures: 0,
                errors: 0
            }
        );
    }

    #[test]
    fn parses_failures_and_errors() {
        let text = "Ran 5 tests in 0.010s\n\nFAILED (failures=2, errors=1, skipped=1)\n";
        let summary = parse_unittest_summary(text).unwrap();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.failures, 2);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn expected_failures_are_not_failures() {
        let text = "Ran 2 tests in 0.001s\n\nFAILED (errors=1, expected failures=1)\n";
        let summary = parse_unittest_summary(text).unwrap();
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn uses_last_summary_block() {
        let text = "Ran 9 tests in 0.1s\nprinted by a test\nRan 1 test in 0.001s\n\nOK\n";
        assert_eq!(parse_unittest_summary(text).unwrap().total, 1);
    }

    #[test]
    fn missing_summary_is_an_error() {
        assert!(matches!(
            parse_unittest_summary("Traceback (most recent call last):\n"),
            Err(Error::Suite(_))
        ));
    }
}
