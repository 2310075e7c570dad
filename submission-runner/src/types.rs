use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Supported submission kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    DotNet,
    C,
    Cpp,
}

impl Language {
    /// Extension of the entry file expected in `src/`
    pub fn entry_extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::DotNet => "cs",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" | "py" => Ok(Language::Python),
            "dotnet" | "csharp" | "cs" => Ok(Language::DotNet),
            "c" => Ok(Language::C),
            "cpp" | "c++" | "cc" => Ok(Language::Cpp),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}

/// Arguments for one submission run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Extra command-line arguments passed to the submission
    pub args: Vec<String>,
    /// Text piped to the submission's standard input
    pub input: String,
    /// Wall-clock budget for the child process
    pub timeout: Duration,
    /// Import substrings that abort the run when present
    pub denied_libraries: Vec<String>,
}

impl RunRequest {
    pub fn new(timeout: Duration) -> Self {
        Self {
            args: Vec::new(),
            input: String::new(),
            timeout,
            denied_libraries: Vec::new(),
        }
    }

    pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_denied_libraries<S: Into<String>>(
        mut self,
        libraries: impl IntoIterator<Item = S>,
    ) -> Self {
        self.denied_libraries = libraries.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for RunRequest {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS))
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Ran to completion; `code` is `None` when killed by a signal
    Completed { code: Option<i32> },
    /// Exceeded its timeout and was killed
    TimedOut,
}

/// Captured result of running a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Captured standard output; empty on timeout
    pub stdout: String,
    /// Index of the invocation strategy that produced this outcome
    pub strategy: usize,
}

impl RunOutcome {
    pub fn timed_out(strategy: usize) -> Self {
        Self {
            status: RunStatus::TimedOut,
            stdout: String::new(),
            strategy,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.status == RunStatus::TimedOut
    }

    pub fn success(&self) -> bool {
        self.status == RunStatus::Completed { code: Some(0) }
    }

    /// True when the primary invocation failed and a fallback produced the result
    pub fn used_fallback(&self) -> bool {
        self.strategy > 0
    }
}
