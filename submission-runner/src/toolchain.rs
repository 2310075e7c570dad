use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};
use tokio::{fs, time};
use tracing::{debug, error, info, warn};
use which::which;

use crate::{
    error::Error,
    process::{self, Invocation},
    Result,
};

pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 300;

/// Exit state of one build attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildAttempt {
    /// Build tool exited; `code` is `None` when killed by a signal
    Exited { code: Option<i32> },
    /// Build tool could not be started
    SpawnFailed(String),
    /// Build tool was killed after exceeding its timeout
    TimedOut,
}

impl BuildAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self, BuildAttempt::Exited { code: Some(0) })
    }
}

/// Both attempts of a build, so a failed retry stays observable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub first: BuildAttempt,
    pub retry: Option<BuildAttempt>,
}

impl BuildReport {
    /// Whether the last attempt made produced a successful exit
    pub fn succeeded(&self) -> bool {
        self.retry.as_ref().unwrap_or(&self.first).succeeded()
    }

    pub fn retried(&self) -> bool {
        self.retry.is_some()
    }

    /// Fail with `Error::Build` unless the build succeeded
    pub fn ensure_success(&self) -> Result<()> {
        if self.succeeded() {
            Ok(())
        } else {
            Err(Error::Build(format!(
                "first attempt {:?}, retry {:?}",
                self.first, self.retry
            )))
        }
    }
}

/// An external build command and the directory it runs in
#[derive(Debug, Clone)]
pub struct BuildStep {
    pub invocation: Invocation,
    pub cwd: PathBuf,
    /// Budget for each attempt
    pub timeout: Duration,
}

impl BuildStep {
    pub fn new(invocation: Invocation, cwd: impl Into<PathBuf>) -> Self {
        Self {
            invocation,
            cwd: cwd.into(),
            timeout: Duration::from_secs(DEFAULT_BUILD_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn attempt(&self, invocation: &Invocation) -> BuildAttempt {
        debug!("Build - Command: {} in {:?}", invocation, self.cwd);
        let mut command = invocation.command(&self.cwd);
        command.stdin(Stdio::null()).kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => return BuildAttempt::SpawnFailed(e.to_string()),
        };

        let child_id = child.id();
        match time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => BuildAttempt::Exited {
                code: status.code(),
            },
            Ok(Err(e)) => BuildAttempt::SpawnFailed(e.to_string()),
            Err(_) => {
                warn!("Build timed out after {} s: {}", self.timeout.as_secs(), invocation);
                if let Some(id) = child_id {
                    process::kill_group(id);
                }
                BuildAttempt::TimedOut
            }
        }
    }
}

/// Run the build, retrying once as a shell line when it does not succeed.
///
/// The caller proceeds whatever the outcome; the report tells whether the
/// retry itself failed.
pub async fn build_with_retry(step: &BuildStep) -> BuildReport {
    let first = step.attempt(&step.invocation).await;
    if first.succeeded() {
        return BuildReport { first, retry: None };
    }

    warn!("!!Compile fell to fallback!! {} ({:?})", step.invocation, first);
    let retry = step.attempt(&step.invocation.to_shell()).await;
    if retry.succeeded() {
        info!("Fallback build completed");
    } else {
        error!("Fallback build failed too ({:?}); running the previous build output, if any", retry);
    }

    BuildReport {
        first,
        retry: Some(retry),
    }
}

/// Remove build artifact directories under `root`; missing ones are skipped.
pub async fn remove_artifacts(root: &Path, dirs: &[&str]) -> Result<()> {
    for dir in dirs {
        let path = root.join(dir);
        match fs::remove_dir_all(&path).await {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Fail when any of `tools` is not on PATH
pub fn check_tools(tools: &[&str]) -> Result<()> {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which(tool).is_err())
        .map(|s| (*s).to_string())
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingTools(missing.join(", ")));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn skip_if_not_available(tools: &[&str]) -> bool {
    if let Err(e) = check_tools(tools) {
        eprintln!("Skipping test: {}", e);
        return true;
    }
    false
}
