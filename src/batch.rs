use std::path::{Path, PathBuf};
use submission_runner::{process, Invocation};
use tokio::{
    fs::{self, File},
    io::{AsyncWriteExt, BufWriter},
};
use tracing::{debug, info, warn};

use crate::{config::RecorderConfig, Result};

/// One visited project and the result text read from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub name: String,
    /// Raw result file text; `None` when the project wrote none
    pub result: Option<String>,
}

impl BatchEntry {
    /// The aggregate report line, newline included
    pub fn line(&self) -> String {
        match &self.result {
            Some(result) => format!("{}\t{}\n", self.name, result),
            None => format!("{}\t0\t0\n", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Path of the aggregate report file
    pub path: PathBuf,
    pub entries: Vec<BatchEntry>,
}

/// Runs the test command in every project below a root and collects the scores
pub struct BatchRecorder {
    root: PathBuf,
    config: RecorderConfig,
}

impl BatchRecorder {
    pub fn new(root: impl Into<PathBuf>, config: RecorderConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.root.join(&self.config.aggregate_file)
    }

    pub async fn run(&self) -> Result<BatchReport> {
        self.config.validate()?;

        let path = self.report_path();
        if fs::try_exists(&path).await? {
            info!("Removing old result file {}", path.display());
            fs::remove_file(&path).await?;
        }
        let mut writer = BufWriter::new(File::create(&path).await?);

        let mut entries = Vec::new();
        for (name, dir) in self.project_dirs().await? {
            self.run_tests(&name, &dir).await;

            let entry = BatchEntry {
                result: self.read_result(&name, &dir).await?,
                name,
            };
            writer.write_all(entry.line().as_bytes()).await?;
            entries.push(entry);
        }
        writer.flush().await?;

        Ok(BatchReport { path, entries })
    }

    /// Child directories in name order, minus the skip list
    async fn project_dirs(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut dirs = Vec::new();
        let mut read_dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.config.skip_dirs.contains(&name) {
                debug!("Skipping {}", name);
                continue;
            }
            if entry.file_type().await?.is_dir() {
                dirs.push((name, entry.path()));
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Run the test command in `dir`; failures are logged, not returned
    async fn run_tests(&self, name: &str, dir: &Path) {
        let Some((program, args)) = self.config.test_command.split_first() else {
            return;
        };
        let invocation = Invocation::argv(program.clone(), args.iter().cloned());

        info!("Starting tests for {}...", name);
        match process::execute(&invocation, dir, "", self.config.command_timeout()).await {
            Ok(output) => {
                for line in output.stdout.lines() {
                    info!("{}", line);
                }
                if !output.status.success() {
                    warn!("{} exited with {} in {}", invocation, output.status, name);
                }
            }
            Err(e) => warn!("Test command failed for {}: {}", name, e),
        }
    }

    async fn read_result(&self, name: &str, dir: &Path) -> Result<Option<String>> {
        let path = dir.join(submission_runner::layout::TESTS_DIR).join(&self.config.result_file);
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{} test result file not found!", name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
