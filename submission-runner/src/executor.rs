use source_screen::{decode::decode, LibraryList, Screen, ScreenReport};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{
    config::RunnerConfig,
    languages::{create_runner, LanguageRunner, PythonRunner},
    layout::{ProjectLayout, SCRATCH_FILE, TESTS_DIR},
    process, toolchain,
    types::{Language, RunOutcome, RunRequest},
    Result,
};

/// Runs one assignment project's submission with a language runner
pub struct SubmissionExecutor {
    layout: ProjectLayout,
    runner: Box<dyn LanguageRunner>,
    config: RunnerConfig,
}

impl SubmissionExecutor {
    pub fn new(layout: ProjectLayout, runner: Box<dyn LanguageRunner>, config: RunnerConfig) -> Self {
        Self {
            layout,
            runner,
            config,
        }
    }

    /// Executor using the default runner for `language`
    pub fn for_language(layout: ProjectLayout, language: Language, config: RunnerConfig) -> Self {
        let runner = create_runner(language, &config);
        Self::new(layout, runner, config)
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn runner(&self) -> &dyn LanguageRunner {
        self.runner.as_ref()
    }

    /// A request with the configured default timeout
    pub fn request(&self) -> RunRequest {
        RunRequest::new(self.config.timeout())
    }

    /// Screen, build and run the submission's entry file.
    ///
    /// A denied import fails before anything is spawned, as does a tool
    /// missing from PATH. A failed build is logged and the run goes ahead.
    /// A timeout is returned as a `TimedOut` outcome with empty output.
    pub async fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        let entry = self.layout.find_entry(self.runner.entry_extension()).await?;
        self.screen_entry(&entry, &request.denied_libraries).await?;
        self.runner.check_tools()?;

        if let Some(report) = self.runner.build(&self.layout).await? {
            if let Err(e) = report.ensure_success() {
                warn!("Running {} after a failed build: {}", self.layout.name(), e);
            }
        }

        let invocations = self
            .runner
            .invocations(&self.layout, &entry, &request.args)
            .await?;
        self.execute(&invocations, request).await
    }

    /// Run `code` as a Python script from `tests/my_test_code.py`.
    ///
    /// The submission is screened first. The scratch file is removed
    /// afterwards whatever the outcome.
    pub async fn run_snippet(&self, code: &str, request: &RunRequest) -> Result<RunOutcome> {
        let entry = self.layout.find_entry(self.runner.entry_extension()).await?;
        self.screen_entry(&entry, &request.denied_libraries).await?;
        toolchain::check_tools(&[self.config.python_interpreter.as_str()])?;

        let scratch = ScratchFile::create(self.layout.scratch_file(), code).await?;
        let script = Path::new("..").join(TESTS_DIR).join(SCRATCH_FILE);
        let invocations = PythonRunner::new(self.config.python_interpreter.clone())
            .script_invocations(&script.to_string_lossy(), &request.args);

        let outcome = self.execute(&invocations, request).await;
        scratch.remove().await;
        outcome
    }

    /// Append `code` to the decoded submission source and run it as a snippet
    pub async fn run_with_submission(&self, code: &str, request: &RunRequest) -> Result<RunOutcome> {
        let mut source = self.load_submission().await?;
        source.push_str(code);
        self.run_snippet(&source, request).await
    }

    /// Decoded text of the submission's entry file
    pub async fn load_submission(&self) -> Result<String> {
        let entry = self.layout.find_entry(self.runner.entry_extension()).await?;
        self.read_source(&entry).await
    }

    /// Screen the entry file's imports; `None` when the runner has no analyzer
    pub async fn screen_entry(
        &self,
        entry: &Path,
        denied: &[String],
    ) -> Result<Option<ScreenReport>> {
        let Some(analyzer) = self.runner.import_analyzer() else {
            return Ok(None);
        };

        let source = self.read_source(entry).await?;
        let screen = Screen::new(
            self.config.allow_list().await?,
            LibraryList::new(denied.iter().cloned()),
        );
        let report = screen.screen(&analyzer.collect_imports(&source))?;

        let unlisted: Vec<String> = report
            .unlisted
            .iter()
            .filter_map(|line| analyzer.module_of(line))
            .collect();
        debug!(
            "Screened {}: {} imports, unlisted modules {:?}",
            entry.display(),
            report.imports.len(),
            unlisted
        );
        Ok(Some(report))
    }

    async fn read_source(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| source_screen::Error::from_read(path, e))?;
        let (text, encoding) = decode(&bytes, &self.config.encodings)
            .ok_or_else(|| source_screen::Error::Decode(path.to_path_buf()))?;
        debug!("Decoded {} as {:?}", path.display(), encoding);
        Ok(text)
    }

    async fn execute(
        &self,
        invocations: &[process::Invocation],
        request: &RunRequest,
    ) -> Result<RunOutcome> {
        let outcome = process::execute_strategies(
            invocations,
            &self.layout.src_dir(),
            &request.input,
            request.timeout,
        )
        .await?;

        info!(
            "Run of {} finished with {:?}",
            self.layout.name(),
            outcome.status
        );
        Ok(outcome)
    }
}

/// Snippet file, removed by `remove` or else when dropped
struct ScratchFile {
    path: Option<PathBuf>,
}

impl ScratchFile {
    async fn create(path: PathBuf, code: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, code).await?;
        debug!("Wrote snippet to {}", path.display());
        Ok(Self { path: Some(path) })
    }

    async fn remove(mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = fs::remove_file(&path).await {
                debug!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

// Covers a snippet run whose future is dropped mid-flight
impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                debug!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn scratch_file_is_removed() {
        let temp = assert_fs::TempDir::new().unwrap();
        let path = temp.path().join("my_test_code.py");
        let scratch = ScratchFile::create(path.clone(), "print(1)").await.unwrap();
        temp.child("my_test_code.py").assert("print(1)");
        scratch.remove().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn scratch_file_is_removed_on_drop() {
        let temp = assert_fs::TempDir::new().unwrap();
        let path = temp.path().join("tests/my_test_code.py");
        {
            let _scratch = ScratchFile::create(path.clone(), "print(1)").await.unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn load_submission_decodes_entry() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/my_code.py")
            .write_binary(b"print('caf\xe9')\n")
            .unwrap();

        let executor = SubmissionExecutor::for_language(
            ProjectLayout::new(temp.path()),
            Language::Python,
            RunnerConfig::default(),
        );
        assert_eq!(executor.load_submission().await.unwrap(), "print('café')\n");
    }

    #[tokio::test]
    async fn runners_without_analyzer_skip_screening() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/main.c").write_str("#include <stdio.h>\n").unwrap();

        let executor = SubmissionExecutor::for_language(
            ProjectLayout::new(temp.path()),
            Language::C,
            RunnerConfig::default(),
        );
        let report = executor
            .screen_entry(&temp.path().join("src/main.c"), &["stdio".to_string()])
            .await
            .unwrap();
        assert!(report.is_none());
    }
}
