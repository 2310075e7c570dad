mod languages;
mod utils;

use async_trait::async_trait;
use std::{path::Path, sync::Arc, time::Duration};

use crate::{
    background::spawn_run,
    config::RunnerConfig,
    error::Error,
    executor::SubmissionExecutor,
    languages::LanguageRunner,
    layout::ProjectLayout,
    process::Invocation,
    toolchain::BuildReport,
    types::{Language, RunRequest},
    Result,
};
use fixtures::{python_project, submissions};
use utils::{default_timeout, init_tracing, python_executor, skip_without_python};

/// Runner whose build step panics
struct CrashingBuild;

#[async_trait]
impl LanguageRunner for CrashingBuild {
    fn language(&self) -> Language {
        Language::C
    }

    fn required_tools(&self) -> Vec<&str> {
        Vec::new()
    }

    async fn build(&self, _layout: &ProjectLayout) -> Result<Option<BuildReport>> {
        panic!("build tool crashed")
    }

    async fn invocations(
        &self,
        _layout: &ProjectLayout,
        _entry: &Path,
        _args: &[String],
    ) -> Result<Vec<Invocation>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_background_run_joins_with_output() -> Result<()> {
    if skip_without_python() {
        return Ok(());
    }
    let project = python_project("my_code.py", submissions::HELLO);
    let executor = python_executor(project.path());

    let run = spawn_run(executor, RunRequest::new(default_timeout()));
    let outcome = run.join().await?;
    assert_eq!(outcome.stdout, "hello\n");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_background_runs() -> Result<()> {
    if skip_without_python() {
        return Ok(());
    }
    let first = python_project("my_code.py", submissions::HELLO);
    let second = python_project("my_code.py", submissions::ECHO_INPUT);

    let runs = vec![
        spawn_run(
            python_executor(first.path()),
            RunRequest::new(default_timeout()),
        ),
        spawn_run(
            python_executor(second.path()),
            RunRequest::new(default_timeout()).with_input("again\n"),
        ),
    ];

    let mut outputs = Vec::new();
    for run in runs {
        outputs.push(run.join().await?.stdout);
    }
    assert_eq!(outputs, ["hello\n", "Hello, again!\n"]);
    Ok(())
}

#[tokio::test]
async fn test_aborted_background_run() {
    let project = python_project("my_code.py", submissions::SLOW);
    let executor = python_executor(project.path());

    let run = spawn_run(executor, RunRequest::new(default_timeout()));
    run.abort();
    let err = run.join().await.unwrap_err();
    assert!(matches!(err, Error::Background(_)));
}

#[tokio::test]
async fn test_panicked_background_run() {
    init_tracing();
    let project = python_project("main.c", "int main(void) { return 0; }\n");
    let executor = Arc::new(SubmissionExecutor::new(
        ProjectLayout::new(project.path()),
        Box::new(CrashingBuild),
        RunnerConfig::default(),
    ));

    let err = spawn_run(executor, RunRequest::new(default_timeout()))
        .join()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Background(_)));
}

#[tokio::test]
async fn test_background_run_reports_finished() {
    let project = python_project("notes.txt", "no entry");
    let executor = python_executor(project.path());

    let run = spawn_run(executor, RunRequest::new(default_timeout()));
    tokio::time::timeout(Duration::from_secs(5), async {
        while !run.is_finished() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    let err = run.join().await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
