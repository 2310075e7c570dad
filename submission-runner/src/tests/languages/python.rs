use crate::{
    config::RunnerConfig,
    error::Error,
    executor::SubmissionExecutor,
    layout::ProjectLayout,
    tests::{
        fixtures::{python_project, submissions::*},
        utils::{default_timeout, python_executor, short_timeout, skip_without_python},
    },
    types::{Language, RunRequest, RunStatus},
};

#[tokio::test]
async fn test_python_hello() -> Result<(), Error> {
    if skip_without_python() {
        return Ok(());
    }
    let project = python_project("my_code.py", HELLO);
    let executor = python_executor(project.path());

    let outcome = executor.run(&RunRequest::new(default_timeout())).await?;
    assert_eq!(outcome.stdout, "hello\n");
    assert_eq!(outcome.status, RunStatus::Completed { code: Some(0) });
    assert!(!outcome.used_fallback());
    Ok(())
}

#[tokio::test]
async fn test_python_input_and_args() -> Result<(), Error> {
    if skip_without_python() {
        return Ok(());
    }
    let project = python_project("my_code.py", ECHO_INPUT);
    let executor = python_executor(project.path());

    let request = RunRequest::new(default_timeout()).with_input("test user\n");
    let outcome = executor.run(&request).await?;
    assert_eq!(outcome.stdout, "Hello, test user!\n");

    let project = python_project("my_code.py", PRINT_ARGS);
    let executor = python_executor(project.path());
    let request = RunRequest::new(default_timeout()).with_args(["3", "four"]);
    let outcome = executor.run(&request).await?;
    assert_eq!(outcome.stdout, "3 four\n");
    Ok(())
}

#[tokio::test]
async fn test_python_timeout_gives_empty_output() -> Result<(), Error> {
    if skip_without_python() {
        return Ok(());
    }
    let project = python_project("my_code.py", SLOW);
    let executor = python_executor(project.path());

    let outcome = executor.run(&RunRequest::new(short_timeout())).await?;
    assert!(outcome.is_timeout());
    assert!(outcome.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unlisted_import_still_runs() -> Result<(), Error> {
    if skip_without_python() {
        return Ok(());
    }
    let project = python_project("my_code.py", UNLISTED_IMPORT);
    let executor = python_executor(project.path());

    let entry = project.path().join("src/my_code.py");
    let report = executor.screen_entry(&entry, &[]).await?.unwrap();
    assert_eq!(report.unlisted, ["import os"]);

    let outcome = executor.run(&RunRequest::new(default_timeout())).await?;
    assert!(outcome.success());
    assert!(!outcome.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_denied_import_aborts_before_spawn() {
    let project = python_project("my_code.py", DENIED_IMPORT);
    let executor = python_executor(project.path());

    let request = RunRequest::new(default_timeout()).with_denied_libraries(["numpy"]);
    let err = executor.run(&request).await.unwrap_err();
    assert!(err.to_string().contains("numpy"));
    assert!(matches!(
        err,
        Error::Screen(source_screen::Error::DeniedLibraries(_))
    ));

    let err = executor.run_snippet("print(1)\n", &request).await.unwrap_err();
    assert!(matches!(err, Error::Screen(_)));
    assert!(!executor.layout().scratch_file().exists());
}

#[tokio::test]
async fn test_missing_interpreter_is_reported() {
    let project = python_project("my_code.py", HELLO);
    let executor = SubmissionExecutor::for_language(
        ProjectLayout::new(project.path()),
        Language::Python,
        RunnerConfig::default().with_python_interpreter("no-such-python"),
    );

    let request = RunRequest::new(default_timeout());
    let err = executor.run(&request).await.unwrap_err();
    assert!(matches!(err, Error::MissingTools(_)));
    assert!(err.to_string().contains("no-such-python"));

    let err = executor.run_snippet("print(1)\n", &request).await.unwrap_err();
    assert!(matches!(err, Error::MissingTools(_)));
    assert!(!executor.layout().scratch_file().exists());
}

#[tokio::test]
async fn test_missing_entry_is_not_found() {
    let project = python_project("notes.txt", "not code");
    let executor = python_executor(project.path());

    let err = executor
        .run(&RunRequest::new(default_timeout()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_snippet_runs_from_scratch_file() -> Result<(), Error> {
    if skip_without_python() {
        return Ok(());
    }
    let project = python_project("my_code.py", HELLO);
    let executor = python_executor(project.path());

    let outcome = executor
        .run_snippet("print('snippet')\n", &RunRequest::new(default_timeout()))
        .await?;
    assert_eq!(outcome.stdout, "snippet\n");
    assert!(!executor.layout().scratch_file().exists());
    Ok(())
}

#[tokio::test]
async fn test_snippet_scratch_removed_after_timeout() -> Result<(), Error> {
    if skip_without_python() {
        return Ok(());
    }
    let project = python_project("my_code.py", HELLO);
    let executor = python_executor(project.path());

    let outcome = executor
        .run_snippet(SLOW, &RunRequest::new(short_timeout()))
        .await?;
    assert!(outcome.is_timeout());
    assert!(!executor.layout().scratch_file().exists());
    Ok(())
}

#[tokio::test]
async fn test_snippet_with_submission() -> Result<(), Error> {
    if skip_without_python() {
        return Ok(());
    }
    let project = python_project("my_code.py", ADD_FUNCTION);
    let executor = python_executor(project.path());

    let outcome = executor
        .run_with_submission("print(add(2, 3))\n", &RunRequest::new(default_timeout()))
        .await?;
    assert_eq!(outcome.stdout, "5\n");
    Ok(())
}
