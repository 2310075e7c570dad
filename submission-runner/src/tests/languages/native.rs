#![cfg(unix)]

use crate::{
    config::RunnerConfig,
    error::Error,
    executor::SubmissionExecutor,
    languages::{LanguageRunner, NativeDialect, NativeRunner},
    layout::ProjectLayout,
    tests::utils::{default_timeout, init_tracing},
    types::RunRequest,
};
use assert_fs::{prelude::*, TempDir};

/// Compiled by `sh`: writes a runnable `build/main`, then reports failure
const BROKEN_BUILD: &str = "printf '#!/bin/sh\\necho ran anyway\\n' > build/main\n\
chmod +x build/main\n\
exit 1\n";

#[tokio::test]
async fn test_failed_build_still_runs_binary() -> Result<(), Error> {
    init_tracing();
    let project = TempDir::new().unwrap();
    project.child("src/main.c").write_str(BROKEN_BUILD).unwrap();

    let layout = ProjectLayout::new(project.path());
    let runner = NativeRunner::new(NativeDialect::C, "sh", Vec::new());
    let report = runner.build(&layout).await?.unwrap();
    assert!(report.retried());
    assert!(!report.succeeded());

    let executor = SubmissionExecutor::new(layout, Box::new(runner), RunnerConfig::default());
    let outcome = executor.run(&RunRequest::new(default_timeout())).await?;
    assert!(outcome.success());
    assert_eq!(outcome.stdout, "ran anyway\n");
    Ok(())
}
