use std::{sync::Arc, time::Duration};

use crate::{
    config::RunnerConfig, executor::SubmissionExecutor, layout::ProjectLayout, toolchain,
    types::Language,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

pub fn short_timeout() -> Duration {
    Duration::from_millis(500)
}

/// True (and logs why) when the Python interpreter is not on PATH
pub fn skip_without_python() -> bool {
    let config = RunnerConfig::default();
    toolchain::skip_if_not_available(&[config.python_interpreter.as_str()])
}

pub fn python_executor(root: &std::path::Path) -> Arc<SubmissionExecutor> {
    init_tracing();
    Arc::new(SubmissionExecutor::for_language(
        ProjectLayout::new(root),
        Language::Python,
        RunnerConfig::default(),
    ))
}
