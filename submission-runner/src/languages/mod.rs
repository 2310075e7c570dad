//! Runner variants for each submission kind

mod dotnet;
mod native;
mod python;

pub use dotnet::{numbers_format, DotNetRunner, NumbersFormat};
pub use native::{NativeDialect, NativeRunner};
pub use python::PythonRunner;

use async_trait::async_trait;
use source_screen::ImportAnalyzer;
use std::path::Path;

use crate::{
    config::RunnerConfig,
    layout::ProjectLayout,
    process::Invocation,
    toolchain::{self, BuildReport},
    types::Language,
    Result,
};

/// Trait for language-specific submission runners
#[async_trait]
pub trait LanguageRunner: Send + Sync {
    fn language(&self) -> Language;

    /// Extension of the entry file looked up in `src/`
    fn entry_extension(&self) -> &str {
        self.language().entry_extension()
    }

    /// External tools that must be on PATH
    fn required_tools(&self) -> Vec<&str>;

    /// Build the project before running it. `None` when nothing is built.
    async fn build(&self, layout: &ProjectLayout) -> Result<Option<BuildReport>>;

    /// Invocation strategies for running `entry` from `src/`, primary first
    async fn invocations(
        &self,
        layout: &ProjectLayout,
        entry: &Path,
        args: &[String],
    ) -> Result<Vec<Invocation>>;

    /// Analyzer used to screen the entry file's imports, if the language has one
    fn import_analyzer(&self) -> Option<&dyn ImportAnalyzer> {
        None
    }

    /// Fail with `MissingTools` unless every required tool is on PATH
    fn check_tools(&self) -> Result<()> {
        toolchain::check_tools(&self.required_tools())
    }
}

/// Create the runner for `language` from shared settings
pub fn create_runner(language: Language, config: &RunnerConfig) -> Box<dyn LanguageRunner> {
    let build_timeout = config.build_timeout();
    match language {
        Language::Python => Box::new(PythonRunner::new(config.python_interpreter.clone())),
        Language::DotNet => Box::new(
            DotNetRunner::new(config.dotnet_framework.clone())
                .with_build(config.dotnet_build)
                .with_build_timeout(build_timeout),
        ),
        Language::C => Box::new(
            NativeRunner::new(
                NativeDialect::C,
                config.c_compiler.clone(),
                config.native_flags.clone(),
            )
            .with_harness(config.native_harness)
            .with_build_timeout(build_timeout),
        ),
        Language::Cpp => Box::new(
            NativeRunner::new(
                NativeDialect::Cpp,
                config.cpp_compiler.clone(),
                config.native_flags.clone(),
            )
            .with_harness(config.native_harness)
            .with_build_timeout(build_timeout),
        ),
    }
}

/// Path of a built executable, with `.exe` on Windows
pub(crate) fn executable_path(path: &Path) -> std::path::PathBuf {
    if cfg!(windows) {
        path.with_extension("exe")
    } else {
        path.to_path_buf()
    }
}

/// Entry file name relative to `src/`
pub(crate) fn entry_name(entry: &Path) -> String {
    entry
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| entry.display().to_string())
}
