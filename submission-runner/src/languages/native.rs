use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

use crate::{
    languages::{executable_path, LanguageRunner},
    layout::ProjectLayout,
    process::Invocation,
    toolchain::{self, BuildReport, BuildStep, DEFAULT_BUILD_TIMEOUT_SECS},
    types::Language,
    Result,
};

const BUILD_DIR: &str = "build";
const BINARY_NAME: &str = "main";
const HARNESS_STEM: &str = "testmain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeDialect {
    C,
    Cpp,
}

impl NativeDialect {
    pub fn extension(&self) -> &'static str {
        match self {
            NativeDialect::C => "c",
            NativeDialect::Cpp => "cpp",
        }
    }
}

/// Compiles the entry file with gcc/g++ into `build/main` and runs the binary
pub struct NativeRunner {
    dialect: NativeDialect,
    compiler: String,
    flags: Vec<String>,
    harness: bool,
    build_timeout: Duration,
}

impl NativeRunner {
    pub fn new(dialect: NativeDialect, compiler: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            dialect,
            compiler: compiler.into(),
            flags,
            harness: false,
            build_timeout: Duration::from_secs(DEFAULT_BUILD_TIMEOUT_SECS),
        }
    }

    /// Link `tests/testmain.<ext>` into the binary for function-level tests
    pub fn with_harness(mut self, flag: bool) -> Self {
        self.harness = flag;
        self
    }

    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = timeout;
        self
    }

    pub fn binary_path(&self, layout: &ProjectLayout) -> PathBuf {
        executable_path(&layout.root().join(BUILD_DIR).join(BINARY_NAME))
    }

    fn harness_path(&self, layout: &ProjectLayout) -> PathBuf {
        layout
            .tests_dir()
            .join(format!("{}.{}", HARNESS_STEM, self.dialect.extension()))
    }

    /// Compiler invocation, run from the project root
    pub fn compile_invocation(&self, layout: &ProjectLayout, entry: &Path) -> Invocation {
        let relative = |path: &Path| {
            path.strip_prefix(layout.root())
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned()
        };

        let mut args = vec![relative(entry)];
        if self.harness {
            args.push(relative(&self.harness_path(layout)));
        }
        args.push("-o".to_string());
        args.push(relative(&self.binary_path(layout)));
        args.extend(self.flags.iter().cloned());

        Invocation::argv(self.compiler.clone(), args)
    }
}

#[async_trait]
impl LanguageRunner for NativeRunner {
    fn language(&self) -> Language {
        match self.dialect {
            NativeDialect::C => Language::C,
            NativeDialect::Cpp => Language::Cpp,
        }
    }

    fn required_tools(&self) -> Vec<&str> {
        vec![self.compiler.as_str()]
    }

    async fn build(&self, layout: &ProjectLayout) -> Result<Option<BuildReport>> {
        toolchain::remove_artifacts(layout.root(), &[BUILD_DIR]).await?;
        tokio::fs::create_dir_all(layout.root().join(BUILD_DIR)).await?;

        let entry = layout.find_entry(self.dialect.extension()).await?;
        let step = BuildStep::new(self.compile_invocation(layout, &entry), layout.root())
            .with_timeout(self.build_timeout);
        let report = toolchain::build_with_retry(&step).await;
        info!(
            "{} build of {} finished (succeeded: {})",
            self.compiler,
            layout.name(),
            report.succeeded()
        );
        Ok(Some(report))
    }

    async fn invocations(
        &self,
        layout: &ProjectLayout,
        _entry: &Path,
        args: &[String],
    ) -> Result<Vec<Invocation>> {
        let binary = self.binary_path(layout);
        Ok(Invocation::argv(binary.to_string_lossy().into_owned(), args.iter().cloned())
            .with_shell_fallback())
    }
}
