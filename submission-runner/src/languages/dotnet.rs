use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::Error,
    languages::{executable_path, LanguageRunner},
    layout::ProjectLayout,
    process::Invocation,
    toolchain::{self, BuildReport, BuildStep, DEFAULT_BUILD_TIMEOUT_SECS},
    types::Language,
    Result,
};

const ARTIFACT_DIRS: [&str; 2] = ["bin", "obj"];
const HIDDEN_HARNESS: &str = "testmain.cs.hidden";
const HARNESS: &str = "testmain.cs";

/// Builds the project with `dotnet build` and runs the produced binary
pub struct DotNetRunner {
    framework: String,
    build: bool,
    build_timeout: Duration,
}

impl DotNetRunner {
    pub fn new(framework: impl Into<String>) -> Self {
        Self {
            framework: framework.into(),
            build: true,
            build_timeout: Duration::from_secs(DEFAULT_BUILD_TIMEOUT_SECS),
        }
    }

    pub fn with_build(mut self, flag: bool) -> Self {
        self.build = flag;
        self
    }

    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = timeout;
        self
    }

    /// Stem of the first `*.csproj` in the project root
    pub async fn project_name(&self, layout: &ProjectLayout) -> Result<String> {
        let project = layout.find_project_file("csproj").await?;
        project
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| Error::NotFound(format!("Invalid project file {}", project.display())))
    }

    pub async fn binary_path(&self, layout: &ProjectLayout) -> Result<PathBuf> {
        let name = self.project_name(layout).await?;
        Ok(executable_path(
            &layout
                .root()
                .join("bin")
                .join("Debug")
                .join(&self.framework)
                .join(name),
        ))
    }

    async fn build_project(&self, layout: &ProjectLayout) -> Result<BuildReport> {
        let step = BuildStep::new(Invocation::argv("dotnet", ["build"]), layout.root())
            .with_timeout(self.build_timeout);
        Ok(toolchain::build_with_retry(&step).await)
    }
}

/// Negative sign and decimal point of the host locale, used to build the
/// number text .NET programs are expected to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumbersFormat {
    pub negative_sign: String,
    pub decimal_point: String,
}

impl Default for NumbersFormat {
    fn default() -> Self {
        Self {
            negative_sign: "-".to_string(),
            decimal_point: ".".to_string(),
        }
    }
}

impl NumbersFormat {
    /// Empty parts are replaced with the defaults
    pub fn from_parts(negative_sign: &str, decimal_point: &str) -> Self {
        let default = Self::default();
        let or_default = |part: &str, fallback: String| {
            if part.is_empty() {
                fallback
            } else {
                part.to_string()
            }
        };
        Self {
            negative_sign: or_default(negative_sign, default.negative_sign),
            decimal_point: or_default(decimal_point, default.decimal_point),
        }
    }
}

/// Number format of the system locale taken from the environment
pub fn numbers_format() -> NumbersFormat {
    #[cfg(unix)]
    {
        locale::numbers_format()
    }
    #[cfg(not(unix))]
    {
        NumbersFormat::default()
    }
}

#[cfg(unix)]
mod locale {
    use nix::libc;
    use std::{ffi::CStr, sync::Mutex};
    use tracing::debug;

    use super::NumbersFormat;

    static LOCALE_LOCK: Mutex<()> = Mutex::new(());

    pub(super) fn numbers_format() -> NumbersFormat {
        let _lock = LOCALE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        // SAFETY: locale calls are serialized by LOCALE_LOCK and the lconv
        // strings are copied before LC_NUMERIC is reset.
        unsafe {
            if libc::setlocale(libc::LC_NUMERIC, c"".as_ptr()).is_null() {
                debug!("System locale unavailable, using default number format");
                return NumbersFormat::default();
            }

            let conv = libc::localeconv();
            let format = if conv.is_null() {
                NumbersFormat::default()
            } else {
                NumbersFormat::from_parts(
                    &c_text((*conv).negative_sign),
                    &c_text((*conv).decimal_point),
                )
            };

            libc::setlocale(libc::LC_NUMERIC, c"C".as_ptr());
            format
        }
    }

    unsafe fn c_text(ptr: *const libc::c_char) -> String {
        if ptr.is_null() {
            String::new()
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }
}

/// Copies the hidden test harness into place for the build and removes it afterwards
struct HarnessGuard {
    path: Option<PathBuf>,
}

impl HarnessGuard {
    async fn install(tests_dir: &Path) -> Result<Self> {
        let hidden = tests_dir.join(HIDDEN_HARNESS);
        if !fs::try_exists(&hidden).await? {
            return Ok(Self { path: None });
        }

        let target = tests_dir.join(HARNESS);
        fs::copy(&hidden, &target).await?;
        debug!("Installed test harness {}", target.display());
        Ok(Self { path: Some(target) })
    }

    async fn remove(mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = fs::remove_file(&path).await {
                debug!("Failed to remove test harness {}: {}", path.display(), e);
            }
        }
    }
}

// Fallback for when the build future is dropped before `remove` runs
impl Drop for HarnessGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                debug!("Failed to remove test harness {}: {}", path.display(), e);
            }
        }
    }
}

#[async_trait]
impl LanguageRunner for DotNetRunner {
    fn language(&self) -> Language {
        Language::DotNet
    }

    fn required_tools(&self) -> Vec<&str> {
        vec!["dotnet"]
    }

    async fn build(&self, layout: &ProjectLayout) -> Result<Option<BuildReport>> {
        if !self.build {
            return Ok(None);
        }

        toolchain::remove_artifacts(layout.root(), &ARTIFACT_DIRS).await?;

        let harness = HarnessGuard::install(&layout.tests_dir()).await?;
        let report = self.build_project(layout).await;
        harness.remove().await;
        let report = report?;
        info!(
            "dotnet build of {} finished (succeeded: {})",
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
        let binary = self.binary_path(layout).await?;
        Ok(Invocation::argv(binary.to_string_lossy().into_owned(), args.iter().cloned())
            .with_shell_fallback())
    }
}
