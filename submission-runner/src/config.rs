use serde::{Deserialize, Serialize};
use source_screen::{LibraryList, TextEncoding, DEFAULT_ENCODINGS};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{error::Error, toolchain::DEFAULT_BUILD_TIMEOUT_SECS, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[cfg(windows)]
const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
const DEFAULT_PYTHON: &str = "python3";

/// Settings shared by every runner variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Default child-process timeout in seconds
    pub timeout_secs: u64,
    /// Budget in seconds for each build attempt
    pub build_timeout_secs: u64,
    /// Interpreter used for Python submissions and snippets
    pub python_interpreter: String,
    /// Target framework folder under `bin/Debug/`
    pub dotnet_framework: String,
    /// Rebuild .NET projects before running them
    pub dotnet_build: bool,
    pub c_compiler: String,
    pub cpp_compiler: String,
    /// Extra flags appended to native compiler invocations
    pub native_flags: Vec<String>,
    /// Link `tests/testmain.<ext>` into native builds
    pub native_harness: bool,
    /// Allow-list file; the bundled list is used when absent
    pub allowed_libraries: Option<PathBuf>,
    /// Warn about imports missing from the allow-list
    pub screen_allowed: bool,
    /// Encodings tried, in order, when loading submission sources
    pub encodings: Vec<TextEncoding>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            build_timeout_secs: DEFAULT_BUILD_TIMEOUT_SECS,
            python_interpreter: DEFAULT_PYTHON.to_string(),
            dotnet_framework: "net6.0".to_string(),
            dotnet_build: true,
            c_compiler: "gcc".to_string(),
            cpp_compiler: "g++".to_string(),
            native_flags: vec!["-lm".to_string()],
            native_harness: false,
            allowed_libraries: None,
            screen_allowed: true,
            encodings: DEFAULT_ENCODINGS.to_vec(),
        }
    }
}

impl RunnerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        if self.build_timeout_secs == 0 {
            return Err(Error::Config("build_timeout_secs must be positive".to_string()));
        }
        if self.encodings.is_empty() {
            return Err(Error::Config("encodings must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    /// The allow-list to screen against, or `None` when allow screening is off
    pub async fn allow_list(&self) -> Result<Option<LibraryList>> {
        if !self.screen_allowed {
            return Ok(None);
        }
        match &self.allowed_libraries {
            Some(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| source_screen::Error::from_read(path, e))?;
                Ok(Some(LibraryList::parse(&text)))
            }
            None => Ok(Some(LibraryList::bundled())),
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_build_timeout_secs(mut self, secs: u64) -> Self {
        self.build_timeout_secs = secs;
        self
    }

    pub fn with_python_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.python_interpreter = interpreter.into();
        self
    }

    pub fn with_allowed_libraries(mut self, path: impl Into<PathBuf>) -> Self {
        self.allowed_libraries = Some(path.into());
        self
    }

    pub fn with_screen_allowed(mut self, flag: bool) -> Self {
        self.screen_allowed = flag;
        self
    }

    pub fn with_dotnet_build(mut self, flag: bool) -> Self {
        self.dotnet_build = flag;
        self
    }
}
