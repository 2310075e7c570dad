use async_trait::async_trait;
use source_screen::{ImportAnalyzer, PythonAnalyzer};
use std::path::Path;

use crate::{
    languages::{entry_name, LanguageRunner},
    layout::ProjectLayout,
    process::Invocation,
    toolchain::BuildReport,
    types::Language,
    Result,
};

pub struct PythonRunner {
    interpreter: String,
    analyzer: PythonAnalyzer,
}

impl PythonRunner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            analyzer: PythonAnalyzer,
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// `interpreter script args...` with its shell-line fallback
    pub fn script_invocations(&self, script: &str, args: &[String]) -> Vec<Invocation> {
        Invocation::argv(
            self.interpreter.clone(),
            std::iter::once(script.to_string()).chain(args.iter().cloned()),
        )
        .with_shell_fallback()
    }
}

#[async_trait]
impl LanguageRunner for PythonRunner {
    fn language(&self) -> Language {
        Language::Python
    }

    fn required_tools(&self) -> Vec<&str> {
        vec![self.interpreter.as_str()]
    }

    async fn build(&self, _layout: &ProjectLayout) -> Result<Option<BuildReport>> {
        Ok(None)
    }

    async fn invocations(
        &self,
        _layout: &ProjectLayout,
        entry: &Path,
        args: &[String],
    ) -> Result<Vec<Invocation>> {
        Ok(self.script_invocations(&entry_name(entry), args))
    }

    fn import_analyzer(&self) -> Option<&dyn ImportAnalyzer> {
        Some(&self.analyzer)
    }
}
