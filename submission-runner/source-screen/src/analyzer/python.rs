use regex::Regex;
use std::sync::OnceLock;

use super::ImportAnalyzer;

/// Top-level `import x` / `from x import y` statements. Indented imports
/// inside functions are not screened.
fn import_re() -> &'static Regex {
    static IMPORT_RE: OnceLock<Regex> = OnceLock::new();
    IMPORT_RE.get_or_init(|| {
        Regex::new(r"^(?:from\s+([A-Za-z0-9_.]+)\s+import\b|import\s+([A-Za-z0-9_.]+))")
            .expect("import pattern is valid")
    })
}

#[derive(Debug, Default, Clone)]
pub struct PythonAnalyzer;

impl ImportAnalyzer for PythonAnalyzer {
    fn language(&self) -> &'static str {
        "python"
    }

    fn is_import_line(&self, line: &str) -> bool {
        import_re().is_match(line)
    }

    fn module_of(&self, line: &str) -> Option<String> {
        let cap = import_re().captures(line.trim_start())?;
        let module = cap.get(1).or_else(|| cap.get(2))?.as_str();
        module.split('.').next().map(str::to_string)
    }
}
