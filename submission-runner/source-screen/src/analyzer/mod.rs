pub mod python;

pub use python::PythonAnalyzer;

pub trait ImportAnalyzer: Send + Sync {
    /// Returns the name of the language this analyzer is for
    fn language(&self) -> &'static str;

    /// Returns true if the given line declares an import
    fn is_import_line(&self, line: &str) -> bool;

    /// Extracts the base module name from an import line
    fn module_of(&self, line: &str) -> Option<String>;

    /// Collects the import lines of a source file, trimmed, in file order
    fn collect_imports(&self, source_code: &str) -> Vec<String> {
        source_code
            .lines()
            .filter(|line| self.is_import_line(line))
            .map(|line| line.trim().to_string())
            .collect()
    }
}
