use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    types::{LibraryList, ScreenReport},
};

/// Allow/deny screening applied to a submission's import lines.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    allowed: Option<LibraryList>,
    denied: LibraryList,
}

impl Screen {
    pub fn new(allowed: Option<LibraryList>, denied: LibraryList) -> Self {
        Self { allowed, denied }
    }

    pub fn with_allowed(mut self, allowed: LibraryList) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub fn with_denied(mut self, denied: LibraryList) -> Self {
        self.denied = denied;
        self
    }

    /// Imports missing from the allow-list are reported, imports hitting the
    /// deny-list fail the screen.
    pub fn screen(&self, imports: &[String]) -> Result<ScreenReport> {
        debug!("Screening imports: {:?}", imports);

        let unlisted: Vec<String> = match &self.allowed {
            Some(allowed) => imports
                .iter()
                .filter(|line| !allowed.matches(line))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        if !unlisted.is_empty() {
            warn!("{}", "*".repeat(40));
            warn!("WARNING!! These libraries is not installed in the checking machine:");
            warn!("{:?}", unlisted);
            warn!("{}", "*".repeat(40));
        }

        let denied: Vec<String> = imports
            .iter()
            .filter(|line| self.denied.matches(line))
            .cloned()
            .collect();

        if !denied.is_empty() {
            return Err(Error::DeniedLibraries(denied));
        }

        Ok(ScreenReport {
            imports: imports.to_vec(),
            unlisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imports() -> Vec<String> {
        vec![
            "import os".to_string(),
            "from sklearn.decomposition import PCA".to_string(),
        ]
    }

    #[test]
    fn unlisted_imports_are_reported() {
        let screen = Screen::default().with_allowed(LibraryList::new(["os"]));
        let report = screen.screen(&imports()).unwrap();
        assert_eq!(report.unlisted, ["from sklearn.decomposition import PCA"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn no_allow_list_means_no_warnings() {
        let report = Screen::default().screen(&imports()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.imports.len(), 2);
    }

    #[test]
    fn denied_import_fails() {
        let screen = Screen::default().with_denied(LibraryList::new(["sklearn"]));
        let err = screen.screen(&imports()).unwrap_err();
        match err {
            Error::DeniedLibraries(lines) => {
                assert_eq!(lines, ["from sklearn.decomposition import PCA"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn denied_message_lists_offending_lines() {
        let err = Error::DeniedLibraries(vec!["import os".to_string()]);
        assert_eq!(
            err.to_string(),
            "You are not allowed to use the following libraries on this task: [\"import os\"]"
        );
    }
}
