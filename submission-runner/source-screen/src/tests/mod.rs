use assert_fs::prelude::*;
use predicates::prelude::*;

use crate::{
    screen_file, Error, LibraryList, PythonAnalyzer, Screen, TextEncoding, DEFAULT_ENCODINGS,
};

const SUBMISSION: &str = r#"import math
from sklearn.decomposition import PCA

def area(r):
    return math.pi * r * r

print(area(2))
"#;

#[test]
fn test_screen_submission_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("src/my_code.py");
    source.write_str(SUBMISSION).unwrap();

    let screen = Screen::default().with_allowed(LibraryList::bundled());
    let report = screen_file(source.path(), &PythonAnalyzer, &screen, &DEFAULT_ENCODINGS).unwrap();

    assert_eq!(report.imports.len(), 2);
    assert_eq!(report.unlisted, ["from sklearn.decomposition import PCA"]);
    source.assert(predicate::str::contains("import math"));
}

#[test]
fn test_denied_library_in_latin1_source() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("src/my_code.py");
    // Latin-1 comment keeps the file from decoding as UTF-8
    source
        .write_binary(b"# p\xE4\xE4ohjelma\nimport os\nprint(os.getcwd())\n")
        .unwrap();

    let screen = Screen::default().with_denied(LibraryList::new(["os"]));
    let err = screen_file(source.path(), &PythonAnalyzer, &screen, &DEFAULT_ENCODINGS).unwrap_err();
    assert!(matches!(err, Error::DeniedLibraries(lines) if lines == ["import os"]));
}

#[test]
fn test_missing_submission_is_not_found() {
    let temp = assert_fs::TempDir::new().unwrap();
    let err = screen_file(
        temp.path().join("src/my_code.py"),
        &PythonAnalyzer,
        &Screen::default(),
        &[TextEncoding::Utf8],
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
