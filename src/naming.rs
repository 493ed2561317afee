//! Output file naming and input discovery
//!
//! Cleaned files are written as `<stem>_cleaned.pdf`, except for course
//! book downloads whose names follow the class path convention
//! (`SEC504 - Book 1_1234567.pdf`), which are shortened to
//! `SEC504_Book_1.pdf`.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use glob::glob;
use log::warn;
use regex::Regex;

use crate::error::{Error, Result};

/// Suffix added to the stem of ordinary file names
pub const CLEANED_SUFFIX: &str = "_cleaned";

fn class_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z]{3}[0-9]{3} - [a-zA-Z]+ ?[0-9]?_[0-9]+").expect("class path pattern is valid")
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Check whether a file name follows the class path convention
pub fn is_class_path(path: &Path) -> bool {
    class_path_pattern().is_match(&file_stem(path))
}

/// Convert a class path stem into the short output file name
///
/// `SEC504 - Book 1_1234567` becomes `SEC504_Book_1.pdf` and
/// `ABC123 - Workbook_998` becomes `ABC123_Workbook.pdf`.
pub fn convert_class_path(stem: &str) -> Result<String> {
    let mut parts = stem.split(" - ");
    let class_name = parts.next().unwrap_or_default();
    let book = parts
        .next()
        .ok_or_else(|| Error::InvalidClassName(stem.to_string()))?;

    let words: Vec<&str> = book.split_whitespace().collect();
    match words.as_slice() {
        [single] => {
            let title = single.split('_').next().unwrap_or_default();
            Ok(format!("{}_{}.pdf", class_name, title))
        }
        [title, number, ..] => {
            let number = number.split('_').next().unwrap_or_default();
            Ok(format!("{}_{}_{}.pdf", class_name, title, number))
        }
        [] => Err(Error::InvalidClassName(stem.to_string())),
    }
}

/// Path the cleaned copy of `input` is written to
pub fn output_path(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = file_stem(input);

    let file_name = if is_class_path(input) {
        convert_class_path(&stem)?
    } else {
        format!("{}{}.pdf", stem, CLEANED_SUFFIX)
    };

    Ok(output_dir.join(file_name))
}

/// Make sure the output directory exists, creating it if needed
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// List the PDF files directly inside a directory, sorted by path
pub fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Error::FileNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    // Escape the directory so brackets in its name aren't read as a pattern
    let pattern = format!(
        "{}/*.pdf",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut paths = Vec::new();
    for entry in glob(&pattern).map_err(|e| Error::InvalidGlob(e.to_string()))? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => warn!("Skipping unreadable entry in {}: {}", dir.display(), e),
        }
    }

    // Sort paths for consistent ordering
    paths.sort();

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_class_path() {
        assert!(is_class_path(Path::new("SEC504 - Book 1_1234567.pdf")));
        assert!(is_class_path(Path::new("/tmp/books/FOR508 - Workbook_998877.pdf")));
        assert!(is_class_path(Path::new("abc123 - Book1_5.pdf")));
    }

    #[test]
    fn test_is_not_class_path() {
        assert!(!is_class_path(Path::new("report.pdf")));
        assert!(!is_class_path(Path::new("SEC504 - Book 1.pdf")));
        assert!(!is_class_path(Path::new("SEC5040 - Book 1_1.pdf")));
        assert!(!is_class_path(Path::new("SEC504-Book 1_1.pdf")));
    }

    #[test]
    fn test_convert_class_path_with_number() {
        assert_eq!(convert_class_path("SEC504 - Book 1_1234567").unwrap(), "SEC504_Book_1.pdf");
    }

    #[test]
    fn test_convert_class_path_single_word() {
        assert_eq!(convert_class_path("ABC123 - Workbook_998").unwrap(), "ABC123_Workbook.pdf");
    }

    #[test]
    fn test_convert_class_path_ignores_later_sections() {
        assert_eq!(
            convert_class_path("ABC123 - Workbook_998 - copy").unwrap(),
            "ABC123_Workbook.pdf"
        );
    }

    #[test]
    fn test_convert_class_path_without_separator() {
        let result = convert_class_path("SEC504_Book_1");
        assert!(matches!(result.unwrap_err(), Error::InvalidClassName(_)));
    }

    #[test]
    fn test_output_path() {
        let dir = Path::new("out");

        assert_eq!(
            output_path(Path::new("in/report.pdf"), dir).unwrap(),
            PathBuf::from("out/report_cleaned.pdf")
        );
        assert_eq!(
            output_path(Path::new("in/SEC504 - Book 2_1234567.pdf"), dir).unwrap(),
            PathBuf::from("out/SEC504_Book_2.pdf")
        );
    }

    #[test]
    fn test_output_path_current_dir() {
        assert_eq!(
            output_path(Path::new("notes.pdf"), Path::new("")).unwrap(),
            PathBuf::from("notes_cleaned.pdf")
        );
    }

    #[test]
    fn test_ensure_output_dir_creates_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("a").join("b");

        ensure_output_dir(&nested).unwrap();

        assert!(nested.is_dir());
    }

    #[test]
    fn test_ensure_output_dir_rejects_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("file.pdf");
        std::fs::write(&file, b"%PDF-1.5").unwrap();

        let result = ensure_output_dir(&file);
        assert!(matches!(result.unwrap_err(), Error::NotADirectory(_)));
    }

    #[test]
    fn test_find_pdfs_sorted() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["b.pdf", "a.pdf", "notes.txt"] {
            std::fs::write(temp_dir.path().join(name), b"").unwrap();
        }

        let found = find_pdfs(temp_dir.path()).unwrap();

        assert_eq!(
            found,
            vec![temp_dir.path().join("a.pdf"), temp_dir.path().join("b.pdf")]
        );
    }

    #[test]
    fn test_find_pdfs_missing_dir() {
        let result = find_pdfs(Path::new("no/such/dir"));
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }
}
