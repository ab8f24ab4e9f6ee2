//! Line-oriented input files (URL lists and vocabularies).

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

/// Errors raised while reading an input file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be opened or read.
    #[error("cannot read '{path}': {source}")]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl InputError {
    fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads a file as a list of entries, one per line.
///
/// Lines are trimmed and blank lines are dropped. Duplicates are kept and
/// no validation is applied.
///
/// # Errors
///
/// Returns [`InputError::Read`] if the file cannot be read as UTF-8 text.
#[instrument(fields(path = %path.display()))]
pub fn read_lines(path: &Path) -> Result<Vec<String>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::read(path, e))?;

    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    debug!(count = lines.len(), "read input lines");
    Ok(lines)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_read_lines_trims_and_skips_blanks() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  https://example.com/a  ").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "\t").unwrap();
        writeln!(file, "https://example.com/b").unwrap();
        write!(file, "https://example.com/a").unwrap();

        let lines = read_lines(file.path()).unwrap();
        assert_eq!(
            lines,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/a"
            ]
        );
    }

    #[test]
    fn test_read_lines_handles_crlf() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "alpha\r\nbeta\r\n").unwrap();
        assert_eq!(read_lines(file.path()).unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_read_lines_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(read_lines(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_read_lines_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");

        let err = read_lines(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.txt"), "got: {err}");
        assert!(matches!(err, InputError::Read { ref source, .. } if source.kind() == io::ErrorKind::NotFound));
    }
}
