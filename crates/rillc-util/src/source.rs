//! Line-indexed source buffer.
//!
//! The scanner walks the input one character at a time with a
//! `(line, column)` cursor, and diagnostic rendering needs the text of
//! an arbitrary line, so the buffer keeps the file split into lines.
//! Every stored line ends with `'\n'`, including the last one; the
//! scanner relies on that sentinel to detect logical line ends without
//! bounds checks of its own.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to attach a source file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The path exists but is not a regular file.
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The whole input file, split into lines.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// Lines with their `'\n'` terminators. A trailing newline is
    /// appended to the final line if the file lacks one.
    lines: Vec<String>,
}

impl SourceBuffer {
    /// Loads a source file from disk.
    ///
    /// Fails if the path is not a regular file or cannot be read; the
    /// driver translates the error into its user-facing form.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(SourceError::NotAFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(Self::from_source(&text))
    }

    /// Builds a buffer directly from source text.
    pub fn from_source(text: &str) -> Self {
        let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_owned).collect();
        if let Some(last) = lines.last_mut() {
            if !last.ends_with('\n') {
                last.push('\n');
            }
        }
        Self { lines }
    }

    /// Number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns line `n` (1-based) with its line ending stripped, or
    /// `None` when `n` is out of range.
    pub fn line(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return None;
        }
        self.lines
            .get(n - 1)
            .map(|l| l.trim_end_matches(['\n', '\r']))
    }

    /// Raw text of line `line` (0-based), including the `'\n'`
    /// terminator.
    pub fn raw_line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    /// Character at `(line, col)`, both 0-based and counted in
    /// characters. The `'\n'` terminator is addressable, so the scanner
    /// sees it at every logical line end. `None` past end of file or
    /// past a line's terminator.
    pub fn char_at(&self, line: usize, col: usize) -> Option<char> {
        self.lines.get(line)?.chars().nth(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn lines_are_one_based_and_stripped() {
        let src = SourceBuffer::from_source("int x;\nx = 3;\n");
        assert_eq!(src.line_count(), 2);
        assert_eq!(src.line(1), Some("int x;"));
        assert_eq!(src.line(2), Some("x = 3;"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(3), None);
    }

    #[test]
    fn missing_final_newline_is_repaired() {
        let src = SourceBuffer::from_source("finish program");
        assert_eq!(src.line_count(), 1);
        assert_eq!(src.char_at(0, 14), Some('\n'));
    }

    #[test]
    fn char_at_exposes_newline_sentinels() {
        let src = SourceBuffer::from_source("ab\nc\n");
        assert_eq!(src.char_at(0, 0), Some('a'));
        assert_eq!(src.char_at(0, 2), Some('\n'));
        assert_eq!(src.char_at(1, 0), Some('c'));
        assert_eq!(src.char_at(1, 1), Some('\n'));
        assert_eq!(src.char_at(1, 2), None);
        assert_eq!(src.char_at(2, 0), None);
    }

    #[test]
    fn empty_source_has_no_lines() {
        let src = SourceBuffer::from_source("");
        assert_eq!(src.line_count(), 0);
        assert_eq!(src.char_at(0, 0), None);
    }

    #[test]
    fn load_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceBuffer::load(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::NotAFile(_)));
    }

    #[test]
    fn load_reads_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.rill");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "the program p is").unwrap();
        let src = SourceBuffer::load(&path).unwrap();
        assert_eq!(src.line(1), Some("the program p is"));
    }
}
