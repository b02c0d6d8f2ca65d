//! Diagnostic sink - warning and error collection.
//!
//! Diagnostics are collected during the compile and rendered afterwards;
//! the sink itself never aborts anything. Errors (but not warnings) set a
//! compilation-wide flag that the driver consults before committing
//! generated code to disk.
//!
//! # Examples
//!
//! ```
//! use rillc_util::diagnostic::{Category, Handler};
//!
//! let handler = Handler::new();
//! handler.warn("No closing quotation in string", 3);
//! handler.error(Category::Type, "Expected int type, encountered str", 7);
//!
//! assert!(handler.has_errors());
//! assert_eq!(handler.warning_count(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::Path;

use crate::source::SourceBuffer;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that suppresses the final code commit.
    Error,
    /// A warning; compilation may still succeed.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "Error"),
            Level::Warning => write!(f, "Warning"),
        }
    }
}

/// The phase or check an error originated from.
///
/// Warnings carry no category; only the scanner and the end-of-file
/// junk check produce them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Grammar violations raised by the parser's match primitive.
    Syntax,
    /// Identifier-table failures: duplicates and unresolved names.
    Name,
    /// Expression, assignment, and parameter type checks.
    Type,
    /// Checks deferred past the type system: argument counts, arrays
    /// used as scalars.
    Runtime,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Syntax => write!(f, "syntax"),
            Category::Name => write!(f, "name"),
            Category::Type => write!(f, "type"),
            Category::Runtime => write!(f, "runtime"),
        }
    }
}

/// A single collected diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Error category; `None` for warnings.
    pub category: Option<Category>,
    /// Human-readable message.
    pub message: String,
    /// 1-based source line the diagnostic points at.
    pub line: usize,
}

impl Diagnostic {
    /// Renders the diagnostic in the compiler's three-line report form:
    /// a header naming the file and line, the message, and the stripped
    /// source line at that position.
    pub fn render(&self, path: &Path, src: &SourceBuffer) -> String {
        let mut out = format!(
            "{}: \"{}\", line {}\n    {}",
            self.level,
            path.display(),
            self.line,
            self.message
        );
        if let Some(text) = src.line(self.line) {
            out.push_str("\n    ");
            out.push_str(text.trim());
        }
        out
    }
}

/// Collects diagnostics for one compilation.
///
/// The handler is shared by reference between the scanner and the
/// parser, so collection goes through interior mutability. It is not
/// thread-safe; a compile is strictly sequential.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
    had_errors: Cell<bool>,
}

impl Handler {
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            had_errors: Cell::new(false),
        }
    }

    /// Records a warning. Warnings never suppress the code commit.
    pub fn warn(&self, message: impl Into<String>, line: usize) {
        self.diagnostics.borrow_mut().push(Diagnostic {
            level: Level::Warning,
            category: None,
            message: message.into(),
            line,
        });
    }

    /// Records an error and sets the had-errors flag.
    pub fn error(&self, category: Category, message: impl Into<String>, line: usize) {
        self.had_errors.set(true);
        self.diagnostics.borrow_mut().push(Diagnostic {
            level: Level::Error,
            category: Some(category),
            message: message.into(),
            line,
        });
    }

    /// True once any error has been recorded.
    pub fn has_errors(&self) -> bool {
        self.had_errors.get()
    }

    /// Number of collected errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// All diagnostics in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn new_handler_is_clean() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    fn warnings_do_not_set_error_flag() {
        let handler = Handler::new();
        handler.warn("No closing quotation in string", 2);
        assert!(!handler.has_errors());
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn errors_set_flag_and_keep_category() {
        let handler = Handler::new();
        handler.error(Category::Name, "x: not declared in this scope", 4);
        assert!(handler.has_errors());
        let diags = handler.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].category, Some(Category::Name));
        assert_eq!(diags[0].line, 4);
    }

    #[test]
    fn diagnostics_preserve_emission_order() {
        let handler = Handler::new();
        handler.warn("first", 1);
        handler.error(Category::Syntax, "second", 2);
        handler.warn("third", 3);
        let messages: Vec<_> = handler
            .diagnostics()
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn render_includes_header_message_and_source_line() {
        let src = SourceBuffer::from_source("int x;\n  x = 3;\n");
        let diag = Diagnostic {
            level: Level::Error,
            category: Some(Category::Type),
            message: "Expected int type, encountered str".to_string(),
            line: 2,
        };
        let text = diag.render(&PathBuf::from("prog.rill"), &src);
        assert_eq!(
            text,
            "Error: \"prog.rill\", line 2\n    Expected int type, encountered str\n    x = 3;"
        );
    }

    #[test]
    fn render_tolerates_out_of_range_lines() {
        let src = SourceBuffer::from_source("int x;\n");
        let diag = Diagnostic {
            level: Level::Warning,
            category: None,
            message: "Content found after end of program".to_string(),
            line: 99,
        };
        let text = diag.render(&PathBuf::from("prog.rill"), &src);
        assert!(text.starts_with("Warning: \"prog.rill\", line 99"));
        assert!(text.ends_with("Content found after end of program"));
    }
}
