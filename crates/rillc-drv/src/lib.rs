//! rillc-drv - Compiler driver.
//!
//! Orchestrates one compilation: read the source, run the single-pass
//! front end, render whatever diagnostics were collected, and commit
//! the generated code to the destination file only when no error was
//! reported. The source and destination files are each held open only
//! for their one read or write; every exit path releases them.
//!
//! The `rillc` binary in `main.rs` is a thin clap wrapper over
//! [`Session`].

mod config;

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use rillc_lex::Scanner;
use rillc_par::Parser;
use rillc_util::{Handler, SourceBuffer, SourceError};

pub use config::FileConfig;

/// Driver failure.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The source file could not be attached.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: SourceError,
    },

    /// The destination file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file was present but unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The compile reported errors; nothing was written.
    #[error("compilation failed with {errors} error(s)")]
    Failed { errors: usize },
}

/// Resolved settings for one compilation.
#[derive(Clone, Debug)]
pub struct Config {
    /// Source file.
    pub input: PathBuf,

    /// Destination file for the emitted intermediate code.
    pub output: PathBuf,

    /// Interleave `//` comments with the emitted code.
    pub debug: bool,
}

impl Config {
    /// Merges command-line options with the file configuration. The
    /// default destination is the source path with a `.c` extension,
    /// redirected into `output_dir` when one is configured.
    pub fn resolve(
        input: PathBuf,
        output: Option<PathBuf>,
        debug: bool,
        file: &FileConfig,
    ) -> Self {
        let output = output.unwrap_or_else(|| {
            let default = input.with_extension("c");
            match (&file.output_dir, default.file_name()) {
                (Some(dir), Some(name)) => dir.join(name),
                _ => default,
            }
        });
        Self {
            input,
            output,
            debug: debug || file.debug.unwrap_or(false),
        }
    }
}

/// What a successful compile produced.
#[derive(Clone, Debug)]
pub struct CompileSummary {
    pub output: PathBuf,
    pub warnings: usize,
}

/// One compiler invocation.
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the compile. Diagnostics are rendered to stderr in
    /// emission order; the destination file is written only when none
    /// of them was an error.
    pub fn compile(&self) -> Result<CompileSummary, DriverError> {
        debug!(input = %self.config.input.display(), "reading source");
        let source = SourceBuffer::load(&self.config.input).map_err(|source| DriverError::Read {
            path: self.config.input.clone(),
            source,
        })?;

        debug!("parsing");
        let handler = Handler::new();
        let scanner = Scanner::new(&source, &handler);
        let mut parser = Parser::new(scanner, &handler, self.config.debug);
        parser.compile();
        let generator = parser.into_generator();

        for diagnostic in handler.diagnostics() {
            eprintln!("{}", diagnostic.render(&self.config.input, &source));
        }

        if handler.has_errors() {
            return Err(DriverError::Failed {
                errors: handler.error_count(),
            });
        }

        generator
            .commit(&self.config.output)
            .map_err(|source| DriverError::Write {
                path: self.config.output.clone(),
                source,
            })?;
        info!(output = %self.config.output.display(), "wrote intermediate code");

        Ok(CompileSummary {
            output: self.config.output.clone(),
            warnings: handler.warning_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_source(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("prog.rill");
        fs::write(&path, text).unwrap();
        path
    }

    fn session(input: PathBuf, output: PathBuf) -> Session {
        Session::new(Config {
            input,
            output,
            debug: false,
        })
    }

    #[test]
    fn default_output_swaps_the_extension() {
        let config = Config::resolve(
            PathBuf::from("src/prog.rill"),
            None,
            false,
            &FileConfig::default(),
        );
        assert_eq!(config.output, PathBuf::from("src/prog.c"));
    }

    #[test]
    fn output_dir_redirects_the_default() {
        let file = FileConfig {
            debug: Some(true),
            output_dir: Some(PathBuf::from("build")),
        };
        let config = Config::resolve(PathBuf::from("prog.rill"), None, false, &file);
        assert_eq!(config.output, PathBuf::from("build/prog.c"));
        assert!(config.debug);
    }

    #[test]
    fn explicit_output_wins_over_everything() {
        let file = FileConfig {
            debug: None,
            output_dir: Some(PathBuf::from("build")),
        };
        let config = Config::resolve(
            PathBuf::from("prog.rill"),
            Some(PathBuf::from("custom.c")),
            false,
            &file,
        );
        assert_eq!(config.output, PathBuf::from("custom.c"));
    }

    #[test]
    fn clean_compile_writes_the_destination() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "the program p is define body finish program\n");
        let output = dir.path().join("prog.c");
        let summary = session(input, output.clone()).compile().unwrap();
        assert_eq!(summary.warnings, 0);
        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("p_1:"));
        assert!(text.contains("p_1_body:"));
    }

    #[test]
    fn failed_compile_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(
            &dir,
            "the program p is\ndefine\nint x;\nbody\nx = \"hello\";\nfinish program\n",
        );
        let output = dir.path().join("prog.c");
        let err = session(input, output.clone()).compile().unwrap_err();
        assert!(matches!(err, DriverError::Failed { errors: 1 }));
        assert!(!output.exists());
    }

    #[test]
    fn missing_source_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = session(dir.path().join("absent.rill"), dir.path().join("out.c"))
            .compile()
            .unwrap_err();
        assert!(matches!(err, DriverError::Read { .. }));
    }
}
