//! Optional project configuration.
//!
//! A `rillc.toml` next to the source file (or named explicitly with
//! `--config`) supplies defaults that command-line flags override. A
//! missing file is not an error; a malformed one is.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::DriverError;

/// Contents of `rillc.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default for the `--debug` flag.
    pub debug: Option<bool>,

    /// Directory output files land in when `-o` is not given.
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    pub const FILE_NAME: &'static str = "rillc.toml";

    /// Loads the file at `path`, or defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, DriverError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| DriverError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| DriverError::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig::load(&dir.path().join(FileConfig::FILE_NAME)).unwrap();
        assert_eq!(config.debug, None);
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn valid_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FileConfig::FILE_NAME);
        fs::write(&path, "debug = true\noutput_dir = \"build\"\n").unwrap();
        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.debug, Some(true));
        assert_eq!(config.output_dir, Some(PathBuf::from("build")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FileConfig::FILE_NAME);
        fs::write(&path, "optimize = 3\n").unwrap();
        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
    }
}
