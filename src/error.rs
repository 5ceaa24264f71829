//! Errors raised by the command-line front end.
//!
//! Conversion itself cannot fail; only reading input and writing output can.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", display_path(.path))]
    Read {
        path: Option<PathBuf>, // None for stdin
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read stylesheet {}: {source}", .path.display())]
    Stylesheet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", display_path(.path))]
    Write {
        path: Option<PathBuf>, // None for stdout
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document tree: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "standard stream".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn messages_name_the_path() {
        let err = CliError::Read {
            path: Some(PathBuf::from("notes.md")),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "failed to read notes.md: missing");

        let err = CliError::Write {
            path: None,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "closed"),
        };
        assert_eq!(err.to_string(), "failed to write standard stream: closed");
    }
}
