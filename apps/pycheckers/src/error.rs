//! Fatal errors that abort a run before any checker is spawned.
//!
//! Anything that goes wrong while a checker runs is reported as a
//! synthesized diagnostic instead; see `checkers::Runner::run`.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown checker {name}. Expected one of {valid}")]
    UnknownChecker { name: String, valid: String },

    #[error("Can't find source file {}", .0.display())]
    MissingSource(PathBuf),

    #[error("Can't find config file {} for checker {checker}", path.display())]
    MissingConfigFile { path: PathBuf, checker: String },

    #[error("Invalid value {value:?} for option {key}: {reason}")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Can't parse config file {} line {line}: {message}", path.display())]
    ConfigParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Can't read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Render the error the way editors expect a pycheckers failure line.
    pub fn to_diagnostic_line(&self, filename: &str) -> String {
        format!("ERROR :pycheckers:{} at {} line 1.", self, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_checker_line_lists_valid_names() {
        let err = Error::UnknownChecker {
            name: "doesnotexist".into(),
            valid: "pyflakes, flake8".into(),
        };
        assert_eq!(
            err.to_diagnostic_line("x.py"),
            "ERROR :pycheckers:Unknown checker doesnotexist. Expected one of pyflakes, flake8 at x.py line 1."
        );
    }
}
