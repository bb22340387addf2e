//! Checker abstraction and registry.
//!
//! A checker knows how to invoke one external tool and read its output. Each
//! concrete checker is an independent value implementing `Checker`; shared
//! behavior lives in free functions and in `Runner`, which drives the common
//! run contract (resolve executable, spawn, normalize, synthesize failures).

mod bandit;
mod flake8;
mod mypy;
mod pep8;
mod pyflakes;
mod pylint;
mod runner;
mod settings;

pub use bandit::Bandit;
pub use flake8::Flake8;
pub use mypy::{original_path, Mypy};
pub use pep8::Pep8;
pub use pyflakes::Pyflakes;
pub use pylint::Pylint;
pub use runner::{RunEnv, Runner, RunnerState};
pub use settings::{scope_ignore_codes, CheckerConfig};

use crate::error::{Error, Result};
use crate::models::Fields;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Registered checker names, in the order they are listed to users.
pub const CHECKER_NAMES: [&str; 7] = [
    "pyflakes", "flake8", "pep8", "pylint", "mypy2", "mypy3", "bandit",
];

/// The capability set every checker provides.
pub trait Checker: Send + Sync {
    /// Registry name, also used to prefix descriptions and to look up
    /// `<name>_ignore_codes` / `<name>_command` options.
    fn name(&self) -> &'static str;

    /// Older name whose `<name>_*` options still apply when the current
    /// name has none.
    fn legacy_name(&self) -> Option<&'static str> {
        None
    }

    /// Executable to run. Usually the same as the name.
    fn command(&self) -> &'static str {
        self.name()
    }

    /// Option holding an explicit path to the tool's own config file.
    fn config_option(&self) -> Option<&'static str> {
        None
    }

    /// Codes the tool accepts in its ignore flag; `None` accepts any.
    fn acceptable_codes(&self) -> Option<&'static [&'static str]> {
        None
    }

    /// Flags placed between the command and the target.
    fn flags(&self, _filepath: &Path, _env: &mut RunEnv<'_>) -> Vec<String> {
        Vec::new()
    }

    /// Path handed to the tool as its final argument.
    fn target(&self, filepath: &Path) -> PathBuf {
        filepath.to_path_buf()
    }

    /// Extra environment for the tool process.
    fn env_vars(&self, _config: &CheckerConfig) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Extract fields from one output line, or `None` if it is not a finding.
    fn parse_line(&self, line: &str) -> Option<Fields>;

    /// Fix up severity and codes. Returning `None` drops the line.
    fn classify(&self, fields: Fields, _filepath: &Path) -> Option<Fields> {
        Some(fields)
    }

    /// Whether the exit status means the check itself ran fine.
    fn accepts(&self, _returncode: i32) -> bool {
        true
    }

    /// Pattern with a `version` group matched against `--version` output.
    fn version_pattern(&self) -> Option<&'static Regex> {
        None
    }
}

/// Look up a checker by registry name.
pub fn checker_for(name: &str) -> Option<Box<dyn Checker>> {
    let checker: Box<dyn Checker> = match name {
        "pyflakes" => Box::new(Pyflakes),
        "flake8" => Box::new(Flake8),
        "pep8" => Box::new(Pep8),
        "pylint" => Box::new(Pylint),
        "mypy2" => Box::new(Mypy::py2()),
        "mypy3" => Box::new(Mypy::py3()),
        "bandit" => Box::new(Bandit),
        _ => return None,
    };
    Some(checker)
}

/// Resolve every requested name, failing on the first unknown one.
pub fn validate_checkers(names: &[String]) -> Result<Vec<Box<dyn Checker>>> {
    names
        .iter()
        .map(|name| {
            checker_for(name).ok_or_else(|| Error::UnknownChecker {
                name: name.clone(),
                valid: CHECKER_NAMES.join(", "),
            })
        })
        .collect()
}
