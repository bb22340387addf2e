//! CLI argument parsing via `clap`.

use crate::config::{parse_bool, OptionValue, Options};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pycheckers",
    version,
    about = "Run several Python checkers on one file",
    long_about = "Run several Python checkers on one file and merge their findings into flycheck-style lines.\n\nConfiguration precedence: .pycheckers files (closest first) > CLI > defaults.",
    after_help = "Examples:\n  pycheckers src/app.py\n  pycheckers -c flake8,mypy3 --max-line-length 100 src/app.py\n  pycheckers -c pylint --output json src/app.py"
)]
/// Top-level CLI options.
pub struct Cli {
    #[arg(help = "Filename to check")]
    pub file: PathBuf,
    #[arg(short = 'c', long, help = "Comma-separated list of checkers")]
    pub checkers: Option<String>,
    #[arg(short = 'i', long, help = "Comma-separated list of error codes to ignore")]
    pub ignore_codes: Option<String>,
    #[arg(short = 'e', long, help = "Comma-separated list of error codes to enable")]
    pub enable_codes: Option<String>,
    #[arg(long, help = "Maximum line length (default: 79)")]
    pub max_line_length: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Ignore config files above the closest one")]
    pub no_merge_configs: bool,
    #[arg(long, value_parser = parse_bool, help = "Run checkers simultaneously (default: true)")]
    pub multi_thread: Option<bool>,
    #[arg(long, help = "Directory holding virtualenvwrapper environments (default: ~/.virtualenvs)")]
    pub venv_root: Option<String>,
    #[arg(long, help = "Full path to a virtualenv to run checkers from")]
    pub venv_path: Option<String>,
    #[arg(long, help = "Location of a config file for pylint")]
    pub pylint_rcfile: Option<String>,
    #[arg(long, help = "Location of a config file for mypy")]
    pub mypy_config_file: Option<String>,
    #[arg(long, help = "Location of a config file for flake8")]
    pub flake8_config_file: Option<String>,
    #[arg(long, value_parser = parse_bool, help = "Report a failing checker's stderr as findings (default: true)")]
    pub report_checker_errors_inline: Option<bool>,
    #[arg(long, value_parser = parse_bool, help = "Pass --no-implicit-optional to mypy (default: false)")]
    pub mypy_no_implicit_optional: Option<bool>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Append arguments and timings as INFO lines")]
    pub debug: bool,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
}

impl Cli {
    /// Defaults overlaid with whatever was given on the command line.
    pub fn to_options(&self) -> Options {
        let mut options = Options::with_defaults();
        let strings = [
            ("checkers", &self.checkers),
            ("ignore_codes", &self.ignore_codes),
            ("enable_codes", &self.enable_codes),
            ("max_line_length", &self.max_line_length),
            ("venv_root", &self.venv_root),
            ("venv_path", &self.venv_path),
            ("pylint_rcfile", &self.pylint_rcfile),
            ("mypy_config_file", &self.mypy_config_file),
            ("flake8_config_file", &self.flake8_config_file),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                options.set(key, OptionValue::Str(v.clone()));
            }
        }
        let bools = [
            ("multi_thread", self.multi_thread),
            ("report_checker_errors_inline", self.report_checker_errors_inline),
            ("mypy_no_implicit_optional", self.mypy_no_implicit_optional),
        ];
        for (key, value) in bools {
            if let Some(v) = value {
                options.set(key, OptionValue::Bool(v));
            }
        }
        if self.no_merge_configs {
            options.set("merge_configs", OptionValue::Bool(false));
        }
        if self.debug {
            options.set("debug", OptionValue::Bool(true));
        }
        options
    }
}
