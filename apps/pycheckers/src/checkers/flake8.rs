use super::pyflakes::is_pyflakes_warning;
use super::{Checker, RunEnv};
use crate::models::Fields;
use crate::version::Version;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<filename>[^:]+):(?P<line_number>[^:]+):(?P<column_number>[^:]+): (?P<error_type>[WEFCNI])(?P<error_number>[^ ]+) (?P<description>.+)$",
    )
    .expect("flake8 line pattern")
});

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<version>[0-9.]+)").expect("flake8 version pattern"));

const CONFIG_FILES: [&str; 3] = ["setup.cfg", "tox.ini", ".flake8"];

pub struct Flake8;

impl Checker for Flake8 {
    fn name(&self) -> &'static str {
        "flake8"
    }

    fn config_option(&self) -> Option<&'static str> {
        Some("flake8_config_file")
    }

    fn flags(&self, filepath: &Path, env: &mut RunEnv<'_>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(codes) = env.config.ignore_flag_value() {
            // --extend-ignore keeps the codes from the project's own config
            if env.probe_version(self) >= Version::from_parts(&[3, 6, 0]) {
                args.push(format!("--extend-ignore={}", codes));
            } else {
                args.push(format!("--ignore={}", codes));
            }
        }
        if let Some(config) = env.find_config_file(filepath, &CONFIG_FILES) {
            args.push("--config".to_string());
            args.push(config.to_string_lossy().into_owned());
        }
        args.push("--max-line-length".to_string());
        args.push(env.config.max_line_length.to_string());
        args
    }

    fn parse_line(&self, line: &str) -> Option<Fields> {
        Fields::capture(&LINE, line)
    }

    fn classify(&self, mut fields: Fields, _filepath: &Path) -> Option<Fields> {
        let level = match fields.get("error_type") {
            _ if is_pyflakes_warning(fields.get("description").unwrap_or_default()) => "WARNING",
            Some("F") => "ERROR",
            _ => "WARNING",
        };
        fields.set("level", level);
        // flake8 reports the full path
        let basename = Path::new(fields.get("filename")?)
            .file_name()?
            .to_string_lossy()
            .into_owned();
        fields.set("filename", basename);
        Some(fields)
    }

    fn version_pattern(&self) -> Option<&'static Regex> {
        Some(&VERSION)
    }
}
