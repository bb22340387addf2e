use super::{Checker, RunEnv};
use crate::models::Fields;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<filename>[^:]+):(?P<line_number>[^:]+):(?P<column_number>[^:]+): (?P<error_number>\w+) (?P<description>.+)$",
    )
    .expect("pep8 line pattern")
});

pub struct Pep8;

impl Checker for Pep8 {
    fn name(&self) -> &'static str {
        "pep8"
    }

    fn flags(&self, _filepath: &Path, env: &mut RunEnv<'_>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(codes) = env.config.ignore_flag_value() {
            args.push(format!("--ignore={}", codes));
        }
        args.push("--repeat".to_string());
        args.push("--max-line-length".to_string());
        args.push(env.config.max_line_length.to_string());
        args
    }

    fn parse_line(&self, line: &str) -> Option<Fields> {
        Fields::capture(&LINE, line)
    }

    fn classify(&self, mut fields: Fields, _filepath: &Path) -> Option<Fields> {
        fields.set("level", "WARNING");
        Some(fields)
    }
}
