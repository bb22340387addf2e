use super::{Checker, CheckerConfig, RunEnv};
use crate::models::Fields;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<filename>[^:]+):(?P<line_number>\d+):(?P<column_number>\d+):",
        r"\s*\[(?P<error_type>[WECRF])(?P<error_number>[^(,\]]+)",
        r"\((?P<symbol>[^)]*)\)\s*(?P<context>[^\]]*)\]",
        r"\s*(?P<description>.*)$",
    ))
    .expect("pylint line pattern")
});

/// Output format requested from pylint so `LINE` can read it.
const MSG_TEMPLATE: &str = "{path}:{line}:{column}: [{msg_id}({symbol})] {msg}";

/// Exit status bits: fatal message issued, usage error.
const FATAL: i32 = 1;
const USAGE_ERROR: i32 = 32;

pub struct Pylint;

impl Checker for Pylint {
    fn name(&self) -> &'static str {
        "pylint"
    }

    fn config_option(&self) -> Option<&'static str> {
        Some("pylint_rcfile")
    }

    fn flags(&self, _filepath: &Path, env: &mut RunEnv<'_>) -> Vec<String> {
        let config = &env.config;
        let mut args = Vec::new();
        if let Some(codes) = config.ignore_flag_value() {
            args.push(format!("--disable={}", codes));
        }
        let enable = config.enable_codes.iter().cloned().collect::<Vec<_>>().join(",");
        args.extend([
            "--msg-template".to_string(),
            MSG_TEMPLATE.to_string(),
            "--reports".to_string(),
            "n".to_string(),
            format!("--enable={}", enable),
            "--dummy-variables-rgx=_.*".to_string(),
            "--max-line-length".to_string(),
            config.max_line_length.to_string(),
        ]);
        if let Some(rcfile) = &config.config_file {
            args.push("--rcfile".to_string());
            args.push(rcfile.to_string_lossy().into_owned());
        }
        args
    }

    fn env_vars(&self, config: &CheckerConfig) -> Vec<(String, String)> {
        config
            .config_file
            .iter()
            .map(|rc| ("PYLINTRC".to_string(), rc.to_string_lossy().into_owned()))
            .collect()
    }

    fn parse_line(&self, line: &str) -> Option<Fields> {
        Fields::capture(&LINE, line)
    }

    fn classify(&self, mut fields: Fields, _filepath: &Path) -> Option<Fields> {
        let level = match fields.get("error_type") {
            Some("E" | "F") => "ERROR",
            _ => "WARNING",
        };
        fields.set("level", level);

        if let Some(symbol) = fields.non_empty("symbol").map(str::to_string) {
            let desc = fields.get("description").unwrap_or_default().to_string();
            fields.set("description", format!("{}  (\"{}\")", desc, symbol));
        }

        // pylint columns are zero based
        if let Some(col) = fields.get("column_number").and_then(|c| c.parse::<u64>().ok()) {
            fields.set("column_number", (col + 1).to_string());
        }
        Some(fields)
    }

    fn accepts(&self, returncode: i32) -> bool {
        returncode & (FATAL | USAGE_ERROR) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Diagnostic;
    use std::path::PathBuf;

    fn diagnose(line: &str) -> Option<Diagnostic> {
        let fields = Pylint.classify(Pylint.parse_line(line)?, Path::new("render.py"))?;
        Diagnostic::from_fields(&fields)
    }

    #[test]
    fn test_symbol_and_column_adjustment() {
        let d = diagnose("render.py:49:0: [C0301(line-too-long), ] Line too long (82/80)").unwrap();
        assert_eq!(
            d.render(),
            "WARNING C0301:Line too long (82/80)  (\"line-too-long\") at render.py line 49,1."
        );
    }

    #[test]
    fn test_error_and_fatal_levels() {
        let d = diagnose("render.py:3:0: [E0611(no-name-in-module), ] No name 'Response'").unwrap();
        assert_eq!(d.level.as_str(), "ERROR");
        let d = diagnose("render.py:1:0: [F0001(fatal), ] No module named x").unwrap();
        assert_eq!(d.level.as_str(), "ERROR");
        let d = diagnose("render.py:32:4: [C0111(missing-docstring), render] Missing docstring")
            .unwrap();
        assert_eq!(d.level.as_str(), "WARNING");
        assert!(diagnose("************* Module render").is_none());
    }

    #[test]
    fn test_bit_encoded_exit_status() {
        assert!(Pylint.accepts(0));
        assert!(Pylint.accepts(4 | 8 | 16));
        assert!(!Pylint.accepts(1));
        assert!(!Pylint.accepts(32));
        assert!(!Pylint.accepts(2 | 32));
    }

    #[test]
    fn test_rcfile_exported_in_environment() {
        let config = CheckerConfig {
            config_file: Some(PathBuf::from("/p/.pylintrc")),
            ..CheckerConfig::default()
        };
        assert_eq!(
            Pylint.env_vars(&config),
            vec![("PYLINTRC".to_string(), "/p/.pylintrc".to_string())]
        );
        assert!(Pylint.env_vars(&CheckerConfig::default()).is_empty());
    }
}
