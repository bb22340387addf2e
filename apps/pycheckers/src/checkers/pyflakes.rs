use super::Checker;
use crate::models::Fields;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<filename>[^:]+):(?P<line_number>\d+):(?:(?P<column_number>\d+):)?\s*(?P<description>.+)$",
    )
    .expect("pyflakes line pattern")
});

/// Messages pyflakes reports that are not real errors.
const WARNING_PHRASES: [&str; 4] = [
    "imported but unused",
    "redefinition of unused",
    "assigned to but never used",
    "unable to detect undefined names",
];

/// True when `description` is one of the pyflakes findings that should
/// only warn.
pub fn is_pyflakes_warning(description: &str) -> bool {
    WARNING_PHRASES.iter().any(|p| description.contains(p))
}

pub struct Pyflakes;

impl Checker for Pyflakes {
    fn name(&self) -> &'static str {
        "pyflakes"
    }

    fn parse_line(&self, line: &str) -> Option<Fields> {
        Fields::capture(&LINE, line)
    }

    fn classify(&self, mut fields: Fields, _filepath: &Path) -> Option<Fields> {
        let level = if is_pyflakes_warning(fields.get("description").unwrap_or_default()) {
            "WARNING"
        } else {
            "ERROR"
        };
        fields.set("level", level);
        fields.set("error_type", "PY");
        fields.set("error_number", "F");
        Some(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Diagnostic;

    fn diagnose(line: &str) -> Option<Diagnostic> {
        let fields = Pyflakes.parse_line(line)?;
        let fields = Pyflakes.classify(fields, Path::new("t.py"))?;
        Diagnostic::from_fields(&fields)
    }

    #[test]
    fn test_unused_import_is_warning() {
        let d = diagnose("tests/t.py:4: 'doom' imported but unused").unwrap();
        assert_eq!(
            d.render(),
            "WARNING PYF:'doom' imported but unused at tests/t.py line 4."
        );
    }

    #[test]
    fn test_undefined_name_is_error_with_column() {
        let d = diagnose("t.py:33:5: undefined name 'undefined'").unwrap();
        assert_eq!(
            d.render(),
            "ERROR PYF:undefined name 'undefined' at t.py line 33,5."
        );
    }

    #[test]
    fn test_source_echo_lines_are_not_findings() {
        assert!(diagnose("       deth").is_none());
        assert!(diagnose("      ^").is_none());
    }
}
