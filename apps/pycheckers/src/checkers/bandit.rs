use super::{Checker, RunEnv};
use crate::models::Fields;
use std::path::Path;

/// Test ids bandit recognizes in `--skip`.
const KNOWN_TESTS: [&str; 64] = [
    "B101", "B102", "B103", "B104", "B105", "B106", "B107", "B108", "B109",
    "B110", "B111", "B112", "B201", "B301", "B302", "B303", "B304", "B305",
    "B306", "B307", "B308", "B309", "B310", "B311", "B312", "B313", "B314",
    "B315", "B316", "B317", "B318", "B319", "B320", "B321", "B322", "B401",
    "B402", "B403", "B404", "B405", "B406", "B407", "B408", "B409", "B410",
    "B411", "B412", "B501", "B502", "B503", "B504", "B505", "B506", "B601",
    "B602", "B603", "B604", "B605", "B606", "B607", "B608", "B609", "B701",
    "B702",
];

// CSV columns: filename,test_name,test_id,issue_severity,issue_confidence,
// issue_text,line_number,line_range[,...]
const FILENAME: usize = 0;
const TEST_ID: usize = 2;
const ISSUE_TEXT: usize = 5;
const LINE_NUMBER: usize = 6;

pub struct Bandit;

impl Checker for Bandit {
    fn name(&self) -> &'static str {
        "bandit"
    }

    fn acceptable_codes(&self) -> Option<&'static [&'static str]> {
        Some(&KNOWN_TESTS)
    }

    fn flags(&self, _filepath: &Path, env: &mut RunEnv<'_>) -> Vec<String> {
        let mut args = vec!["-f".to_string(), "csv".to_string()];
        if let Some(codes) = env.config.ignore_flag_value().filter(|c| !c.is_empty()) {
            args.push("--skip".to_string());
            args.push(codes);
        }
        args
    }

    fn parse_line(&self, line: &str) -> Option<Fields> {
        let record = split_record(line);
        let test_id = record.get(TEST_ID)?;
        if test_id.is_empty() || test_id == "test_id" {
            return None;
        }
        Some(Fields::from_iter([
            ("description", record.get(ISSUE_TEXT)?.as_str()),
            ("error_number", test_id.as_str()),
            ("filename", record.get(FILENAME)?.as_str()),
            ("level", "WARNING"),
            ("line_number", record.get(LINE_NUMBER)?.as_str()),
        ]))
    }
}

/// Split one CSV record, honoring double quotes and `""` escapes.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Diagnostic;

    #[test]
    fn test_header_is_skipped() {
        let header = "filename,test_name,test_id,issue_severity,issue_confidence,issue_text,line_number,line_range";
        assert!(Bandit.parse_line(header).is_none());
        assert!(Bandit.parse_line("").is_none());
    }

    #[test]
    fn test_quoted_record() {
        let line = r#"app/x.py,assert_used,B101,LOW,HIGH,"Use of assert detected, ""removed"" with -O.",12,"[12, 13]""#;
        let d = Diagnostic::from_fields(&Bandit.parse_line(line).unwrap()).unwrap();
        assert_eq!(
            d.render(),
            "WARNING B101:Use of assert detected, \"removed\" with -O. at app/x.py line 12."
        );
    }

    #[test]
    fn test_short_record_is_ignored() {
        assert!(Bandit.parse_line("x.py,assert_used,B101").is_none());
    }
}
