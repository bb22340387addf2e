//! Normalized diagnostics and the two line templates editors parse.

pub mod fields;

pub use fields::Fields;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
/// Severity of a single finding.
pub enum Level {
    Error,
    Warning,
    Info,
}

impl Level {
    /// Map a tool's severity word onto a level. `note` is informational;
    /// anything unrecognized is treated as a warning.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" | "FATAL" => Level::Error,
            "INFO" | "NOTE" => Level::Info,
            _ => Level::Warning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One finding, ready to render.
pub struct Diagnostic {
    pub level: Level,
    pub error_type: String,
    pub error_number: String,
    pub description: String,
    pub filename: String,
    pub line_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic from classified fields. Returns `None` when the
    /// filename or line number is missing.
    pub fn from_fields(fields: &Fields) -> Option<Self> {
        let filename = fields.non_empty("filename")?.to_string();
        let line_number = fields.non_empty("line_number")?.to_string();
        Some(Self {
            level: Level::parse(fields.get("level").unwrap_or_default()),
            error_type: fields.get("error_type").unwrap_or_default().to_string(),
            error_number: fields.get("error_number").unwrap_or_default().to_string(),
            description: fields.get("description").unwrap_or_default().to_string(),
            filename,
            line_number,
            column_number: fields.non_empty("column_number").map(str::to_string),
        })
    }

    /// A line-1 diagnostic attributed to `checker` itself rather than to the
    /// tool's output, e.g. "checker not found".
    pub fn synthesized(level: Level, checker: &str, message: &str, filename: &str) -> Self {
        Self {
            level,
            error_type: String::new(),
            error_number: String::new(),
            description: format!("{}: {}", checker, message),
            filename: filename.to_string(),
            line_number: "1".to_string(),
            column_number: None,
        }
    }

    /// Code as a checker would accept it in an ignore list, e.g. `E501`.
    pub fn code(&self) -> String {
        format!("{}{}", self.error_type, self.error_number)
    }

    /// Render with the column-aware template when a column is present,
    /// the column-less one otherwise.
    pub fn render(&self) -> String {
        match self.column_number.as_deref().filter(|c| !c.is_empty()) {
            Some(col) => format!(
                "{} {}{}:{} at {} line {},{}.",
                self.level,
                self.error_type,
                self.error_number,
                self.description,
                self.filename,
                self.line_number,
                col
            ),
            None => format!(
                "{} {}{}:{} at {} line {}.",
                self.level,
                self.error_type,
                self.error_number,
                self.description,
                self.filename,
                self.line_number
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// Diagnostics produced by one checker, in tool emission order.
pub struct RunOutcome {
    pub checker: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunOutcome {
    pub fn new(checker: impl Into<String>) -> Self {
        Self {
            checker: checker.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn lines(&self) -> Vec<String> {
        self.diagnostics.iter().map(Diagnostic::render).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
/// Aggregated summary used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
/// All checker outcomes in request order.
pub struct Report {
    pub runs: Vec<RunOutcome>,
}

impl Report {
    pub fn total(&self) -> usize {
        self.runs.iter().map(RunOutcome::count).sum()
    }

    /// Every rendered line, grouped by checker in request order.
    pub fn lines(&self) -> Vec<String> {
        self.runs.iter().flat_map(RunOutcome::lines).collect()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            errors: 0,
            warnings: 0,
            infos: 0,
            total: 0,
        };
        for d in self.runs.iter().flat_map(|r| r.diagnostics.iter()) {
            match d.level {
                Level::Error => summary.errors += 1,
                Level::Warning => summary.warnings += 1,
                Level::Info => summary.infos += 1,
            }
            summary.total += 1;
        }
        summary
    }
}
