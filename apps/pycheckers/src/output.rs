//! Output rendering for a checker report.
//!
//! Supports `human` (default) and `json` outputs. Human output is exactly
//! one diagnostic line per finding, which editors parse, so it carries no
//! colors or summary. The JSON form groups diagnostics by checker and adds
//! a top-level summary.

use crate::models::Report;
use serde_json::json;
use serde_json::Value as JsonVal;

/// Print the report in the requested format.
pub fn print_report(report: &Report, output: &str) {
    match output {
        "json" => println!("{:#}", compose_report_json(report)),
        _ => {
            for line in report.lines() {
                println!("{}", line);
            }
        }
    }
}

/// Compose the report JSON object (pure) for testing purposes.
pub fn compose_report_json(report: &Report) -> JsonVal {
    let runs: Vec<_> = report
        .runs
        .iter()
        .map(|run| {
            let diagnostics: Vec<_> = run
                .diagnostics
                .iter()
                .map(|d| {
                    let mut item = serde_json::to_value(d).unwrap_or(JsonVal::Null);
                    if let JsonVal::Object(map) = &mut item {
                        map.insert("line".into(), JsonVal::String(d.render()));
                    }
                    item
                })
                .collect();
            json!({
                "checker": run.checker,
                "count": run.count(),
                "diagnostics": diagnostics,
            })
        })
        .collect();
    json!({"runs": runs, "summary": report.summary()})
}
