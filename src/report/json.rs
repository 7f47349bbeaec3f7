//! JSON report export

use crate::error::Result;
use crate::models::ProbeOutcome;
use crate::report::Report;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct JsonReport<'a> {
    total: usize,
    groups: Vec<JsonGroup<'a>>,
}

#[derive(Serialize)]
struct JsonGroup<'a> {
    status: u16,
    outcomes: &'a [ProbeOutcome],
}

/// Serializes the report; groups and outcomes keep report order
pub fn render(report: &Report) -> Result<String> {
    let doc = JsonReport {
        total: report.total(),
        groups: report
            .groups()
            .map(|(status, outcomes)| JsonGroup { status, outcomes })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Exports the report as a JSON file
pub fn export(report: &Report, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, render(report)?)?;
    info!("JSON report saved to {}", output_path.display());
    Ok(())
}
