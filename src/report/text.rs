//! Plain-text report

use crate::error::Result;
use crate::report::Report;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Renders the report.
///
/// One `Responses with Status Code: <code>` block per status, one line per
/// outcome, each block followed by a blank line. The method prefix is only
/// written when more than one method was probed.
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    for (status, outcomes) in report.groups() {
        let _ = writeln!(out, "Responses with Status Code: {status}");
        for outcome in outcomes {
            if report.show_method() {
                let _ = write!(out, "{} ", outcome.method);
            }
            let _ = writeln!(out, "{} => Length: {}", outcome.url, outcome.length);
        }
        out.push('\n');
    }

    out
}

/// Writes the text report to a file
pub fn export(report: &Report, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, render(report))?;
    info!("Text report saved to {}", output_path.display());
    Ok(())
}
