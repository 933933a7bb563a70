pub mod check;
pub mod inject;

use anyhow::Result;

use crate::output::OutputManager;
use crate::session::RunReport;

/// Print the closing summary and fail when the report does.
fn conclude(report: &RunReport, deny_warnings: bool, output: &OutputManager) -> Result<()> {
    let summary = format!(
        "{} file(s), {} field(s) injected, {} error(s), {} warning(s)",
        report.files.len(),
        report.injected(),
        report.errors,
        report.warnings
    );

    if report.failed(deny_warnings) {
        output.error(&summary);
        if report.errors == 0 {
            anyhow::bail!("warnings are denied by configuration");
        }
        anyhow::bail!("injection reported {} error(s)", report.errors);
    }

    if report.warnings > 0 {
        output.warning(&summary);
    } else {
        output.success(&summary);
    }
    Ok(())
}
