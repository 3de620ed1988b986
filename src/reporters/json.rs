use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::Report;

/// Outputs the report as JSON. Writes to a file if given, otherwise stdout.
/// Field names are part of the contract with external renderers.
pub fn report_json(report: &Report, output_file: Option<&Path>) -> Result<(), String> {
    match output_file {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to open {} for writing: {e}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_report(report, &mut writer)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            eprintln!("✓ JSON report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_report(report, &mut writer)
                .map_err(|e| format!("Failed to write stdout: {e}"))?;
        }
    }
    Ok(())
}

fn write_report(report: &Report, writer: &mut impl Write) -> Result<(), String> {
    serde_json::to_writer_pretty(&mut *writer, report)
        .map_err(|e| format!("JSON serialization failed: {e}"))?;
    writer.write_all(b"\n").map_err(|e| e.to_string())?;
    Ok(())
}
