use anyhow::Result;
use std::io::Write;

use crate::audit::Findings;
use crate::config::OutputFormat;

/// Exports audit findings in a machine-readable format.
///
/// - JSON: the findings record, optionally pretty-printed
/// - CSV: one `section,job,days` row per finding
pub fn export_findings(
    findings: &Findings,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            // Summary format is handled separately in cli.rs
            unreachable!("Summary format should be handled in CLI")
        }
        OutputFormat::Json => export_json(findings, pretty, output),
        OutputFormat::Csv => export_csv(findings, output),
    }
}

fn export_json(findings: &Findings, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(findings)?
    } else {
        serde_json::to_string(findings)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

fn export_csv(findings: &Findings, output: &mut dyn Write) -> Result<()> {
    writeln!(output, "Section,Job,Days Since Last Build")?;

    let plain = [
        ("outside_views", &findings.outside_views),
        ("never_run", &findings.never_run),
        ("never_passed", &findings.never_passed),
    ];
    for (section, jobs) in plain {
        for job in jobs {
            writeln!(output, "{section},{},", csv_field(job))?;
        }
    }

    for stale in &findings.stale {
        writeln!(output, "stale,{},{}", csv_field(&stale.name), stale.days)?;
    }

    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
