use std::fmt::{Display, Write};

use crate::audit::Findings;
use crate::server::AuditResult;

use super::styling::{address, done, heading, icon, label, lost, pending};

/// Prints the audit findings to stdout.
///
/// An overview block comes first, then up to four sections in fixed order:
/// jobs outside views, jobs never run, jobs never passed, stale jobs.
/// Empty sections are left out.
pub fn print_summary(server: &str, result: &AuditResult, findings: &Findings, skipped: usize) {
    print!("{}", render_summary(server, result, findings, skipped));
}

fn add_section<T: Display>(output: &mut String, title: &str, items: &[T]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(output, "{}", heading(title));
    for item in items {
        let _ = writeln!(output, "- {item}");
    }
    output.push('\n');
}

fn render_summary(server: &str, result: &AuditResult, findings: &Findings, skipped: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{} {}", icon("📊"), heading("Overview"));
    let _ = writeln!(output, "  {} {}", label("Server:"), address(server));
    let _ = writeln!(output, "  {} {}", label("Jobs:"), pending(result.jobs.len()));
    let _ = writeln!(output, "  {} {}", label("Views:"), pending(result.views.len()));
    if skipped > 0 {
        let _ = writeln!(
            output,
            "  {} {}",
            label("Jobs without details:"),
            lost(skipped)
        );
    }
    let _ = writeln!(
        output,
        "  {} {}",
        label("Audit date:"),
        label(findings.collected_at.format("%Y-%m-%d %H:%M UTC"))
    );
    output.push('\n');

    if findings.is_empty() {
        let _ = writeln!(output, "{}", done("No findings, every job looks healthy."));
        return output;
    }

    add_section(&mut output, "No view specified:", &findings.outside_views);
    add_section(&mut output, "Jobs never run:", &findings.never_run);
    add_section(&mut output, "Jobs never passed:", &findings.never_passed);
    add_section(&mut output, "Stale jobs:", &findings.stale);

    output
}
