use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::server::{AuditResult, HealthReport};

use super::styling::{heading, icon};

/// Table and cell creation helpers
fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn color_coded_score_cell(score: u8) -> Cell {
    let text = format!("{score}/100");
    if score > 80 {
        Cell::new(text).fg(TableColor::Green)
    } else if score >= 40 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

/// Lowest-scoring report of a job.
fn worst_report(reports: &[HealthReport]) -> Option<&HealthReport> {
    reports.iter().min_by_key(|report| report.score)
}

fn build_health_table(result: &AuditResult) -> Table {
    let mut table = create_table();
    table.set_header(
        ["Job", "Status", "Health", "Report"]
            .into_iter()
            .map(|label| Cell::new(label).fg(TableColor::Cyan)),
    );

    for job in &result.jobs {
        let Some(overview) = &job.overview else {
            table.add_row(vec![
                Cell::new(&job.name),
                Cell::new(&job.color),
                Cell::new("-"),
                Cell::new("details unavailable"),
            ]);
            continue;
        };

        match worst_report(&overview.health_reports) {
            Some(report) => table.add_row(vec![
                Cell::new(&job.name),
                Cell::new(&overview.color),
                color_coded_score_cell(report.score),
                Cell::new(&report.description),
            ]),
            None => table.add_row(vec![
                Cell::new(&job.name),
                Cell::new(&overview.color),
                Cell::new("-"),
                Cell::new(""),
            ]),
        };
    }

    table
}

/// Prints one row per job with its health score, for jobs the server scored.
pub fn print_health_table(result: &AuditResult) {
    println!("{} {}", icon("🩺"), heading("Job Health"));
    println!("{}", build_health_table(result));
}
