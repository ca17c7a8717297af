mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::export_findings;
pub use progress::PhaseProgress;
pub use summary::print_summary;
pub use tables::print_health_table;

use styling::{brand, label};

/// Prints the ci-audit banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        brand("🔍 ci-audit"),
        label(env!("CARGO_PKG_VERSION")),
        label("Jenkins job inventory audit")
    );
}
