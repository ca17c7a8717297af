use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{done, heading, icon, pending};

/// Progress tracking for the three fetch phases
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_phase_1() -> Self {
        eprintln!("{}  {}", icon("⚙️"), heading("Phases"));
        let pb = create_spinner(pending("Phase 1/3: Fetching job and view listing").to_string());
        Self { pb }
    }

    pub fn finish_phase_1_start_phase_2(self, job_count: usize) -> Self {
        self.pb.finish_with_message(
            done(format!("Phase 1/3: Listed {job_count} jobs ✓")).to_string(),
        );
        let pb = create_bar(
            job_count as u64,
            pending("Phase 2/3: Fetching job details").to_string(),
        );
        Self { pb }
    }

    pub fn finish_phase_2_start_phase_3(self, skipped: usize) -> Self {
        let message = if skipped == 0 {
            done("Phase 2/3: Fetched all job details ✓").to_string()
        } else {
            pending(format!("Phase 2/3: Fetched job details, {skipped} skipped")).to_string()
        };
        self.pb.finish_with_message(message);
        let pb = create_spinner(pending("Phase 3/3: Fetching view membership").to_string());
        Self { pb }
    }

    pub fn finish_phase_3(self) {
        self.pb
            .finish_with_message(done("Phase 3/3: Fetched view membership ✓").to_string());
        eprintln!();
    }

    /// Handle for the active phase, ticked once per finished job in phase 2.
    pub fn bar(&self) -> &ProgressBar {
        &self.pb
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn create_bar(len: u64, message: String) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {msg} [{bar:30}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message(message);
    pb
}
