use std::path::Path;

use log::{info, warn};

use crate::audit::ALL_VIEW;
use crate::server::{AuditResult, JenkinsClient};

/// Outcome counts of a save run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub failed: usize,
}

/// Downloads `config.xml` of every job in every curated view and writes it to
/// `{dir}/{view}/{job}.xml`.
///
/// Runs sequentially. A folder, download, or write failure is logged and
/// counted; the remaining jobs are still saved.
pub async fn save_job_configs(
    client: &JenkinsClient,
    result: &AuditResult,
    dir: &Path,
) -> SaveSummary {
    let mut summary = SaveSummary::default();

    for view in &result.views {
        if view.name.eq_ignore_ascii_case(ALL_VIEW) {
            continue;
        }
        let Some(detail) = &view.detail else {
            continue;
        };

        info!("Working on view: {}", view.name);

        let folder = dir.join(&view.name);
        if let Err(e) = tokio::fs::create_dir_all(&folder).await {
            warn!("Cannot create folder {}: {e}", folder.display());
            summary.failed += detail.jobs.len();
            continue;
        }

        for job in &detail.jobs {
            let path = folder.join(format!("{}.xml", job.name));

            let bytes = match client.fetch_config(&job.url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Cannot download configuration of {}: {e}", job.name);
                    summary.failed += 1;
                    continue;
                }
            };

            match tokio::fs::write(&path, bytes).await {
                Ok(()) => {
                    info!("Saved: {}", path.display());
                    summary.saved += 1;
                }
                Err(e) => {
                    warn!("Cannot write {}: {e}", path.display());
                    summary.failed += 1;
                }
            }
        }
    }

    summary
}
