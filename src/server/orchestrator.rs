use std::sync::Arc;

use indicatif::ProgressBar;
use log::{debug, info, warn};
use tokio::sync::{mpsc, Mutex};

use crate::error::{AuditError, Result};

use super::client::JenkinsClient;
use super::types::{AuditResult, JobOverview, JobSummary, ViewSummary};

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_QUEUE_FACTOR: usize = 3;
pub const MAX_WORKERS: usize = 64;
pub const MAX_QUEUE_FACTOR: usize = 16;

/// One unit of job enrichment. `index` is the job's slot in the root listing.
struct JobFetch {
    index: usize,
    name: String,
    url: String,
}

/// Outcome of one unit, reported back to the orchestrator by a worker.
struct JobEnrichment {
    index: usize,
    name: String,
    outcome: Result<JobOverview>,
}

/// Drives retrieval of the whole server graph.
///
/// Three stages, run in order by the caller:
/// 1. [`fetch_root`](Self::fetch_root) lists every job and view (fatal on failure)
/// 2. [`enrich_jobs`](Self::enrich_jobs) fans out over a bounded worker pool;
///    a job that cannot be fetched is logged and skipped
/// 3. [`enrich_views`](Self::enrich_views) walks the views one by one (fatal on failure)
pub struct FetchOrchestrator {
    client: JenkinsClient,
    workers: usize,
    queue_capacity: usize,
}

impl FetchOrchestrator {
    /// Creates an orchestrator with `workers` concurrent job fetchers and a
    /// work queue holding `workers * queue_factor` pending jobs. Both are
    /// clamped to `1..=MAX_WORKERS` and `1..=MAX_QUEUE_FACTOR`.
    pub fn new(client: JenkinsClient, workers: usize, queue_factor: usize) -> Self {
        let workers = workers.clamp(1, MAX_WORKERS);
        Self {
            client,
            workers,
            queue_capacity: workers * queue_factor.clamp(1, MAX_QUEUE_FACTOR),
        }
    }

    pub async fn fetch_root(&self, base_url: &str) -> Result<AuditResult> {
        let root = self.client.fetch_root(base_url).await?;
        info!(
            "Server lists {} jobs and {} views",
            root.jobs.len(),
            root.views.len()
        );
        Ok(root)
    }

    /// Attaches an overview (and its last build) to every job it can.
    ///
    /// Jobs are queued in listing order; producers wait whenever the queue is
    /// full. Every worker drains until the queue closes, whatever the outcome
    /// of individual jobs. Each overview lands in the slot its job was queued
    /// from, so the slice keeps its order regardless of completion order.
    ///
    /// Returns how many jobs were left without an overview.
    ///
    /// # Errors
    ///
    /// Only fails if a worker task dies; per-job fetch failures are logged.
    pub async fn enrich_jobs(
        &self,
        jobs: &mut [JobSummary],
        progress: &ProgressBar,
    ) -> Result<usize> {
        info!(
            "Enriching {} jobs with {} workers (queue capacity {})",
            jobs.len(),
            self.workers,
            self.queue_capacity
        );

        let (tx, rx) = mpsc::channel::<JobFetch>(self.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let handles: Vec<_> = (0..self.workers)
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let client = self.client.clone();
                let progress = progress.clone();

                tokio::spawn(async move {
                    let mut finished = Vec::new();
                    loop {
                        let next = rx.lock().await.recv().await;
                        let Some(work) = next else {
                            break;
                        };

                        debug!("Worker {worker} picked up job {}", work.name);
                        let outcome = enrich_job(&client, &work).await;
                        progress.inc(1);

                        finished.push(JobEnrichment {
                            index: work.index,
                            name: work.name,
                            outcome,
                        });
                    }
                    finished
                })
            })
            .collect();

        let units = jobs
            .iter()
            .enumerate()
            .map(|(index, job)| JobFetch {
                index,
                name: job.name.clone(),
                url: job.url.clone(),
            })
            .collect();
        feed(tx, units).await?;

        let mut skipped = 0;
        for joined in futures::future::join_all(handles).await {
            let finished = joined.map_err(|e| AuditError::WorkerPool(e.to_string()))?;

            for enrichment in finished {
                match enrichment.outcome {
                    Ok(overview) => jobs[enrichment.index].overview = Some(overview),
                    Err(e) => {
                        warn!("Skipping job {}: {e}", enrichment.name);
                        skipped += 1;
                    }
                }
            }
        }

        info!(
            "Enriched {} of {} jobs",
            jobs.len() - skipped,
            jobs.len()
        );

        Ok(skipped)
    }

    /// Attaches membership detail to every view, strictly one after another.
    ///
    /// # Errors
    ///
    /// The first view that cannot be fetched or decoded aborts the run.
    pub async fn enrich_views(&self, views: &mut [ViewSummary]) -> Result<()> {
        for view in views.iter_mut() {
            let detail = self.client.fetch_view(&view.url).await?;
            debug!("View {} holds {} jobs", view.name, detail.jobs.len());
            view.detail = Some(detail);
        }

        info!("Fetched membership of {} views", views.len());
        Ok(())
    }
}

/// Queues every unit in order, waiting whenever the queue is full. The queue
/// closes when `tx` drops at the end.
async fn feed(tx: mpsc::Sender<JobFetch>, units: Vec<JobFetch>) -> Result<()> {
    for work in units {
        if tx.send(work).await.is_err() {
            return Err(AuditError::WorkerPool(
                "every worker exited before the queue was drained".to_string(),
            ));
        }
    }
    Ok(())
}

async fn enrich_job(client: &JenkinsClient, job: &JobFetch) -> Result<JobOverview> {
    let mut overview = client.fetch_job(&job.url).await?;

    if overview.last_build.exists() {
        let number = overview.last_build.number;
        match client.fetch_build(&job.url, number).await {
            Ok(build) => overview.last_build.overview = Some(build),
            Err(e) => warn!("Build #{number} of job {} unavailable: {e}", job.name),
        }
    }

    Ok(overview)
}
