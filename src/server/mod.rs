mod client;
mod orchestrator;
#[cfg(test)]
pub(crate) mod testing;
mod transport;
mod types;

pub use client::JenkinsClient;
pub use orchestrator::{
    FetchOrchestrator, DEFAULT_QUEUE_FACTOR, DEFAULT_WORKERS, MAX_QUEUE_FACTOR, MAX_WORKERS,
};
pub use transport::{HttpTransport, DEFAULT_TIMEOUT};
pub use types::{AuditResult, HealthReport, JobOverview};

#[cfg(test)]
pub(crate) use types::{BuildOverview, BuildReference, JobSummary, ViewDetail, ViewSummary};
