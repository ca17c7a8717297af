use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode {resource} from {url}: {source}")]
    Decode {
        resource: &'static str,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Worker pool failure: {0}")]
    WorkerPool(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
