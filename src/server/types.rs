use serde::{Deserialize, Deserializer, Serialize};

/// Jenkins sends `null` for builds that do not exist; treat it like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Root of the audited object graph.
///
/// Decoded from `{base}api/json`, then enriched in place by the orchestrator:
/// each job gains its overview, each view its membership detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<JobSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: Vec<ViewSummary>,
}

/// A job as listed by the server's top-level index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    /// Filled in by the job enrichment stage
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub overview: Option<JobOverview>,
}

/// Per-job detail from `{jobUrl}api/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOverview {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_build: BuildReference,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_successful_build: BuildReference,
    #[serde(
        rename = "healthReport",
        default,
        deserialize_with = "null_as_default"
    )]
    pub health_reports: Vec<HealthReport>,
}

impl JobOverview {
    /// Timestamp of the last build in epoch millis, or 0 when unknown.
    pub fn last_build_timestamp(&self) -> i64 {
        self.last_build
            .overview
            .as_ref()
            .map_or(0, |build| build.timestamp)
    }
}

/// Pointer to a build. `number == 0` means the build does not exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReference {
    #[serde(default)]
    pub number: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Only ever set when `number > 0`
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub overview: Option<BuildOverview>,
}

impl BuildReference {
    pub fn exists(&self) -> bool {
        self.number > 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOverview {
    /// Build start, epoch millis
    #[serde(default)]
    pub timestamp: i64,
    /// Build duration in millis
    #[serde(rename = "duration", default)]
    pub duration_millis: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub score: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// A view as listed by the server's top-level index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default)]
    pub url: String,
    /// Filled in by the view enrichment stage
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ViewDetail>,
}

/// Membership of one view, from `{viewUrl}api/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<JobSummary>,
}
