use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{AuditError, Result};

use super::transport::Transport;
use super::types::{AuditResult, BuildOverview, JobOverview, ViewDetail};

/// Decodes a JSON body into one of the server's record shapes.
pub fn decode<T>(resource: &'static str, url: &str, bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|source| AuditError::Decode {
        resource,
        url: url.to_string(),
        source,
    })
}

pub fn root_endpoint(base_url: &str) -> String {
    format!("{base_url}api/json")
}

pub fn job_endpoint(job_url: &str) -> String {
    format!("{job_url}api/json")
}

pub fn build_endpoint(job_url: &str, number: u64) -> String {
    format!("{job_url}{number}/api/json")
}

pub fn view_endpoint(view_url: &str) -> String {
    format!("{view_url}api/json")
}

pub fn config_endpoint(job_url: &str) -> String {
    format!("{job_url}config.xml")
}

/// Typed access to the Jenkins JSON API on top of a [`Transport`].
///
/// Cloning is cheap; clones share the underlying transport.
#[derive(Clone)]
pub struct JenkinsClient {
    transport: Arc<dyn Transport>,
}

impl JenkinsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn fetch<T>(&self, resource: &'static str, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.transport.get(url).await?;
        decode(resource, url, &bytes)
    }

    /// Job and view listing of the whole server.
    pub async fn fetch_root(&self, base_url: &str) -> Result<AuditResult> {
        self.fetch("server listing", &root_endpoint(base_url)).await
    }

    pub async fn fetch_job(&self, job_url: &str) -> Result<JobOverview> {
        self.fetch("job overview", &job_endpoint(job_url)).await
    }

    pub async fn fetch_build(&self, job_url: &str, number: u64) -> Result<BuildOverview> {
        self.fetch("build overview", &build_endpoint(job_url, number))
            .await
    }

    pub async fn fetch_view(&self, view_url: &str) -> Result<ViewDetail> {
        self.fetch("view detail", &view_endpoint(view_url)).await
    }

    /// Raw `config.xml` of a job, returned untouched.
    pub async fn fetch_config(&self, job_url: &str) -> Result<Vec<u8>> {
        self.transport.get(&config_endpoint(job_url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::testing::FakeTransport;

    #[test]
    fn test_endpoints() {
        let job = "http://ci:8080/job/api/";
        assert_eq!(root_endpoint("http://ci:8080/"), "http://ci:8080/api/json");
        assert_eq!(job_endpoint(job), "http://ci:8080/job/api/api/json");
        assert_eq!(build_endpoint(job, 42), "http://ci:8080/job/api/42/api/json");
        assert_eq!(
            view_endpoint("http://ci:8080/view/team/"),
            "http://ci:8080/view/team/api/json"
        );
        assert_eq!(config_endpoint(job), "http://ci:8080/job/api/config.xml");
    }

    #[test]
    fn test_decode_error_names_resource() {
        let err = decode::<JobOverview>("job overview", "http://ci/job/x/api/json", b"<html>")
            .unwrap_err();

        assert!(matches!(err, AuditError::Decode { resource: "job overview", .. }));
        assert!(err.to_string().contains("http://ci/job/x/api/json"));
    }

    #[tokio::test]
    async fn test_fetch_build_uses_build_number() {
        let transport = FakeTransport::new().with_body(
            "http://ci/job/api/7/api/json",
            r#"{"timestamp": 1000, "duration": 20}"#,
        );
        let client = JenkinsClient::new(Arc::new(transport));

        let build = client.fetch_build("http://ci/job/api/", 7).await.unwrap();
        assert_eq!(build.timestamp, 1000);
        assert_eq!(build.duration_millis, 20);
    }

    #[tokio::test]
    async fn test_fetch_config_returns_raw_bytes() {
        let xml = "<?xml version='1.1'?><project/>";
        let transport = FakeTransport::new().with_body("http://ci/job/api/config.xml", xml);
        let client = JenkinsClient::new(Arc::new(transport));

        let bytes = client.fetch_config("http://ci/job/api/").await.unwrap();
        assert_eq!(bytes, xml.as_bytes());
    }
}
