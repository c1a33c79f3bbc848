use std::time::Duration;

use serde::Deserialize;

use crate::LinkError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct HealthReport {
    pub status: String,
    pub sessions: u64,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[async_trait::async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> Result<HealthReport, LinkError>;
}

/// Queries the backend's `GET /health` endpoint.
#[derive(Debug, Clone)]
pub struct ReqwestHealthProbe {
    endpoint: url::Url,
    timeout: Duration,
}

impl ReqwestHealthProbe {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, LinkError> {
        let endpoint = url::Url::parse(server_url)?.join("/health")?;
        Ok(Self { endpoint, timeout })
    }
}

#[async_trait::async_trait]
impl HealthProbe for ReqwestHealthProbe {
    async fn probe(&self) -> Result<HealthReport, LinkError> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::HttpStatus(status.as_u16()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
