use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT};
use tracing::{debug, instrument};

use crate::wiki::errors::WikiError;

pub const LATEST_URL: &str = "https://prices.runescape.wiki/api/v1/osrs/latest";
pub const MAPPING_URL: &str = "https://prices.runescape.wiki/api/v1/osrs/mapping";
pub const DEFAULT_USER_AGENT: &str = "RuneLite Sell-Now Plugin";

/// Raw access to the prices wiki. Implementations return the response body
/// only for a 2xx status with a non-empty body.
#[async_trait]
pub trait WikiApi: Send + Sync + 'static {
    /// Body of the latest price snapshot.
    async fn fetch_latest(&self) -> Result<String, WikiError>;

    /// Body of the item id -> name mapping.
    async fn fetch_mapping(&self) -> Result<String, WikiError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WikiEndpoints {
    pub latest_url: String,
    pub mapping_url: String,
    pub user_agent: String,
}

impl Default for WikiEndpoints {
    fn default() -> Self {
        Self {
            latest_url: LATEST_URL.to_string(),
            mapping_url: MAPPING_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct WikiClient {
    http: Client,
    endpoints: WikiEndpoints,
}

impl WikiClient {
    pub fn new(endpoints: WikiEndpoints) -> Result<Self, WikiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, endpoints })
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_body(&self, url: &str) -> Result<String, WikiError> {
        let resp = self
            .http
            .get(url)
            .header(USER_AGENT, &self.endpoints.user_agent)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WikiError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Err(WikiError::EmptyBody);
        }

        debug!(bytes = body.len(), "prices wiki body fetched");

        Ok(body)
    }
}

#[async_trait]
impl WikiApi for WikiClient {
    async fn fetch_latest(&self) -> Result<String, WikiError> {
        self.get_body(&self.endpoints.latest_url).await
    }

    async fn fetch_mapping(&self) -> Result<String, WikiError> {
        self.get_body(&self.endpoints.mapping_url).await
    }
}
