use crate::config::ApiSettings;
use crate::core::retry::RetryPolicy;
use crate::domain::model::HttpReply;
use crate::domain::ports::ApiTransport;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed [`ApiTransport`] for the Cloudflare v4 API.
pub struct CloudflareClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CloudflareClient {
    pub fn new(settings: &ApiSettings, retry: RetryPolicy) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.token.expose()))
            .map_err(|_| DeployError::InvalidConfigValue {
                field: "api.token".to_string(),
                value: "<redacted>".to_string(),
                reason: "Token contains characters that are not valid in an HTTP header"
                    .to_string(),
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT);
        if let Some(timeout) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpReply> {
        tracing::debug!(%method, path, "Sending Cloudflare API request");

        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(%method, path, status, "Cloudflare API replied");
        Ok(HttpReply { status, body })
    }
}

#[async_trait]
impl ApiTransport for CloudflareClient {
    async fn get(&self, path: &str) -> Result<HttpReply> {
        self.retry
            .execute(path, || self.send_once(Method::GET, path, None))
            .await
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<HttpReply> {
        self.retry
            .execute(path, || self.send_once(Method::POST, path, Some(body)))
            .await
    }
}
