use crate::domain::model::HttpReply;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Authenticated request/response primitive against the Cloudflare v4 API.
///
/// Paths are relative to the API base URL (for example `/accounts`). Any HTTP
/// status is returned as `Ok`; only transport failures surface as errors.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn get(&self, path: &str) -> Result<HttpReply>;
    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<HttpReply>;
}
