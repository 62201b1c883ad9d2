use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reads an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A Cloudflare account visible to the API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Entry of the `errors` / `messages` arrays in a Cloudflare response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

impl ApiMessage {
    pub fn join(messages: &[ApiMessage]) -> String {
        if messages.is_empty() {
            return "no error details returned".to_string();
        }
        messages
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// The `{success, result, errors, messages}` wrapper every v4 endpoint returns.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<ApiMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ApiMessage>,
}

/// Raw outcome of one HTTP exchange. Interpretation is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    pub fn envelope<T: DeserializeOwned>(&self) -> serde_json::Result<ApiEnvelope<T>> {
        serde_json::from_str(&self.body)
    }
}

/// Request body for `POST /accounts/{id}/pages/projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub name: String,
    pub source: SourceBinding,
    pub build_config: BuildConfig,
    pub env_vars: BTreeMap<String, EnvVarValue>,
}

impl ProjectDescriptor {
    /// Copy with every environment variable value masked, for display.
    pub fn redacted(&self) -> Self {
        let env_vars = self
            .env_vars
            .keys()
            .map(|name| (name.clone(), EnvVarValue::new(EnvVarValue::MASK)))
            .collect();
        Self {
            env_vars,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBinding {
    #[serde(rename = "type")]
    pub kind: String,
    pub config: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub owner: String,
    pub repo: String,
    pub production_branch: String,
    pub pr_comments_enabled: bool,
    pub deployments_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub build_command: String,
    pub destination_dir: String,
    pub root_dir: String,
    pub web_analytics_token: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVarValue {
    pub value: String,
}

impl EnvVarValue {
    pub const MASK: &'static str = "********";

    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

// Values are secrets; keep them out of logs.
impl fmt::Debug for EnvVarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarValue")
            .field("value", &Self::MASK)
            .finish()
    }
}

/// The project as echoed back by the service. Only the reported fields are modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub deployment_configs: Option<DeploymentConfigs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfigs {
    #[serde(default)]
    pub production: Option<DeploymentConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub environment: Option<String>,
}

impl Project {
    pub fn production_environment(&self) -> Option<&str> {
        self.deployment_configs
            .as_ref()?
            .production
            .as_ref()?
            .environment
            .as_deref()
    }
}
