use crate::domain::model::ApiMessage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint} reported failure: {}", ApiMessage::join(.errors))]
    Api {
        endpoint: String,
        errors: Vec<ApiMessage>,
    },

    #[error("No accounts are visible to the API token")]
    NoAccounts,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    HttpStatus,
    Application,
    Logical,
    Configuration,
    Io,
}

impl DeployError {
    /// Timeouts, refused connections and 5xx replies are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeployError::Transport(e) => e.is_timeout() || e.is_connect(),
            DeployError::UnexpectedStatus { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DeployError::Transport(_) => ErrorCategory::Transport,
            DeployError::UnexpectedStatus { .. } => ErrorCategory::HttpStatus,
            DeployError::Api { .. } | DeployError::Serialization(_) => {
                ErrorCategory::Application
            }
            DeployError::NoAccounts => ErrorCategory::Logical,
            DeployError::Config { .. }
            | DeployError::MissingConfig { .. }
            | DeployError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            DeployError::Io(_) => ErrorCategory::Io,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DeployError::Transport(_) => {
                "Check network connectivity to the Cloudflare API and try again"
            }
            DeployError::UnexpectedStatus { status: 401, .. }
            | DeployError::UnexpectedStatus { status: 403, .. } => {
                "Verify CLOUDFLARE_API_TOKEN is valid and has the Account and Pages permissions"
            }
            DeployError::UnexpectedStatus { status, .. } if *status >= 500 => {
                "Cloudflare is having trouble; wait a moment and run again"
            }
            DeployError::UnexpectedStatus { .. } => {
                "Inspect the response body above for the rejected field"
            }
            DeployError::Api { .. } => {
                "Read the API error list above; a name collision or missing GitHub authorization is the usual cause"
            }
            DeployError::NoAccounts => {
                "Make sure the API token is scoped to at least one account"
            }
            DeployError::Serialization(_) => "The API returned a body that is not valid JSON",
            DeployError::Config { .. }
            | DeployError::MissingConfig { .. }
            | DeployError::InvalidConfigValue { .. } => {
                "Fix the configuration file or export the missing environment variable"
            }
            DeployError::Io(_) => "Check that the configuration file exists and is readable",
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
