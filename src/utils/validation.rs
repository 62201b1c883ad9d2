use crate::utils::error::{DeployError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

// Cloudflare Pages project names: lowercase alphanumerics and dashes, 1-58 chars,
// no dash at either end.
const PROJECT_NAME_PATTERN: &str = r"^[a-z0-9]([a-z0-9-]{0,56}[a-z0-9])?$";
const ENV_VAR_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";
const PLACEHOLDER_PATTERN: &str = r"\$\{([^}]+)\}";

fn project_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PROJECT_NAME_PATTERN).expect("static regex"))
}

fn env_var_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENV_VAR_NAME_PATTERN).expect("static regex"))
}

pub(crate) fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("static regex"))
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DeployError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DeployError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DeployError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeployError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DeployError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_project_name(field_name: &str, name: &str) -> Result<()> {
    if !project_name_regex().is_match(name) {
        return Err(DeployError::InvalidConfigValue {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Use 1-58 lowercase letters, digits or dashes, not starting or ending with a dash"
                .to_string(),
        });
    }
    Ok(())
}

pub fn validate_env_var_name(field_name: &str, name: &str) -> Result<()> {
    if !env_var_name_regex().is_match(name) {
        return Err(DeployError::InvalidConfigValue {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Environment variable names must match [A-Za-z_][A-Za-z0-9_]*".to_string(),
        });
    }
    Ok(())
}

/// Fails on a value that still carries a `${VAR}` placeholder after substitution.
/// The value itself is never echoed since it is usually a secret.
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if let Some(caps) = placeholder_regex().captures(value) {
        return Err(DeployError::MissingConfig {
            field: format!("{} (environment variable {} is not set)", field_name, &caps[1]),
        });
    }
    Ok(())
}
