#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::{
    BuildConfig, EnvVarValue, ProjectDescriptor, SourceBinding, SourceConfig,
};
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{self, placeholder_regex, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "pages-deploy.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const TOKEN_ENV_VAR: &str = "CLOUDFLARE_API_TOKEN";

/// Site environment variables injected into the project when nothing else is configured.
pub const DEFAULT_SITE_ENV_VARS: [&str; 3] =
    ["VITE_SUPABASE_URL", "VITE_SUPABASE_KEY", "VITE_FONNTE_TOKEN"];

/// Looks a variable up in the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Replaces every `${NAME}` in `value` using `lookup`. Unknown names are left untouched
/// so validation can report them.
pub fn substitute_env_vars(value: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    placeholder_regex()
        .replace_all(value, |caps: &regex::Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
        })
        .into_owned()
}

/// A string that never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(EnvVarValue::MASK)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub api: ApiSettings,
    pub retry: RetrySettings,
    pub project: ProjectSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: Secret,
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: Secret::new(format!("${{{}}}", TOKEN_ENV_VAR)),
            timeout_seconds: Some(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub name: String,
    pub source: SourceSettings,
    pub build: BuildSettings,
    pub env_vars: BTreeMap<String, Secret>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        let env_vars = DEFAULT_SITE_ENV_VARS
            .iter()
            .map(|name| (name.to_string(), Secret::new(format!("${{{}}}", name))))
            .collect();

        Self {
            name: "moimutapiliet".to_string(),
            source: SourceSettings::default(),
            build: BuildSettings::default(),
            env_vars,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    #[serde(rename = "type")]
    pub kind: String,
    pub owner: String,
    pub repo: String,
    pub production_branch: String,
    pub pr_comments_enabled: bool,
    pub deployments_enabled: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: "github".to_string(),
            owner: "sobatmbahmo".to_string(),
            repo: "moimutapiliet".to_string(),
            production_branch: "main".to_string(),
            pr_comments_enabled: true,
            deployments_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub build_command: String,
    pub destination_dir: String,
    pub root_dir: String,
    pub web_analytics_token: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            build_command: "npm run build".to_string(),
            destination_dir: "dist".to_string(),
            root_dir: String::new(),
            web_analytics_token: String::new(),
        }
    }
}

impl DeployConfig {
    /// Loads `path` when given, otherwise starts from the built-in defaults.
    /// Placeholders are resolved through `lookup` in both cases.
    pub fn load(path: Option<&Path>, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path, lookup),
            None => {
                let mut config = Self::default();
                config.resolve_placeholders(lookup);
                Ok(config)
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(
        path: P,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content, lookup)
    }

    pub fn from_toml_str(content: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(|e| DeployError::Config {
            message: format!("TOML parsing error: {}", e),
        })?;
        config.resolve_placeholders(lookup);
        Ok(config)
    }

    /// Substitutes `${VAR}` in the fields that are meant to come from the environment.
    pub fn resolve_placeholders(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        self.api.base_url = substitute_env_vars(&self.api.base_url, lookup);
        self.api.token = Secret::new(substitute_env_vars(self.api.token.expose(), lookup));
        for value in self.project.env_vars.values_mut() {
            *value = Secret::new(substitute_env_vars(value.expose(), lookup));
        }
    }

    pub fn descriptor(&self) -> ProjectDescriptor {
        ProjectDescriptor::from(&self.project)
    }
}

impl From<&ProjectSettings> for ProjectDescriptor {
    fn from(settings: &ProjectSettings) -> Self {
        let env_vars = settings
            .env_vars
            .iter()
            .map(|(name, value)| (name.clone(), EnvVarValue::new(value.expose())))
            .collect();

        ProjectDescriptor {
            name: settings.name.clone(),
            source: SourceBinding {
                kind: settings.source.kind.clone(),
                config: SourceConfig {
                    owner: settings.source.owner.clone(),
                    repo: settings.source.repo.clone(),
                    production_branch: settings.source.production_branch.clone(),
                    pr_comments_enabled: settings.source.pr_comments_enabled,
                    deployments_enabled: settings.source.deployments_enabled,
                },
            },
            build_config: BuildConfig {
                build_command: settings.build.build_command.clone(),
                destination_dir: settings.build.destination_dir.clone(),
                root_dir: settings.build.root_dir.clone(),
                web_analytics_token: settings.build.web_analytics_token.clone(),
            },
            env_vars,
        }
    }
}

impl Validate for DeployConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_resolved("api.token", self.api.token.expose())?;
        if self.api.token.expose().trim().is_empty() {
            return Err(DeployError::MissingConfig {
                field: format!("api.token (set {})", TOKEN_ENV_VAR),
            });
        }
        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_range("api.timeout_seconds", timeout, 1, 600)?;
        }

        validation::validate_range("retry.max_attempts", self.retry.max_attempts, 1, 10)?;
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(DeployError::InvalidConfigValue {
                field: "retry.base_delay_ms".to_string(),
                value: self.retry.base_delay_ms.to_string(),
                reason: format!(
                    "Must not exceed retry.max_delay_ms ({})",
                    self.retry.max_delay_ms
                ),
            });
        }

        self.project.validate()
    }
}

impl Validate for ProjectSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_project_name("project.name", &self.name)?;
        validation::validate_non_empty_string("project.source.type", &self.source.kind)?;
        validation::validate_non_empty_string("project.source.owner", &self.source.owner)?;
        validation::validate_non_empty_string("project.source.repo", &self.source.repo)?;
        validation::validate_non_empty_string(
            "project.source.production_branch",
            &self.source.production_branch,
        )?;

        for (name, value) in &self.env_vars {
            let field = format!("project.env_vars.{}", name);
            validation::validate_env_var_name(&field, name)?;
            validation::validate_resolved(&field, value.expose())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> {
        env(&[
            ("CLOUDFLARE_API_TOKEN", "cf-token"),
            ("VITE_SUPABASE_URL", "https://example.supabase.co"),
            ("VITE_SUPABASE_KEY", "anon-key"),
            ("VITE_FONNTE_TOKEN", "fonnte"),
        ])
    }

    #[test]
    fn test_default_descriptor_matches_fixed_values() {
        let config = DeployConfig::load(None, &full_env()).unwrap();
        let descriptor = config.descriptor();

        assert_eq!(descriptor.name, "moimutapiliet");
        assert_eq!(descriptor.source.kind, "github");
        assert_eq!(descriptor.source.config.owner, "sobatmbahmo");
        assert_eq!(descriptor.source.config.repo, "moimutapiliet");
        assert_eq!(descriptor.source.config.production_branch, "main");
        assert!(descriptor.source.config.pr_comments_enabled);
        assert!(descriptor.source.config.deployments_enabled);
        assert_eq!(descriptor.build_config.build_command, "npm run build");
        assert_eq!(descriptor.build_config.destination_dir, "dist");
        assert_eq!(descriptor.build_config.root_dir, "");
        assert_eq!(
            descriptor.env_vars["VITE_SUPABASE_URL"].value,
            "https://example.supabase.co"
        );
        assert_eq!(config.api.token.expose(), "cf-token");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_descriptor_wire_shape() {
        let config = DeployConfig::load(None, &full_env()).unwrap();
        let body = serde_json::to_value(config.descriptor()).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "name": "moimutapiliet",
                "source": {
                    "type": "github",
                    "config": {
                        "owner": "sobatmbahmo",
                        "repo": "moimutapiliet",
                        "production_branch": "main",
                        "pr_comments_enabled": true,
                        "deployments_enabled": true
                    }
                },
                "build_config": {
                    "build_command": "npm run build",
                    "destination_dir": "dist",
                    "root_dir": "",
                    "web_analytics_token": ""
                },
                "env_vars": {
                    "VITE_FONNTE_TOKEN": {"value": "fonnte"},
                    "VITE_SUPABASE_KEY": {"value": "anon-key"},
                    "VITE_SUPABASE_URL": {"value": "https://example.supabase.co"}
                }
            })
        );
    }

    #[test]
    fn test_missing_token_fails_validation() {
        let config = DeployConfig::load(
            None,
            &env(&[
                ("VITE_SUPABASE_URL", "u"),
                ("VITE_SUPABASE_KEY", "k"),
                ("VITE_FONNTE_TOKEN", "t"),
            ]),
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, DeployError::MissingConfig { .. }));
        assert!(err.to_string().contains("CLOUDFLARE_API_TOKEN"));
    }

    #[test]
    fn test_missing_site_variable_fails_validation() {
        let config =
            DeployConfig::load(None, &env(&[("CLOUDFLARE_API_TOKEN", "cf-token")])).unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("project.env_vars.VITE_FONNTE_TOKEN"));
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let toml_content = r#"
[api]
token = "${CF_TOKEN}"

[retry]
max_attempts = 5

[project]
name = "docs-site"

[project.source]
owner = "acme"
repo = "docs"

[project.env_vars]
PUBLIC_API = "https://api.acme.dev"
SECRET_KEY = "${ACME_KEY}"
"#;

        let config = DeployConfig::from_toml_str(
            toml_content,
            &env(&[("CF_TOKEN", "from-env"), ("ACME_KEY", "k-123")]),
        )
        .unwrap();

        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api.token.expose(), "from-env");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert_eq!(config.project.name, "docs-site");
        assert_eq!(config.project.source.production_branch, "main");
        assert_eq!(config.project.build.destination_dir, "dist");
        assert_eq!(config.project.env_vars.len(), 2);
        assert_eq!(config.project.env_vars["SECRET_KEY"].expose(), "k-123");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_project_name_is_rejected() {
        let toml_content = r#"
[api]
token = "t"

[project]
name = "My_Site"
env_vars = {}
"#;
        let config = DeployConfig::from_toml_str(toml_content, &env(&[])).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, DeployError::InvalidConfigValue { ref field, .. } if field == "project.name"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = DeployConfig::from_toml_str("[api\ntoken =", &env(&[])).unwrap_err();
        assert!(matches!(err, DeployError::Config { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[api]
base_url = "http://127.0.0.1:9999"
token = "file-token"
timeout_seconds = 5

[project.env_vars]
"#,
            )
            .unwrap();

        let config = DeployConfig::load(Some(temp_file.path()), &env(&[])).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.api.timeout_seconds, Some(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DeployConfig::load(Some(Path::new("/nonexistent/pages-deploy.toml")), &env(&[]))
            .unwrap_err();
        assert!(matches!(err, DeployError::Io(_)));
    }

    #[test]
    fn test_secret_debug_is_masked() {
        let config = DeployConfig::load(None, &full_env()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("cf-token"));
        assert!(!rendered.contains("anon-key"));
    }

    #[test]
    fn test_substitute_leaves_unknown_placeholders() {
        let lookup = env(&[("A", "1")]);
        assert_eq!(substitute_env_vars("${A}-${B}", &lookup), "1-${B}");
    }
}
