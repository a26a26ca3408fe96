//! ocdeploy.toml configuration parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    pub source: SourceConfig,
    pub platform: PlatformConfig,
    #[serde(default)]
    pub rollout: RolloutConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub variables: VariablesConfig,
}

/// Where the deployment template and variable files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub repository_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Variables directory, relative to the target directory.
    #[serde(default = "default_variables_dir")]
    pub variables_dir: String,
    /// Deployment template name without its extension.
    #[serde(default = "default_deployment_file")]
    pub deployment_file: String,
    /// Parent of the per-release working directory (system temp dir if unset).
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub server_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Bearer token. When set, username/password are ignored.
    pub token: Option<String>,
    #[serde(default = "default_network_timeout")]
    pub network_timeout_secs: u64,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub service: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Directory inside the repository holding the deployment files.
    #[serde(default)]
    pub directory: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariablesConfig {
    /// Keys that must resolve in at least one variable layer.
    #[serde(default)]
    pub required: Vec<String>,
}

/// Job-level values supplied per invocation, taking precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct TargetOverrides {
    pub project: Option<String>,
    pub service: Option<String>,
    pub environment: Option<String>,
    pub directory: Option<String>,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_variables_dir() -> String {
    "vars".to_string()
}

fn default_deployment_file() -> String {
    "Deployment".to_string()
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_network_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    120
}

fn default_interval() -> u64 {
    5
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            service: String::new(),
            environment: default_environment(),
            directory: String::new(),
        }
    }
}

impl RolloutConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl PlatformConfig {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }
}

impl ReleaseConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply job-level overrides, consuming `self`.
    pub fn with_overrides(mut self, overrides: TargetOverrides) -> Self {
        if let Some(project) = overrides.project {
            self.target.project = project;
        }
        if let Some(service) = overrides.service {
            self.target.service = service;
        }
        if let Some(environment) = overrides.environment {
            self.target.environment = environment;
        }
        if let Some(directory) = overrides.directory {
            self.target.directory = directory;
        }
        self
    }

    /// Check every mandatory value, reporting the first one missing.
    pub fn validate(&self) -> ConfigResult<()> {
        let required: [(&'static str, &str); 11] = [
            ("source.repository_url", &self.source.repository_url),
            ("source.branch", &self.source.branch),
            ("source.username", &self.source.username),
            ("source.password", &self.source.password),
            ("source.deployment_file", &self.source.deployment_file),
            ("platform.server_url", &self.platform.server_url),
            ("platform.api_version", &self.platform.api_version),
            ("target.project", &self.target.project),
            ("target.service", &self.target.service),
            ("target.environment", &self.target.environment),
            ("target.directory", &self.target.directory),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(field));
            }
        }

        let has_token = self.platform.token.as_deref().is_some_and(|t| !t.is_empty());
        let has_basic = self.platform.username.is_some() && self.platform.password.is_some();
        if !has_token && !has_basic {
            return Err(ConfigError::Missing(
                "platform.token or platform.username/platform.password",
            ));
        }

        if !self.platform.server_url.starts_with("http://")
            && !self.platform.server_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid {
                field: "platform.server_url",
                reason: format!("expected an http(s) URL, got `{}`", self.platform.server_url),
            });
        }

        Ok(())
    }

    /// The first variable layer: host configuration exposed to templates,
    /// also reachable as `rundeck.plugin.*`.
    ///
    /// Key names match the ones existing release templates reference.
    /// Secrets are never exposed.
    pub fn plugin_variables(&self) -> Map<String, Value> {
        let mut vars = Map::new();
        let mut put = |key: &str, value: &str| {
            vars.insert(key.to_string(), Value::String(value.to_string()));
        };
        put("gitlab_repo", &self.source.repository_url);
        put("gitlab_branch", &self.source.branch);
        put("gitlab_username", &self.source.username);
        put("gitlab_deployment_file", &self.source.deployment_file);
        put("gitlab_variable_file", &self.target.environment);
        put("gitlab_directory", &self.target.directory);
        put("openshift_server", &self.platform.server_url);
        put("openshift_apiversion", &self.platform.api_version);
        put("openshift_project", &self.target.project);
        put("openshift_service", &self.target.service);
        if let Some(username) = &self.platform.username {
            put("openshift_username", username);
        }
        vars
    }

    /// Parent directory for the per-release working checkout.
    pub fn work_root(&self) -> PathBuf {
        self.source
            .work_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[source]
repository_url = "https://git.example.com/ops/deploy.git"
username = "deployer"
password = "s3cret"

[platform]
server_url = "https://openshift.example.com:8443"
token = "abc"

[target]
project = "shop"
service = "checkout"
directory = "checkout"
"#;

    #[test]
    fn test_parse_minimal_applies_defaults() {
        let config = ReleaseConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.source.branch, "master");
        assert_eq!(config.source.variables_dir, "vars");
        assert_eq!(config.source.deployment_file, "Deployment");
        assert_eq!(config.platform.api_version, "v1");
        assert_eq!(config.platform.network_timeout_secs, 30);
        assert_eq!(config.rollout.max_attempts, 120);
        assert_eq!(config.rollout.interval(), Duration::from_secs(5));
        assert_eq!(config.target.environment, "development");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_repository_is_reported() {
        let toml_str = MINIMAL.replace(
            "repository_url = \"https://git.example.com/ops/deploy.git\"",
            "",
        );
        let config = ReleaseConfig::parse(&toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("source.repository_url"))
        ));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let toml_str = MINIMAL.replace("token = \"abc\"", "");
        let config = ReleaseConfig::parse(&toml_str).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_basic_credentials_accepted() {
        let toml_str = MINIMAL.replace(
            "token = \"abc\"",
            "username = \"admin\"\npassword = \"pw\"",
        );
        let config = ReleaseConfig::parse(&toml_str).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_half_basic_credentials_rejected() {
        for half in ["username = \"admin\"", "password = \"pw\""] {
            let toml_str = MINIMAL.replace("token = \"abc\"", half);
            let config = ReleaseConfig::parse(&toml_str).unwrap();
            assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
        }
    }

    #[test]
    fn test_server_url_must_be_http() {
        let toml_str = MINIMAL.replace("https://openshift.example.com:8443", "openshift:8443");
        let config = ReleaseConfig::parse(&toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "platform.server_url", .. })
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = ReleaseConfig::parse(MINIMAL).unwrap().with_overrides(TargetOverrides {
            service: Some("payments".to_string()),
            environment: Some("production".to_string()),
            ..Default::default()
        });
        assert_eq!(config.target.project, "shop");
        assert_eq!(config.target.service, "payments");
        assert_eq!(config.target.environment, "production");
    }

    #[test]
    fn test_target_can_come_from_overrides_only() {
        let toml_str = MINIMAL.replace(
            "[target]\nproject = \"shop\"\nservice = \"checkout\"\ndirectory = \"checkout\"\n",
            "",
        );
        let config = ReleaseConfig::parse(&toml_str).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("target.project"))));

        let config = config.with_overrides(TargetOverrides {
            project: Some("shop".to_string()),
            service: Some("checkout".to_string()),
            directory: Some("checkout".to_string()),
            environment: None,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_plugin_variables_hide_secrets() {
        let config = ReleaseConfig::parse(MINIMAL).unwrap();
        let vars = config.plugin_variables();
        assert_eq!(vars["openshift_project"], "shop");
        assert_eq!(vars["openshift_service"], "checkout");
        assert_eq!(vars["gitlab_username"], "deployer");
        assert_eq!(vars["gitlab_branch"], "master");
        assert!(vars.values().all(|v| v != "s3cret" && v != "abc"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ocdeploy.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let config = ReleaseConfig::from_file(&path).unwrap();
        assert_eq!(config.target.service, "checkout");

        let missing = ReleaseConfig::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
