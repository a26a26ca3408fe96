pub mod release;
pub mod render;

use std::path::PathBuf;

use anyhow::{Context, bail};
use ocdeploy_core::config::TargetOverrides;
use ocdeploy_core::{ConfigError, ReleaseConfig};
use ocdeploy_release::{FailureKind, ReleaseError};
use serde_json::{Map, Value};

/// Exit status for configuration-class failures.
pub const EXIT_CONFIG: u8 = 2;
/// Exit status when the update was submitted but the rollout never finished.
pub const EXIT_TIMEOUT: u8 = 3;

/// What a subcommand needs from the command line.
pub struct Request {
    pub config: PathBuf,
    pub overrides: TargetOverrides,
    pub options: Vec<String>,
}

impl Request {
    /// Load the config file and apply command-line overrides.
    pub fn load(self) -> anyhow::Result<(ReleaseConfig, Map<String, Value>)> {
        let options = parse_options(&self.options)?;
        let config = ReleaseConfig::from_file(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))?
            .with_overrides(self.overrides);
        Ok((config, options))
    }
}

/// Parse repeated `key=value` arguments. Later duplicates win.
pub fn parse_options(raw: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut options = Map::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            bail!(OptionError(format!("expected key=value, got `{item}`")));
        };
        let key = key.trim();
        if key.is_empty() {
            bail!(OptionError(format!("empty key in `{item}`")));
        }
        options.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(options)
}

/// Malformed `-o` argument.
#[derive(Debug)]
pub struct OptionError(String);

impl std::fmt::Display for OptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid option: {}", self.0)
    }
}

impl std::error::Error for OptionError {}

/// Map a failure to the process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(release) = err.downcast_ref::<ReleaseError>() {
        return match release.kind() {
            FailureKind::Configuration => EXIT_CONFIG,
            FailureKind::RolloutTimeout => EXIT_TIMEOUT,
            _ => 1,
        };
    }
    if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<OptionError>().is_some() {
        return EXIT_CONFIG;
    }
    1
}
