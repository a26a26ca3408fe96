//! Template and variable file resolution.

use std::path::{Path, PathBuf};

use ocdeploy_core::ReleaseConfig;
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Extensions tried, in order. The first existing candidate wins.
pub const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Names that locate release files inside a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    /// Directory inside the checkout holding the deployment files.
    pub directory: String,
    /// Variables directory, relative to `directory`.
    pub variables_dir: String,
    /// Deployment template name without extension.
    pub deployment_file: String,
    /// Environment name, used as the variable file name.
    pub environment: String,
}

/// Resolved paths for a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSources {
    pub deployment: PathBuf,
    pub variables: Option<PathBuf>,
}

impl SourceLayout {
    pub fn from_config(config: &ReleaseConfig) -> Self {
        Self {
            directory: config.target.directory.clone(),
            variables_dir: config.source.variables_dir.clone(),
            deployment_file: config.source.deployment_file.clone(),
            environment: config.target.environment.clone(),
        }
    }

    pub fn deployment_candidates(&self, checkout: &Path) -> Vec<PathBuf> {
        candidates(&checkout.join(&self.directory), &self.deployment_file)
    }

    pub fn variable_candidates(&self, checkout: &Path) -> Vec<PathBuf> {
        let dir = checkout.join(&self.directory).join(&self.variables_dir);
        candidates(&dir, &self.environment)
    }

    /// Locate the deployment template and, if present, the variable file.
    pub fn locate(&self, checkout: &Path) -> RenderResult<TemplateSources> {
        let variables = resolve_first(&self.variable_candidates(checkout)).cloned();
        if variables.is_none() {
            debug!(environment = %self.environment, "no variable file for environment");
        }

        let attempted = self.deployment_candidates(checkout);
        let deployment = resolve_first(&attempted)
            .cloned()
            .ok_or(RenderError::TemplateNotFound { attempted })?;

        debug!(deployment = %deployment.display(), "resolved deployment template");
        Ok(TemplateSources {
            deployment,
            variables,
        })
    }
}

fn candidates(dir: &Path, stem: &str) -> Vec<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .collect()
}

/// Return the first candidate that exists as a file.
pub fn resolve_first(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates.iter().find(|p| p.is_file())
}
