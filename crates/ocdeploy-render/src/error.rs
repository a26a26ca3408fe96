//! Renderer error types.

use std::path::PathBuf;

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// Malformed or missing release artifacts.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("none of the deployment templates exist: {}", display_paths(.attempted))]
    TemplateNotFound { attempted: Vec<PathBuf> },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("template rendering failed: {0}")]
    Render(String),

    #[error("rendered descriptor is not valid: {0}")]
    DescriptorParse(String),

    #[error("variable file {path} is not valid YAML: {reason}")]
    VariablesParse { path: PathBuf, reason: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
