//! Unified release error and its failure classes.

use std::path::PathBuf;

use ocdeploy_client::ClientError;
use ocdeploy_core::ConfigError;
use ocdeploy_render::RenderError;
use ocdeploy_rollout::RolloutError;
use thiserror::Error;

pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Failure class of a [`ReleaseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Configuration,
    TemplateNotFound,
    DescriptorParse,
    Render,
    ProjectNotFound,
    ServiceNotFound,
    InconsistentState,
    Submission,
    RolloutTimeout,
    PlatformUnavailable,
    Source,
    Client,
    Cancelled,
}

/// Everything that can end a release.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("configuration failed: {0}")]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Artifact(#[from] RenderError),

    #[error("project `{0}` does not exist, or access is forbidden")]
    ProjectNotFound(String),

    #[error("unable to find service {project}/{service}")]
    ServiceNotFound { project: String, service: String },

    #[error("inconsistent platform state: {0}")]
    InconsistentState(String),

    #[error("update submission failed: {0}")]
    Submission(ClientError),

    #[error("platform status check returned {0}")]
    PlatformUnavailable(u16),

    #[error("failed to retrieve release source: {0}")]
    Source(String),

    #[error("failed to prepare working directory {path}: {source}")]
    Workspace {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("platform request failed: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Rollout(#[from] RolloutError),
}

impl ReleaseError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReleaseError::Configuration(_) => FailureKind::Configuration,
            ReleaseError::Artifact(e) => match e {
                RenderError::TemplateNotFound { .. } => FailureKind::TemplateNotFound,
                RenderError::Render(_) => FailureKind::Render,
                RenderError::DescriptorParse(_)
                | RenderError::VariablesParse { .. }
                | RenderError::Io { .. } => FailureKind::DescriptorParse,
            },
            ReleaseError::ProjectNotFound(_) => FailureKind::ProjectNotFound,
            ReleaseError::ServiceNotFound { .. } => FailureKind::ServiceNotFound,
            ReleaseError::InconsistentState(_) => FailureKind::InconsistentState,
            ReleaseError::Submission(_) => FailureKind::Submission,
            ReleaseError::PlatformUnavailable(_) => FailureKind::PlatformUnavailable,
            ReleaseError::Source(_) | ReleaseError::Workspace { .. } => FailureKind::Source,
            ReleaseError::Client(ClientError::Config(_)) => FailureKind::Configuration,
            ReleaseError::Client(_) => FailureKind::Client,
            ReleaseError::Rollout(RolloutError::TimedOut { .. }) => FailureKind::RolloutTimeout,
            ReleaseError::Rollout(RolloutError::Cancelled { .. }) => FailureKind::Cancelled,
        }
    }

    /// The rollout was submitted but never became ready; may need manual follow-up.
    pub fn is_timeout(&self) -> bool {
        self.kind() == FailureKind::RolloutTimeout
    }

    /// Failures caused by host input rather than the platform or artifacts.
    pub fn is_configuration(&self) -> bool {
        self.kind() == FailureKind::Configuration
    }
}
