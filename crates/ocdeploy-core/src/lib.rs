//! ocdeploy-core — shared types for the ocdeploy release engine.
//!
//! Holds the immutable [`ReleaseConfig`], the [`VariableContext`] that
//! templates are rendered against, and the document types that flow
//! through a release: [`DeploymentDescriptor`] (desired state),
//! [`LiveResourceState`] (what the platform reports) and
//! [`UpdatePayload`] (what gets submitted).

pub mod config;
pub mod context;
pub mod error;
pub mod types;

pub use config::ReleaseConfig;
pub use context::{VariableContext, VariableContextBuilder};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
