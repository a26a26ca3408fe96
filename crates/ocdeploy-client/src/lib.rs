//! ocdeploy-client — the orchestration platform seam.
//!
//! The release engine talks to the platform only through
//! [`OrchestrationClient`]. Two implementations ship here:
//!
//! - [`OpenShiftClient`] — REST adapter for the OpenShift `oapi` endpoints
//! - [`InMemoryPlatform`] — a scripted in-process platform, used by tests
//!   and dry runs
//!
//! A client is bound to one project/service pair at construction; the
//! state accessors (`live_state`, `submit`, `is_ready`) act on that target.

use async_trait::async_trait;
use ocdeploy_core::{LiveResourceState, Presence, SubmitResponse, UpdatePayload};

pub mod auth;
pub mod error;
pub mod memory;
pub mod openshift;

pub use auth::Credentials;
pub use error::{ClientError, ClientResult};
pub use memory::{CallCounts, InMemoryPlatform};
pub use openshift::OpenShiftClient;

/// HTTP status the platform health endpoint returns when reachable.
pub const SERVER_OK: u16 = 200;

/// Capabilities the release engine requires from the platform.
#[async_trait]
pub trait OrchestrationClient: Send + Sync {
    /// Health/reachability code. Anything but [`SERVER_OK`] is fatal.
    async fn server_status(&self) -> ClientResult<u16>;

    async fn project_exists(&self, project: &str) -> ClientResult<Presence>;

    async fn service_exists(&self, service: &str) -> ClientResult<Presence>;

    /// Current record of the bound resource, `None` if the platform has none.
    async fn live_state(&self) -> ClientResult<Option<LiveResourceState>>;

    async fn submit(&self, payload: &UpdatePayload) -> ClientResult<SubmitResponse>;

    /// Whether the latest rollout of the bound resource has converged.
    async fn is_ready(&self) -> ClientResult<bool>;
}
