//! Reconciliation — merges desired state with the live record.
//!
//! The engine only ever updates: a missing project or service is an
//! error, never a reason to create one. The payload takes identity
//! metadata verbatim from the live record and bumps `latestVersion` by
//! exactly one.
//!
//! There is no compare-and-swap on the version: a concurrent change
//! between the read and the write is not detected.

use ocdeploy_client::OrchestrationClient;
use ocdeploy_core::{
    DeploymentDescriptor, LiveResourceState, Presence, SubmitResponse, UpdatePayload,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{ReleaseError, ReleaseResult};

/// Fields the platform assigns and rejects when echoed back.
const STATUS_CODE: &str = "statusCode";
const CREATION_TIMESTAMP: &str = "creationTimestamp";

pub struct Reconciler<'a, C: ?Sized> {
    client: &'a C,
    project: &'a str,
    service: &'a str,
}

impl<'a, C> Reconciler<'a, C>
where
    C: OrchestrationClient + ?Sized,
{
    pub fn new(client: &'a C, project: &'a str, service: &'a str) -> Self {
        Self {
            client,
            project,
            service,
        }
    }

    /// Check the target exists, read its live state and build the update.
    pub async fn reconcile(
        &self,
        descriptor: DeploymentDescriptor,
    ) -> ReleaseResult<UpdatePayload> {
        if self.client.project_exists(self.project).await? == Presence::Absent {
            return Err(ReleaseError::ProjectNotFound(self.project.to_string()));
        }

        if self.client.service_exists(self.service).await? == Presence::Absent {
            return Err(ReleaseError::ServiceNotFound {
                project: self.project.to_string(),
                service: self.service.to_string(),
            });
        }

        let live = self.client.live_state().await?.ok_or_else(|| {
            ReleaseError::InconsistentState(format!(
                "service {}/{} exists but the platform returned no deployment config",
                self.project, self.service
            ))
        })?;

        let payload = build_payload(descriptor, &live)?;
        debug!(
            project = %self.project,
            service = %self.service,
            version = payload.latest_version(),
            "update payload reconciled"
        );
        Ok(payload)
    }

    /// Submit the payload. Failures are reported, never retried.
    pub async fn submit(&self, payload: &UpdatePayload) -> ReleaseResult<SubmitResponse> {
        let response = self
            .client
            .submit(payload)
            .await
            .map_err(ReleaseError::Submission)?;
        info!(
            project = %self.project,
            service = %self.service,
            "deployment config updated"
        );
        Ok(response)
    }
}

/// Merge the live record's identity and version into the descriptor.
pub fn build_payload(
    descriptor: DeploymentDescriptor,
    live: &LiveResourceState,
) -> ReleaseResult<UpdatePayload> {
    if live.name().is_none_or(str::is_empty) {
        return Err(ReleaseError::InconsistentState(
            "live state carries no identity metadata (metadata.name)".to_string(),
        ));
    }
    let current = live.latest_version().ok_or_else(|| {
        ReleaseError::InconsistentState("live state carries no status.latestVersion".to_string())
    })?;
    let next = current.checked_add(1).ok_or_else(|| {
        ReleaseError::InconsistentState(format!("latestVersion {current} cannot be incremented"))
    })?;

    let mut doc = descriptor.into_map();
    doc.insert("metadata".to_string(), Value::Object(live.metadata.clone()));

    let status = doc
        .entry("status")
        .or_insert_with(|| Value::Object(Map::new()));
    if !status.is_object() {
        debug!("replacing non-mapping status block from template");
        *status = Value::Object(Map::new());
    }
    if let Some(status) = status.as_object_mut() {
        status.insert("latestVersion".to_string(), Value::from(next));
    }

    doc.remove(STATUS_CODE);
    if let Some(template_meta) = doc
        .get_mut("spec")
        .and_then(|spec| spec.get_mut("template"))
        .and_then(|template| template.get_mut("metadata"))
        .and_then(Value::as_object_mut)
    {
        template_meta.remove(CREATION_TIMESTAMP);
    }

    Ok(UpdatePayload::from_reconciled(doc))
}
