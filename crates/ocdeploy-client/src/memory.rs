//! In-process platform with scripted behaviour.
//!
//! Stands in for a cluster in tests and dry runs. Every call is counted so
//! callers can assert which requests were (or were not) made.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use ocdeploy_core::{LiveResourceState, Presence, SubmitResponse, UpdatePayload};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::{OrchestrationClient, SERVER_OK};

/// Number of calls made to each client operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub server_status: u32,
    pub project_exists: u32,
    pub service_exists: u32,
    pub live_state: u32,
    pub submit: u32,
    pub is_ready: u32,
}

#[derive(Debug, Clone, Copy)]
enum ReadinessStep {
    Answer(bool),
    Fail,
}

#[derive(Debug)]
struct PlatformState {
    server_status: u16,
    projects: HashSet<String>,
    services: HashSet<String>,
    live: Option<Value>,
    readiness: VecDeque<ReadinessStep>,
    ready_when_unscripted: bool,
    submit_failure: Option<(u16, String)>,
    omit_submit_status: bool,
    submitted: Vec<UpdatePayload>,
    calls: CallCounts,
}

/// A single-resource platform held in memory.
#[derive(Debug)]
pub struct InMemoryPlatform {
    state: Mutex<PlatformState>,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PlatformState {
                server_status: SERVER_OK,
                projects: HashSet::new(),
                services: HashSet::new(),
                live: None,
                readiness: VecDeque::new(),
                ready_when_unscripted: true,
                submit_failure: None,
                omit_submit_status: false,
                submitted: Vec::new(),
                calls: CallCounts::default(),
            }),
        }
    }

    /// A platform where `project`/`service` exist with the given live document.
    pub fn with_deployment(project: &str, service: &str, live: Value) -> Self {
        Self::new()
            .with_project(project)
            .with_service(service)
            .with_live_state(live)
    }

    pub fn with_project(self, project: &str) -> Self {
        self.lock().projects.insert(project.to_string());
        self
    }

    pub fn with_service(self, service: &str) -> Self {
        self.lock().services.insert(service.to_string());
        self
    }

    pub fn with_live_state(self, live: Value) -> Self {
        self.lock().live = Some(live);
        self
    }

    pub fn with_server_status(self, status: u16) -> Self {
        self.lock().server_status = status;
        self
    }

    /// Script readiness answers, consumed one per query.
    pub fn with_readiness(self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.lock()
            .readiness
            .extend(answers.into_iter().map(ReadinessStep::Answer));
        self
    }

    /// Script a readiness query that fails at the transport level.
    pub fn with_readiness_failure(self) -> Self {
        self.lock().readiness.push_back(ReadinessStep::Fail);
        self
    }

    /// Answer once the readiness script is exhausted (default `true`).
    pub fn ready_when_unscripted(self, ready: bool) -> Self {
        self.lock().ready_when_unscripted = ready;
        self
    }

    /// Reject every submission with the given status.
    pub fn with_submit_failure(self, status: u16, message: &str) -> Self {
        self.lock().submit_failure = Some((status, message.to_string()));
        self
    }

    /// Reply to submissions without a `status` block.
    pub fn omit_submit_status(self) -> Self {
        self.lock().omit_submit_status = true;
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn submitted(&self) -> Vec<UpdatePayload> {
        self.lock().submitted.clone()
    }

    /// The current live document, as the platform would return it.
    pub fn live_value(&self) -> Option<Value> {
        self.lock().live.clone()
    }

    fn lock(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl OrchestrationClient for InMemoryPlatform {
    async fn server_status(&self) -> ClientResult<u16> {
        let mut state = self.lock();
        state.calls.server_status += 1;
        Ok(state.server_status)
    }

    async fn project_exists(&self, project: &str) -> ClientResult<Presence> {
        let mut state = self.lock();
        state.calls.project_exists += 1;
        Ok(state.projects.contains(project).into())
    }

    async fn service_exists(&self, service: &str) -> ClientResult<Presence> {
        let mut state = self.lock();
        state.calls.service_exists += 1;
        Ok(state.services.contains(service).into())
    }

    async fn live_state(&self) -> ClientResult<Option<LiveResourceState>> {
        let mut state = self.lock();
        state.calls.live_state += 1;
        match &state.live {
            None => Ok(None),
            Some(doc) => serde_json::from_value(doc.clone())
                .map(Some)
                .map_err(|e| ClientError::Decode(e.to_string())),
        }
    }

    async fn submit(&self, payload: &UpdatePayload) -> ClientResult<SubmitResponse> {
        let mut state = self.lock();
        state.calls.submit += 1;
        state.submitted.push(payload.clone());

        if let Some((status, message)) = &state.submit_failure {
            return Err(ClientError::Status {
                status: *status,
                message: message.clone(),
            });
        }

        // The platform keeps its own status counters; only the version moves.
        let mut accepted = payload.to_value();
        let mut status = state
            .live
            .as_ref()
            .and_then(|live| live.get("status").cloned())
            .unwrap_or_else(|| Value::Object(Default::default()));
        if let (Some(status), Some(version)) = (status.as_object_mut(), payload.latest_version()) {
            status.insert("latestVersion".to_string(), version.into());
        }
        accepted["status"] = status;
        state.live = Some(accepted.clone());

        if state.omit_submit_status {
            return Ok(SubmitResponse::default());
        }
        serde_json::from_value(accepted).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn is_ready(&self) -> ClientResult<bool> {
        let mut state = self.lock();
        state.calls.is_ready += 1;
        match state.readiness.pop_front() {
            Some(ReadinessStep::Answer(ready)) => Ok(ready),
            Some(ReadinessStep::Fail) => Err(ClientError::Status {
                status: 503,
                message: "scripted readiness failure".to_string(),
            }),
            None => Ok(state.ready_when_unscripted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn payload(version: u64) -> UpdatePayload {
        let doc = json!({
            "metadata": {"name": "svc"},
            "spec": {"replicas": 2},
            "status": {"latestVersion": version}
        });
        UpdatePayload::from_reconciled(doc.as_object().cloned().unwrap_or_else(Map::new))
    }

    #[tokio::test]
    async fn existence_checks_are_counted() {
        let platform = InMemoryPlatform::new().with_project("shop");
        assert_eq!(platform.project_exists("shop").await.unwrap(), Presence::Exists);
        assert_eq!(platform.service_exists("svc").await.unwrap(), Presence::Absent);
        let calls = platform.calls();
        assert_eq!(calls.project_exists, 1);
        assert_eq!(calls.service_exists, 1);
        assert_eq!(calls.live_state, 0);
    }

    #[tokio::test]
    async fn submit_updates_live_version_but_keeps_counters() {
        let platform = InMemoryPlatform::with_deployment(
            "shop",
            "svc",
            json!({"metadata": {"name": "svc"}, "status": {"latestVersion": 3, "replicas": 2}}),
        );

        let response = platform.submit(&payload(4)).await.unwrap();
        assert_eq!(response.latest_version(), Some(4));

        let live = platform.live_state().await.unwrap().unwrap();
        assert_eq!(live.latest_version(), Some(4));
        assert_eq!(live.status.replicas, Some(2));
        assert_eq!(platform.submitted().len(), 1);
    }

    #[tokio::test]
    async fn submit_failure_is_reported() {
        let platform = InMemoryPlatform::new().with_submit_failure(409, "conflict");
        let err = platform.submit(&payload(1)).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 409, .. }));
    }

    #[tokio::test]
    async fn readiness_script_then_default() {
        let platform = InMemoryPlatform::new()
            .with_readiness([false])
            .with_readiness_failure()
            .ready_when_unscripted(true);
        assert!(!platform.is_ready().await.unwrap());
        assert!(platform.is_ready().await.is_err());
        assert!(platform.is_ready().await.unwrap());
        assert_eq!(platform.calls().is_ready, 3);
    }
}
