//! Documents exchanged with the orchestration platform.
//!
//! Descriptors and live state are kept as JSON values rather than fully
//! typed structs: the engine only owns a handful of fields (identity
//! metadata, the version counter, replica counts) and must pass every
//! other field through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of an existence check against the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Exists,
    Absent,
}

impl Presence {
    pub fn exists(self) -> bool {
        self == Presence::Exists
    }
}

impl From<bool> for Presence {
    fn from(exists: bool) -> Self {
        if exists { Presence::Exists } else { Presence::Absent }
    }
}

// ── Desired state ─────────────────────────────────────────────────

/// Rendered, parsed desired state of a single resource.
///
/// Carries no guaranteed identity metadata until reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentDescriptor(Map<String, Value>);

impl DeploymentDescriptor {
    pub fn new(document: Map<String, Value>) -> Self {
        Self(document)
    }

    /// Wrap a parsed document, returning it back if the root is not a mapping.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    pub fn spec(&self) -> Option<&Value> {
        self.0.get("spec")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

// ── Live state ────────────────────────────────────────────────────

/// Status block reported by the platform for a deployment config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    pub latest_version: Option<u64>,
    pub observed_generation: Option<u64>,
    pub replicas: Option<u64>,
    pub updated_replicas: Option<u64>,
    pub available_replicas: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The platform's authoritative record of the target resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveResourceState {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub spec: Value,
    #[serde(default)]
    pub status: ResourceStatus,
}

impl LiveResourceState {
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(Value::as_str)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.get("namespace").and_then(Value::as_str)
    }

    pub fn latest_version(&self) -> Option<u64> {
        self.status.latest_version
    }

    /// Spec generation from `metadata.generation`, bumped on every update.
    pub fn generation(&self) -> Option<u64> {
        self.metadata.get("generation").and_then(Value::as_u64)
    }

    /// Desired replica count from `spec.replicas`.
    pub fn desired_replicas(&self) -> Option<u64> {
        self.spec.get("replicas").and_then(Value::as_u64)
    }

    /// Image of the first container in the pod template.
    pub fn image(&self) -> Option<&str> {
        self.spec
            .pointer("/template/spec/containers/0/image")
            .and_then(Value::as_str)
    }

    /// Whether the latest rollout has converged.
    ///
    /// The controller must have observed the current generation, every
    /// replica must be updated and available, and at least the desired
    /// count must be available. Until the generation is observed the
    /// counters still describe the previous rollout.
    pub fn is_rolled_out(&self) -> bool {
        let status = &self.status;
        if status.latest_version.unwrap_or(0) < 1 {
            return false;
        }
        let observed = status.observed_generation;
        if let (Some(generation), Some(observed)) = (self.generation(), observed) {
            if observed < generation {
                return false;
            }
        }
        let (Some(replicas), Some(updated), Some(available)) = (
            status.replicas,
            status.updated_replicas,
            status.available_replicas,
        ) else {
            return false;
        };
        let desired = self.desired_replicas().unwrap_or(replicas);
        updated == replicas && available == replicas && available >= desired
    }
}

// ── Outgoing ──────────────────────────────────────────────────────

/// A reconciled descriptor, ready to be submitted as an update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UpdatePayload(Map<String, Value>);

impl UpdatePayload {
    /// Only the reconciler should build payloads; see `ocdeploy-release`.
    pub fn from_reconciled(document: Map<String, Value>) -> Self {
        Self(document)
    }

    pub fn latest_version(&self) -> Option<u64> {
        self.0
            .get("status")
            .and_then(|s| s.get("latestVersion"))
            .and_then(Value::as_u64)
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.0.get("metadata").and_then(Value::as_object)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// The platform's reply to an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: Option<ResourceStatus>,
}

impl SubmitResponse {
    pub fn latest_version(&self) -> Option<u64> {
        self.status.as_ref().and_then(|s| s.latest_version)
    }
}
