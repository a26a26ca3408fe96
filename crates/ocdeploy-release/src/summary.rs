//! Post-release report.

use std::fmt;

use ocdeploy_core::LiveResourceState;
use serde::Serialize;

/// What the platform reports once a release has rolled out.
///
/// Every field past the target is best-effort; a missing value is left
/// out of the rendered report rather than printed as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseSummary {
    pub project: String,
    pub service: String,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub latest_version: Option<u64>,
    pub image: Option<String>,
    pub updated_replicas: Option<u64>,
    pub available_replicas: Option<u64>,
}

impl ReleaseSummary {
    /// A summary with only the target filled in.
    pub fn target(project: &str, service: &str) -> Self {
        Self {
            project: project.to_string(),
            service: service.to_string(),
            ..Self::default()
        }
    }

    pub fn from_live(project: &str, service: &str, live: &LiveResourceState) -> Self {
        Self {
            name: live.name().map(str::to_string),
            namespace: live.namespace().map(str::to_string),
            latest_version: live.latest_version(),
            image: live.image().map(str::to_string),
            updated_replicas: live.status.updated_replicas,
            available_replicas: live.status.available_replicas,
            ..Self::target(project, service)
        }
    }
}

impl fmt::Display for ReleaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Release of {}/{} complete", self.project, self.service)?;
        let rows: [(&str, Option<String>); 6] = [
            ("Name", self.name.clone()),
            ("Namespace", self.namespace.clone()),
            ("Version", self.latest_version.map(|v| format!("#{v}"))),
            ("Image", self.image.clone()),
            ("Updated replicas", self.updated_replicas.map(|n| n.to_string())),
            ("Available replicas", self.available_replicas.map(|n| n.to_string())),
        ];
        for (label, value) in rows {
            if let Some(value) = value {
                writeln!(f, "  {label:<20} {value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_from_live_state() {
        let live: LiveResourceState = serde_json::from_value(json!({
            "metadata": {"name": "svc", "namespace": "shop"},
            "spec": {"template": {"spec": {"containers": [{"image": "reg/svc:2"}]}}},
            "status": {"latestVersion": 4, "updatedReplicas": 2, "availableReplicas": 2}
        }))
        .unwrap();

        let summary = ReleaseSummary::from_live("shop", "svc", &live);
        assert_eq!(summary.latest_version, Some(4));
        assert_eq!(summary.image.as_deref(), Some("reg/svc:2"));

        let text = summary.to_string();
        assert!(text.starts_with("Release of shop/svc complete\n"));
        assert!(text.contains("#4"));
        assert!(text.contains("reg/svc:2"));
    }

    #[test]
    fn missing_fields_are_omitted() {
        let text = ReleaseSummary::target("shop", "svc").to_string();
        assert_eq!(text, "Release of shop/svc complete\n");
    }
}
