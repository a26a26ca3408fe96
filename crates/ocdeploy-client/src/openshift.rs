//! REST adapter for the OpenShift `oapi` API.
//!
//! ```text
//! GET  {server}/healthz                               server_status
//! GET  {server}/oapi/{v}/projects/{project}           project_exists
//! GET  {server}/oapi/{v}/namespaces/{project}/deploymentconfigs/{svc}
//!                                                     service_exists, live_state, is_ready
//! PUT  {server}/oapi/{v}/namespaces/{project}/deploymentconfigs/{svc}
//!                                                     submit
//! ```

use async_trait::async_trait;
use ocdeploy_core::config::PlatformConfig;
use ocdeploy_core::{LiveResourceState, Presence, ReleaseConfig, SubmitResponse, UpdatePayload};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::error::{ClientError, ClientResult};
use crate::OrchestrationClient;

/// HTTP client for one deployment config on an OpenShift cluster.
pub struct OpenShiftClient {
    client: Client,
    base_url: String,
    api_version: String,
    project: String,
    service: String,
    credentials: Credentials,
}

impl OpenShiftClient {
    /// Create a client bound to `project`/`service`.
    pub fn new(config: &PlatformConfig, project: &str, service: &str) -> ClientResult<Self> {
        let credentials = Credentials::from_platform(config)?;
        let client = Client::builder()
            .timeout(config.network_timeout())
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify)
            .build()?;

        debug!(
            server = %config.server_url,
            auth = credentials.scheme(),
            %project,
            %service,
            "openshift client configured"
        );

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            project: project.to_string(),
            service: service.to_string(),
            credentials,
        })
    }

    pub fn from_release(config: &ReleaseConfig) -> ClientResult<Self> {
        Self::new(&config.platform, &config.target.project, &config.target.service)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/oapi/{}{}", self.base_url, self.api_version, path)
    }

    fn deployment_config_url(&self, service: &str) -> String {
        self.api_url(&format!(
            "/namespaces/{}/deploymentconfigs/{}",
            self.project, service
        ))
    }

    async fn get(&self, url: &str) -> ClientResult<Response> {
        let request = self.credentials.apply(self.client.get(url));
        Ok(request.send().await?)
    }

    async fn fetch_live(&self) -> ClientResult<Option<LiveResourceState>> {
        let response = self.get(&self.deployment_config_url(&self.service)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let value: Value = response.json().await?;
                if value.is_null() {
                    return Ok(None);
                }
                serde_json::from_value(value)
                    .map(Some)
                    .map_err(|e| ClientError::Decode(e.to_string()))
            }
            _ => Err(error_from(response).await),
        }
    }
}

#[async_trait]
impl OrchestrationClient for OpenShiftClient {
    async fn server_status(&self) -> ClientResult<u16> {
        let url = format!("{}/healthz", self.base_url);
        let response = self.get(&url).await?;
        Ok(response.status().as_u16())
    }

    async fn project_exists(&self, project: &str) -> ClientResult<Presence> {
        let response = self.get(&self.api_url(&format!("/projects/{project}"))).await?;
        match response.status() {
            status if status.is_success() => Ok(Presence::Exists),
            // OpenShift hides projects the caller may not see behind 403.
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Ok(Presence::Absent),
            _ => Err(error_from(response).await),
        }
    }

    async fn service_exists(&self, service: &str) -> ClientResult<Presence> {
        let response = self.get(&self.deployment_config_url(service)).await?;
        match response.status() {
            status if status.is_success() => Ok(Presence::Exists),
            StatusCode::NOT_FOUND => Ok(Presence::Absent),
            _ => Err(error_from(response).await),
        }
    }

    async fn live_state(&self) -> ClientResult<Option<LiveResourceState>> {
        self.fetch_live().await
    }

    async fn submit(&self, payload: &UpdatePayload) -> ClientResult<SubmitResponse> {
        let url = self.deployment_config_url(&self.service);
        let request = self.credentials.apply(self.client.put(&url)).json(payload);
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(SubmitResponse::default());
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn is_ready(&self) -> ClientResult<bool> {
        match self.fetch_live().await? {
            Some(state) => Ok(state.is_rolled_out()),
            None => {
                warn!(
                    project = %self.project,
                    service = %self.service,
                    "deployment config disappeared during rollout"
                );
                Ok(false)
            }
        }
    }
}

async fn error_from(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    ClientError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> PlatformConfig {
        PlatformConfig {
            server_url: "https://openshift.example.com:8443/".to_string(),
            api_version: "v1".to_string(),
            username: Some("admin".to_string()),
            password: Some("pw".to_string()),
            token: Some("tok".to_string()),
            network_timeout_secs: 5,
            insecure_skip_tls_verify: false,
        }
    }

    #[test]
    fn urls_are_built_from_config() {
        let client = OpenShiftClient::new(&platform(), "shop", "checkout").unwrap();
        assert_eq!(
            client.deployment_config_url("checkout"),
            "https://openshift.example.com:8443/oapi/v1/namespaces/shop/deploymentconfigs/checkout"
        );
        assert_eq!(
            client.api_url("/projects/shop"),
            "https://openshift.example.com:8443/oapi/v1/projects/shop"
        );
    }

    #[test]
    fn token_selected_when_both_configured() {
        let client = OpenShiftClient::new(&platform(), "shop", "checkout").unwrap();
        assert_eq!(client.credentials(), &Credentials::Bearer("tok".to_string()));
    }

    #[test]
    fn missing_credentials_rejected() {
        let mut config = platform();
        config.token = None;
        config.password = None;
        assert!(matches!(
            OpenShiftClient::new(&config, "shop", "checkout"),
            Err(ClientError::Config(_))
        ));
    }
}
