//! Release orchestration.

use std::path::Path;

use ocdeploy_client::{OrchestrationClient, SERVER_OK};
use ocdeploy_core::{DeploymentDescriptor, ReleaseConfig, VariableContextBuilder};
use ocdeploy_render::{Renderer, SourceLayout, load_variables};
use ocdeploy_rollout::{PollPolicy, RolloutWatcher};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{ReleaseError, ReleaseResult};
use crate::reconcile::Reconciler;
use crate::source::SourceFetcher;
use crate::summary::ReleaseSummary;
use crate::workspace::WorkDir;

/// One release of one deployment config.
pub struct Release<'a, C: ?Sized, F: ?Sized> {
    config: &'a ReleaseConfig,
    client: &'a C,
    fetcher: &'a F,
    options: Map<String, Value>,
    renderer: Renderer,
}

impl<'a, C, F> Release<'a, C, F>
where
    C: OrchestrationClient + ?Sized,
    F: SourceFetcher + ?Sized,
{
    pub fn new(config: &'a ReleaseConfig, client: &'a C, fetcher: &'a F) -> Self {
        Self {
            config,
            client,
            fetcher,
            options: Map::new(),
            renderer: Renderer::new(),
        }
    }

    /// Per-job option overrides; they shadow the environment variable file.
    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = options;
        self
    }

    /// Run the release to completion.
    ///
    /// The working directory is removed on every exit path, including
    /// failures and cancellation.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> ReleaseResult<ReleaseSummary> {
        self.config.validate()?;
        let project = &self.config.target.project;
        let service = &self.config.target.service;
        info!(
            project = %project,
            service = %service,
            environment = %self.config.target.environment,
            "starting release"
        );

        let work = WorkDir::create(&self.config.work_root())?;
        let result = self.run_in(work.path(), &mut cancel).await;
        work.cleanup();

        match &result {
            Ok(summary) => info!(
                project = %project,
                service = %service,
                version = summary.latest_version,
                "release complete"
            ),
            Err(e) => error!(
                project = %project,
                service = %service,
                kind = ?e.kind(),
                error = %e,
                "release failed"
            ),
        }
        result
    }

    async fn run_in(
        &self,
        checkout: &Path,
        cancel: &mut watch::Receiver<bool>,
    ) -> ReleaseResult<ReleaseSummary> {
        self.fetcher.fetch(checkout).await?;

        let descriptor = prepare_descriptor(self.config, checkout, &self.options, &self.renderer)?;

        let status = self.client.server_status().await?;
        if status != SERVER_OK {
            return Err(ReleaseError::PlatformUnavailable(status));
        }

        let target = &self.config.target;
        let reconciler = Reconciler::new(self.client, &target.project, &target.service);
        let payload = reconciler.reconcile(descriptor).await?;
        let response = reconciler.submit(&payload).await?;
        if let Some(version) = response.latest_version() {
            info!("Deployment #{version} running, this could take some time...");
        }

        let policy = PollPolicy::from_config(&self.config.rollout);
        RolloutWatcher::new(self.client, policy).wait(cancel).await?;

        Ok(self.final_summary().await)
    }

    /// Best-effort read of the rolled-out state.
    async fn final_summary(&self) -> ReleaseSummary {
        let target = &self.config.target;
        match self.client.live_state().await {
            Ok(Some(live)) => ReleaseSummary::from_live(&target.project, &target.service, &live),
            Ok(None) => {
                warn!("deployment config vanished after rollout");
                ReleaseSummary::target(&target.project, &target.service)
            }
            Err(e) => {
                warn!(error = %e, "could not read final deployment state");
                ReleaseSummary::target(&target.project, &target.service)
            }
        }
    }
}

/// Locate, render and parse the deployment template in a checkout.
///
/// Makes no platform calls, so a template problem never reaches the cluster.
pub fn prepare_descriptor(
    config: &ReleaseConfig,
    checkout: &Path,
    options: &Map<String, Value>,
    renderer: &Renderer,
) -> ReleaseResult<DeploymentDescriptor> {
    let sources = SourceLayout::from_config(config).locate(checkout)?;
    let environment = sources
        .variables
        .as_deref()
        .map(load_variables)
        .transpose()?;

    let context = VariableContextBuilder::new()
        .plugin(config.plugin_variables())
        .options(options.clone())
        .environment(environment)
        .require(config.variables.required.iter().cloned())
        .build()?;

    Ok(renderer.render_file(&sources.deployment, &context)?)
}
