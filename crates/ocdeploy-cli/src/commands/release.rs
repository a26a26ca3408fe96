use ocdeploy_client::OpenShiftClient;
use ocdeploy_release::{GitFetcher, Release, ReleaseError};
use tokio::sync::watch;
use tracing::info;

use super::Request;

pub async fn run(request: Request) -> anyhow::Result<()> {
    let (config, options) = request.load()?;
    config.validate().map_err(ReleaseError::from)?;

    let client = OpenShiftClient::from_release(&config).map_err(ReleaseError::from)?;
    let fetcher = GitFetcher::from_config(&config.source);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, abandoning release");
            let _ = cancel_tx.send(true);
        }
    });

    let summary = Release::new(&config, &client, &fetcher)
        .with_options(options)
        .run(cancel_rx)
        .await?;

    print!("{summary}");
    Ok(())
}
