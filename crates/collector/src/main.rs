use anyhow::{Context, Result};
use clap::Parser;
use collector::{
    client::HttpCameraApi,
    collector::Collector,
    config::{CollectorArgs, CollectorConfig},
    snapshot::SnapshotWriter,
};
use telemetry::LogConfig;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = CollectorArgs::parse();
    let _log_guard = telemetry::init_structured_logging(
        LogConfig::new("collect-inactive-cameras").with_version(collector::VERSION),
    )?;

    let config = CollectorConfig::from_args(args).context("invalid configuration")?;
    info!(
        base_url = %config.base_url,
        page_limit = config.page_limit,
        output_dir = %config.output_dir.display(),
        "starting camera inventory run"
    );

    let api = HttpCameraApi::new(&config)?;
    let collector = Collector::new(
        api,
        config.credentials.clone(),
        config.page_limit,
        SnapshotWriter::new(config.output_dir.clone()),
    )
    .with_offline_listing(config.list_offline);

    let outcome = collector.run().await.context("camera inventory run failed")?;

    info!(
        total = outcome.report.total_cameras,
        online = outcome.report.online_count,
        offline = outcome.report.offline_count,
        path = %outcome.path.display(),
        "run complete"
    );

    Ok(())
}
