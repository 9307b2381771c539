use chrono::{DateTime, Local};
use futures::{pin_mut, TryStreamExt};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::client::{CameraApi, Session};
use crate::config::Credentials;
use crate::error::Result;
use crate::models::CameraRecord;
use crate::pagination::pages;
use crate::report::InventoryReport;
use crate::snapshot::SnapshotWriter;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: InventoryReport,
    pub path: PathBuf,
}

pub struct Collector<A> {
    api: A,
    credentials: Credentials,
    page_limit: usize,
    writer: SnapshotWriter,
    list_offline: bool,
}

impl<A: CameraApi> Collector<A> {
    pub fn new(api: A, credentials: Credentials, page_limit: usize, writer: SnapshotWriter) -> Self {
        Self {
            api,
            credentials,
            page_limit,
            writer,
            list_offline: false,
        }
    }

    /// Log every offline camera after the summary.
    pub fn with_offline_listing(mut self, enable: bool) -> Self {
        self.list_offline = enable;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_at(Local::now()).await
    }

    /// Runs one collection, stamping the snapshot with `now`.
    ///
    /// Nothing is written unless login and every page request succeed.
    #[instrument(skip_all, fields(page_limit = self.page_limit))]
    pub async fn run_at(&self, now: DateTime<Local>) -> Result<RunOutcome> {
        let session = self.api.login(&self.credentials).await?;
        info!("authenticated");

        let records = self.fetch_inventory(&session).await?;
        let report = InventoryReport::summarize(&records, now);

        info!(
            total = report.total_cameras,
            online = report.online_count,
            offline = report.offline_count,
            "inventory summarized"
        );

        if self.list_offline {
            for camera in &report.offline_cameras {
                warn!(camera = %camera.name, source_error = %camera.source_error, "camera offline");
            }
        }

        let path = self.writer.write(&report, now.date_naive()).await?;
        info!(
            path = %path.display(),
            offline = report.offline_count,
            "saved offline camera snapshot"
        );

        Ok(RunOutcome { report, path })
    }

    async fn fetch_inventory(&self, session: &Session) -> Result<Vec<CameraRecord>> {
        let stream = pages(&self.api, session, self.page_limit);
        pin_mut!(stream);

        let mut records = Vec::new();
        while let Some(page) = stream.try_next().await? {
            let fetched = page.records.len();
            records.extend(page.records);
            info!(
                offset = page.offset,
                fetched,
                total = records.len(),
                "fetched camera page"
            );
        }

        Ok(records)
    }
}
