use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{CollectorError, Result};
use crate::report::InventoryReport;

const FILE_PREFIX: &str = "inactive_cameras_";

/// Writes one snapshot file per calendar day into `output_dir`.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `inactive_cameras_DD-MM-YYYY.json`
    pub fn file_name(date: NaiveDate) -> String {
        format!("{FILE_PREFIX}{}.json", date.format("%d-%m-%Y"))
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(Self::file_name(date))
    }

    /// Writes `report` as pretty JSON, replacing any snapshot already taken
    /// on `date`.
    pub async fn write(&self, report: &InventoryReport, date: NaiveDate) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| CollectorError::Snapshot {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.path_for(date);
        let body = serde_json::to_vec_pretty(report)?;

        fs::write(&path, body)
            .await
            .map_err(|source| CollectorError::Snapshot {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "snapshot written");
        Ok(path)
    }
}
