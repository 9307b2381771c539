use chrono::{DateTime, Local, SecondsFormat};
use serde::{Serialize, Serializer};

use crate::models::{CameraRecord, NOT_AVAILABLE};

/// Reported `alive` value of an offline camera: the flag sent by the API, or
/// `"N/A"` when the camera carried none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliveFlag {
    Reported(bool),
    Missing,
}

impl From<Option<bool>> for AliveFlag {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Missing, Self::Reported)
    }
}

impl Serialize for AliveFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Reported(alive) => serializer.serialize_bool(*alive),
            Self::Missing => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineCamera {
    pub name: String,
    pub alive: AliveFlag,
    pub source_error: String,
}

impl From<&CameraRecord> for OfflineCamera {
    fn from(record: &CameraRecord) -> Self {
        Self {
            name: record.status_name().to_string(),
            alive: record.alive().into(),
            source_error: record.source_error().to_string(),
        }
    }
}

/// Daily snapshot of the camera inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    #[serde(serialize_with = "iso8601")]
    pub timestamp: DateTime<Local>,
    pub total_cameras: usize,
    pub online_count: usize,
    pub offline_count: usize,
    pub offline_cameras: Vec<OfflineCamera>,
}

impl InventoryReport {
    /// Classifies every record with [`CameraRecord::is_alive`]; a record
    /// without a usable status is offline.
    pub fn summarize(records: &[CameraRecord], captured_at: DateTime<Local>) -> Self {
        let offline_cameras: Vec<OfflineCamera> = records
            .iter()
            .filter(|record| !record.is_alive())
            .map(OfflineCamera::from)
            .collect();
        let offline_count = offline_cameras.len();

        Self {
            timestamp: captured_at,
            total_cameras: records.len(),
            online_count: records.len() - offline_count,
            offline_count,
            offline_cameras,
        }
    }
}

fn iso8601<S: Serializer>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
}
