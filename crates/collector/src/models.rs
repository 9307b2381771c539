use serde::Deserialize;
use serde_json::{Map, Value};

/// Placeholder reported for an unknown stream name or `alive` flag.
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder reported for a camera without a recorded source error.
pub const MISSING_SOURCE_ERROR: &str = "None";

/// Nested `stream_status` object of a camera.
///
/// Every field is optional: the API omits fields for cameras that never
/// started, and a value of the wrong JSON type is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStatus {
    pub alive: Option<bool>,
    pub name: Option<String>,
    pub source_error: Option<String>,
}

impl StreamStatus {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            alive: bool_field(obj, "alive"),
            name: string_field(obj, "name"),
            source_error: string_field(obj, "source_error"),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.unwrap_or(false)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn source_error(&self) -> &str {
        self.source_error.as_deref().unwrap_or(MISSING_SOURCE_ERROR)
    }
}

/// One camera entry returned by `GET /cameras`.
///
/// Deserialization never fails for a single element: a non-object element
/// becomes an empty record, which is then classified offline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct CameraRecord {
    pub name: Option<String>,
    pub title: Option<String>,
    pub stream_status: Option<StreamStatus>,
}

impl From<Value> for CameraRecord {
    fn from(value: Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            name: string_field(obj, "name"),
            title: string_field(obj, "title"),
            stream_status: obj
                .get("stream_status")
                .and_then(Value::as_object)
                .map(StreamStatus::from_object),
        }
    }
}

impl CameraRecord {
    /// Reported `alive` flag; `None` when the camera carries no status at all
    /// or the status has no boolean `alive` field.
    pub fn alive(&self) -> Option<bool> {
        self.stream_status.as_ref().and_then(|s| s.alive)
    }

    pub fn is_alive(&self) -> bool {
        self.stream_status
            .as_ref()
            .is_some_and(StreamStatus::is_alive)
    }

    /// Stream name as written into the snapshot.
    pub fn status_name(&self) -> &str {
        self.stream_status
            .as_ref()
            .map_or(NOT_AVAILABLE, StreamStatus::display_name)
    }

    pub fn source_error(&self) -> &str {
        self.stream_status
            .as_ref()
            .map_or(MISSING_SOURCE_ERROR, StreamStatus::source_error)
    }

    /// Best available human label, for log lines only.
    pub fn label(&self) -> &str {
        self.stream_status
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .or(self.name.as_deref())
            .or(self.title.as_deref())
            .unwrap_or(NOT_AVAILABLE)
    }
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}
