use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNKNOWN_CV: &str = "Unknown CV";

/// A parsed CV as the views show it. Replaced wholesale on the next upload or
/// selection, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvSummary {
    /// Required by analysis requests; `None` only for degraded payloads.
    pub id: Option<String>,
    pub filename: String,
    /// `file_upload.original_filename` → `contact_name` → `parsed_data.contact_info.name`.
    pub display_name: String,
    pub upload_date: Option<DateTime<Utc>>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub file_size_bytes: Option<u64>,
    /// Structured CV payload, passed through untouched.
    pub parsed_data: Value,
}
