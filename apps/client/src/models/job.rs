use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNKNOWN_JOB: &str = "Unknown Job";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: Option<String>,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub experience_level: Option<String>,
    pub required_skills: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// The structured job description (nested wrapper if present, else the
    /// record itself). Sent back verbatim with analysis requests.
    pub description: Value,
}

/// A canned job description offered by the backend for quick starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleJob {
    pub name: String,
    pub job: JobSummary,
}
