//! Canonical view records. Every record here is produced by `crate::normalize`
//! and is stable in shape regardless of what the backend sent.

pub mod analysis;
pub mod cv;
pub mod job;

pub use analysis::{AnalysisListItem, AnalysisResult, AnalysisStatistics, ScoreDistribution};
pub use cv::CvSummary;
pub use job::{JobSummary, SampleJob};

use serde::{Deserialize, Serialize};

/// Public configuration exposed by the backend for the client's local checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicConfig {
    pub max_file_size_mb: Option<u64>,
    pub allowed_extensions: Vec<String>,
    pub app_version: Option<String>,
}
