use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

/// Score range filter. Lower edges are inclusive, upper edges exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBucket {
    /// < 50
    Low,
    /// 50 – 69
    Medium,
    /// ≥ 70
    High,
}

impl ScoreBucket {
    pub fn contains(&self, score: u32) -> bool {
        match self {
            ScoreBucket::Low => score < 50,
            ScoreBucket::Medium => (50..70).contains(&score),
            ScoreBucket::High => score >= 70,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBucket::Low => "low",
            ScoreBucket::Medium => "medium",
            ScoreBucket::High => "high",
        }
    }
}

impl FromStr for ScoreBucket {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ScoreBucket::Low),
            "medium" | "mid" => Ok(ScoreBucket::Medium),
            "high" => Ok(ScoreBucket::High),
            other => Err(ClientError::Validation(format!(
                "Unknown score bucket '{other}'. Use low, medium or high"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first; undated items last.
    #[default]
    Date,
    /// Highest first; unscored items last.
    Score,
    /// Ascending, case-insensitive. For analyses the name is the job title.
    Name,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::Date => "date",
            SortKey::Score => "score",
            SortKey::Name => "name",
        };
        f.write_str(s)
    }
}

impl FromStr for SortKey {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" | "recent" | "newest" => Ok(SortKey::Date),
            "score" => Ok(SortKey::Score),
            "name" | "title" | "job" | "cv" => Ok(SortKey::Name),
            other => Err(ClientError::Validation(format!(
                "Unknown sort key '{other}'. Use date, score or name"
            ))),
        }
    }
}

/// Everything the user has entered to narrow and order a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    /// Case-insensitive substring; blank matches everything.
    pub query: String,
    pub bucket: Option<ScoreBucket>,
    /// Exact, case-insensitive matches on named categories
    /// (e.g. `experience_level` → `senior`).
    pub facets: BTreeMap<String, String>,
    pub sort: SortKey,
}

impl Criteria {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_bucket(mut self, bucket: ScoreBucket) -> Self {
        self.bucket = Some(bucket);
        self
    }

    pub fn with_facet(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.facets.insert(key.into(), value.into());
        self
    }

    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}
