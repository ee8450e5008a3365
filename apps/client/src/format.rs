//! Display helpers shared by every renderer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::normalize::parse_timestamp;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size with at most two decimals, e.g. `1.5 KB`.
/// Zero renders as an empty string.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return String::new();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

/// `Jan 2020` style date for experience and education timelines.
/// Blank or "present" means an ongoing role; unparseable input is returned as-is.
pub fn format_month_year(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("present") {
        return "Present".to_string();
    }

    let date = parse_timestamp(trimmed)
        .map(|dt| dt.date_naive())
        .or_else(|| NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").ok());

    match date {
        Some(d) => d.format("%b %Y").to_string(),
        None => trimmed.to_string(),
    }
}

/// Colour band for a 0 – 100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,   // ≥ 70
    Moderate, // 50 – 69
    Weak,
}

impl ScoreBand {
    pub fn for_score(score: u32) -> Self {
        match score {
            70.. => ScoreBand::Strong,
            50..=69 => ScoreBand::Moderate,
            _ => ScoreBand::Weak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Strong => "strong",
            ScoreBand::Moderate => "moderate",
            ScoreBand::Weak => "weak",
        }
    }
}

/// Badge for a requirement's match quality. Anything unrecognised shows as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Full,
    Partial,
    None,
}

impl MatchQuality {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "full" => MatchQuality::Full,
            "partial" => MatchQuality::Partial,
            _ => MatchQuality::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchQuality::Full => "full",
            MatchQuality::Partial => "partial",
            MatchQuality::None => "none",
        }
    }
}
