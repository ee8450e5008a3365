//! Response normalizer: turns backend payloads of variable shape into the
//! canonical records in `crate::models`.
//!
//! Every normalizer is total and pure: any JSON value in, a usable record out.
//! Missing fields degrade to placeholders (`"Unknown Job"`, `"Unknown CV"`,
//! score `0`, empty lists). Lookups follow a fixed fallback order where the
//! first present, non-empty value wins.

pub mod analysis;
pub mod cv;
pub mod job;

pub use analysis::{normalize_analysis, normalize_analysis_list_item};
pub use cv::normalize_cv;
pub use job::{normalize_job, normalize_sample_job};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::models::PublicConfig;

/// Unwraps the `{"data": ...}` success envelope. Legacy endpoints return the
/// payload at the top level, which is passed through unchanged.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Extracts the backend's error message from a failure body.
/// Order: `detail` → `error` (string) → `error.message` → `message`.
pub fn error_message(body: &Value) -> Option<String> {
    first_str(
        body,
        &[&["detail"], &["error"], &["error", "message"], &["message"]],
    )
    .or_else(|| {
        // FastAPI validation errors put a list under `detail`.
        body.get("detail")
            .filter(|d| d.is_array() || d.is_object())
            .map(|d| d.to_string())
    })
}

/// Items of a list payload: a bare array, or an array under one of `keys`.
pub fn list_items<'a>(payload: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Some(items) = payload.as_array() {
        return items;
    }
    keys.iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn normalize_public_config(payload: &Value) -> PublicConfig {
    PublicConfig {
        max_file_size_mb: payload
            .get("max_file_size_mb")
            .and_then(Value::as_u64)
            .filter(|mb| *mb > 0),
        allowed_extensions: string_list(payload, &["allowed_extensions"])
            .unwrap_or_default()
            .into_iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect(),
        app_version: str_at(payload, &["app_version"]).map(str::to_string),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field lookup helpers
// ────────────────────────────────────────────────────────────────────────────

fn value_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .filter(|v| !v.is_null())
}

/// Non-blank string at `path`.
pub(crate) fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    value_at(value, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First non-blank string across `paths`, in order.
pub(crate) fn first_str(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| str_at(value, path))
        .map(str::to_string)
}

/// Identifier at `path`. Backends send integers or strings.
pub(crate) fn id_at(value: &Value, path: &[&str]) -> Option<String> {
    match value_at(value, path)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

pub(crate) fn first_id(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| id_at(value, path))
}

/// Score at `path`, rounded and clamped to 0 – 100. Accepts numeric strings.
pub(crate) fn score_at(value: &Value, path: &[&str]) -> Option<u32> {
    let raw = match value_at(value, path)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u32)
}

pub(crate) fn u64_at(value: &Value, path: &[&str]) -> Option<u64> {
    value_at(value, path).and_then(Value::as_u64)
}

/// List of non-blank strings at `path`; `None` when the field is absent or
/// not an array. Non-string items are skipped.
pub(crate) fn string_list(value: &Value, path: &[&str]) -> Option<Vec<String>> {
    let items = value_at(value, path)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

pub(crate) fn first_string_list(value: &Value, paths: &[&[&str]]) -> Vec<String> {
    paths
        .iter()
        .find_map(|path| string_list(value, path))
        .unwrap_or_default()
}

/// Removes repeated entries, keeping the first occurrence.
pub(crate) fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

pub(crate) fn date_at(value: &Value, path: &[&str]) -> Option<DateTime<Utc>> {
    str_at(value, path).and_then(parse_timestamp)
}

/// First parseable date across `paths`. Callers list the specific field
/// first and `created_at` last.
pub(crate) fn first_date(value: &Value, paths: &[&[&str]]) -> Option<DateTime<Utc>> {
    paths.iter().find_map(|path| date_at(value, path))
}

/// Parses RFC 3339, naive ISO-8601 (treated as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
