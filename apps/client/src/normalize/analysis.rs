use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{
    dedup_preserving_order, first_date, first_id, first_str, score_at, string_list, value_at,
};
use crate::models::analysis::{AnalysisListItem, AnalysisResult};
use crate::models::cv::UNKNOWN_CV;
use crate::models::job::UNKNOWN_JOB;

/// Keys under which the backend may nest the analysis body of a stored record.
const NESTED_KEYS: [&str; 3] = ["analysis", "full_analysis_data", "analysis_data"];

/// The record itself followed by every nested analysis body it carries.
fn sources(raw: &Value) -> Vec<&Value> {
    std::iter::once(raw)
        .chain(
            NESTED_KEYS
                .iter()
                .filter_map(|key| raw.get(*key).filter(|v| v.is_object())),
        )
        .collect()
}

fn score_in(sources: &[&Value], fields: &[&str]) -> u32 {
    sources
        .iter()
        .find_map(|src| fields.iter().find_map(|f| score_at(src, &[*f])))
        .unwrap_or(0)
}

fn list_in(sources: &[&Value], field: &str) -> Vec<String> {
    sources
        .iter()
        .find_map(|src| string_list(src, &[field]))
        .unwrap_or_default()
}

/// Normalizes a full analysis result: the run-analysis response, a
/// fetch-by-id response, or a stored record with a nested analysis body.
pub fn normalize_analysis(raw: &Value) -> AnalysisResult {
    let sources = sources(raw);

    AnalysisResult {
        id: first_id(raw, &[&["id"], &["analysis_id"]]),
        cv_id: first_id(raw, &[&["cv_id"], &["cv_record_id"], &["cv_details", "id"]]),
        job_id: first_id(
            raw,
            &[&["job_id"], &["job_description_id"], &["job_details", "id"]],
        ),
        suitability_score: score_in(&sources, &["suitability_score", "overall_suitability_score"]),
        technical_score: score_in(&sources, &["technical_score"]),
        experience_score: score_in(&sources, &["experience_score"]),
        education_score: score_in(&sources, &["education_score"]),
        scoring_rationale: sources
            .iter()
            .find_map(|src| first_str(src, &[&["scoring_rationale"]]))
            .unwrap_or_default(),
        matching_skills: dedup_preserving_order(list_in(&sources, "matching_skills")),
        missing_skills: dedup_preserving_order(list_in(&sources, "missing_skills")),
        recommendations: list_in(&sources, "recommendations"),
        red_flags: list_in(&sources, "red_flags"),
        detailed_analysis: sources
            .iter()
            .find_map(|src| value_at(src, &["detailed_analysis"]))
            .cloned(),
        analysis_date: first_date(raw, &[&["analysis_date"], &["created_at"]]),
    }
}

/// Normalizes one row of the recent analyses list. A missing date becomes
/// `now`; this list is display-only and never written back.
pub fn normalize_analysis_list_item(raw: &Value, now: DateTime<Utc>) -> AnalysisListItem {
    let sources = sources(raw);

    AnalysisListItem {
        id: first_id(raw, &[&["id"], &["analysis_id"]]),
        cv_name: first_str(
            raw,
            &[
                &["cv_filename"],
                &["cv_details", "filename"],
                &["cv_name"],
                &["cv_details", "name"],
                &["cv_details", "parsed_data", "contact_info", "name"],
            ],
        )
        .unwrap_or_else(|| UNKNOWN_CV.to_string()),
        job_title: first_str(
            raw,
            &[
                &["job_details", "job_data", "job_title"],
                &["job_title"],
                &["job_details", "title"],
            ],
        )
        .unwrap_or_else(|| UNKNOWN_JOB.to_string()),
        company: first_str(
            raw,
            &[
                &["job_details", "job_data", "company"],
                &["company"],
                &["job_details", "company"],
            ],
        ),
        score: score_in(&sources, &["suitability_score", "overall_suitability_score"]),
        date: first_date(raw, &[&["analysis_date"], &["created_at"]]).unwrap_or(now),
    }
}
