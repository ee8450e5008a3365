use serde_json::Value;

use super::{first_date, first_id, first_str, first_string_list, str_at};
use crate::models::job::{JobSummary, SampleJob, UNKNOWN_JOB};

/// Wrapper keys that carry the structured job description. Checked in order;
/// a nested value always wins over the flat field with the same name.
const NESTED_KEYS: [&str; 2] = ["job_data", "structured_data"];

/// Normalizes a job record. Two backend shapes exist: a nested `job_data`
/// wrapper and a flat record. When both carry a field, the nested one wins.
pub fn normalize_job(raw: &Value) -> JobSummary {
    let nested = NESTED_KEYS
        .iter()
        .find_map(|key| raw.get(*key).filter(|v| v.is_object()));

    // Look in the nested wrapper first, then the flat record.
    let pick = |fields: &[&str]| -> Option<String> {
        nested
            .and_then(|n| fields.iter().find_map(|f| str_at(n, &[*f])))
            .or_else(|| fields.iter().find_map(|f| str_at(raw, &[*f])))
            .map(str::to_string)
    };

    let title = nested
        .and_then(|n| str_at(n, &["job_title"]))
        .or_else(|| str_at(raw, &["job_title"]))
        .or_else(|| str_at(raw, &["title"]))
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_JOB.to_string());

    let required_skills = match nested {
        Some(n) if n.get("required_skills").is_some_and(Value::is_array) => {
            first_string_list(n, &[&["required_skills"]])
        }
        _ => first_string_list(raw, &[&["required_skills"]]),
    };

    JobSummary {
        id: first_id(raw, &[&["id"], &["job_id"], &["job_description_id"]]),
        title,
        company: pick(&["company"]),
        location: pick(&["location"]),
        experience_level: pick(&["experience_level"]),
        required_skills,
        created_at: first_date(raw, &[&["created_at"]]),
        description: nested.cloned().unwrap_or_else(|| raw.clone()),
    }
}

/// Normalizes one entry of the sample job list: `{name, data}` or a bare job.
pub fn normalize_sample_job(raw: &Value) -> SampleJob {
    let data = raw.get("data").filter(|v| v.is_object()).unwrap_or(raw);
    let job = normalize_job(data);
    SampleJob {
        name: first_str(raw, &[&["name"], &["title"]]).unwrap_or_else(|| job.title.clone()),
        job,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_fields_win_over_flat() {
        let job = normalize_job(&json!({
            "id": 3,
            "job_title": "Flat Title",
            "title": "Flat Title 2",
            "company": "FlatCo",
            "location": "Flatville",
            "experience_level": "Junior",
            "required_skills": ["Java"],
            "job_data": {
                "job_title": "Senior Rust Engineer",
                "company": "Ferris Inc",
                "location": "Remote",
                "experience_level": "Senior",
                "required_skills": ["Rust", "Tokio"]
            }
        }));
        assert_eq!(job.title, "Senior Rust Engineer");
        assert_eq!(job.company.as_deref(), Some("Ferris Inc"));
        assert_eq!(job.location.as_deref(), Some("Remote"));
        assert_eq!(job.experience_level.as_deref(), Some("Senior"));
        assert_eq!(job.required_skills, vec!["Rust", "Tokio"]);
        assert_eq!(job.id.as_deref(), Some("3"));
    }

    #[test]
    fn test_nested_missing_field_falls_back_to_flat() {
        let job = normalize_job(&json!({
            "company": "FlatCo",
            "required_skills": ["Java"],
            "job_data": {"job_title": "Engineer"}
        }));
        assert_eq!(job.title, "Engineer");
        assert_eq!(job.company.as_deref(), Some("FlatCo"));
        assert_eq!(job.required_skills, vec!["Java"]);
    }

    #[test]
    fn test_title_fallback_order() {
        assert_eq!(
            normalize_job(&json!({"job_title": "A", "title": "B"})).title,
            "A"
        );
        assert_eq!(normalize_job(&json!({"title": "B"})).title, "B");
        assert_eq!(normalize_job(&json!({})).title, "Unknown Job");
    }

    #[test]
    fn test_missing_everything_degrades() {
        let job = normalize_job(&json!(null));
        assert_eq!(job.title, "Unknown Job");
        assert!(job.required_skills.is_empty());
        assert_eq!(job.company, None);
    }

    #[test]
    fn test_description_is_nested_payload() {
        let job = normalize_job(&json!({"id": 1, "job_data": {"job_title": "X", "summary": "s"}}));
        assert_eq!(job.description, json!({"job_title": "X", "summary": "s"}));
    }

    #[test]
    fn test_structured_data_wrapper() {
        let job = normalize_job(&json!({
            "title": "Flat",
            "structured_data": {"job_title": "Structured"}
        }));
        assert_eq!(job.title, "Structured");
    }

    #[test]
    fn test_sample_job() {
        let sample = normalize_sample_job(&json!({
            "name": "Backend role",
            "data": {"job_title": "Backend Engineer", "required_skills": ["Go"]}
        }));
        assert_eq!(sample.name, "Backend role");
        assert_eq!(sample.job.title, "Backend Engineer");
    }
}
