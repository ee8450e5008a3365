use serde_json::Value;

use super::{first_date, first_id, first_str, u64_at, value_at};
use crate::models::cv::{CvSummary, UNKNOWN_CV};

/// Normalizes a CV record: an upload response (`cv_data` wrapper or flat),
/// a fetch-by-id response, or one entry of the recent CVs list.
pub fn normalize_cv(raw: &Value) -> CvSummary {
    let cv = raw.get("cv_data").filter(|v| v.is_object()).unwrap_or(raw);

    let contact_name = first_str(
        cv,
        &[
            &["contact_name"],
            &["parsed_data", "contact_info", "name"],
            &["contact_info", "name"],
        ],
    );

    let display_name = first_str(cv, &[&["file_upload", "original_filename"]])
        .or_else(|| contact_name.clone())
        .unwrap_or_else(|| UNKNOWN_CV.to_string());

    CvSummary {
        id: first_id(cv, &[&["id"], &["cv_id"], &["cv_record_id"]]),
        filename: first_str(
            cv,
            &[
                &["file_upload", "original_filename"],
                &["original_filename"],
                &["filename"],
            ],
        )
        .unwrap_or_default(),
        display_name,
        upload_date: first_date(
            cv,
            &[
                &["upload_date"],
                &["file_upload", "upload_date"],
                &["created_at"],
            ],
        ),
        contact_name,
        contact_email: first_str(
            cv,
            &[
                &["contact_email"],
                &["parsed_data", "contact_info", "email"],
                &["contact_info", "email"],
            ],
        ),
        file_size_bytes: u64_at(cv, &["file_size"])
            .or_else(|| u64_at(cv, &["file_upload", "file_size"])),
        parsed_data: ["parsed_data", "raw_parsed_json"]
            .iter()
            .find_map(|key| value_at(cv, &[*key]))
            .cloned()
            .unwrap_or_else(|| cv.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_prefers_original_filename() {
        let cv = normalize_cv(&json!({
            "id": 7,
            "file_upload": {"original_filename": "jane_cv.pdf"},
            "contact_name": "Jane Doe",
            "parsed_data": {"contact_info": {"name": "J. Doe"}}
        }));
        assert_eq!(cv.display_name, "jane_cv.pdf");
        assert_eq!(cv.id.as_deref(), Some("7"));
    }

    #[test]
    fn test_display_name_falls_back_to_contact_name() {
        let cv = normalize_cv(&json!({
            "contact_name": "Jane Doe",
            "parsed_data": {"contact_info": {"name": "J. Doe"}}
        }));
        assert_eq!(cv.display_name, "Jane Doe");
    }

    #[test]
    fn test_display_name_falls_back_to_parsed_contact() {
        let cv = normalize_cv(&json!({
            "parsed_data": {"contact_info": {"name": "J. Doe", "email": "j@doe.io"}}
        }));
        assert_eq!(cv.display_name, "J. Doe");
        assert_eq!(cv.contact_email.as_deref(), Some("j@doe.io"));
    }

    #[test]
    fn test_missing_everything_is_unknown_cv() {
        let cv = normalize_cv(&json!({}));
        assert_eq!(cv.display_name, "Unknown CV");
        assert_eq!(cv.id, None);
        assert_eq!(cv.filename, "");
        assert_eq!(cv.upload_date, None);
    }

    #[test]
    fn test_non_object_payload_degrades() {
        let cv = normalize_cv(&json!("garbage"));
        assert_eq!(cv.display_name, "Unknown CV");
    }

    #[test]
    fn test_upload_response_wrapper_is_unwrapped() {
        let cv = normalize_cv(&json!({
            "cv_data": {
                "id": "42",
                "original_filename": "cv.docx",
                "contact_info": {"name": "Sam"},
                "skills": ["Rust"]
            }
        }));
        assert_eq!(cv.id.as_deref(), Some("42"));
        assert_eq!(cv.filename, "cv.docx");
        assert_eq!(cv.display_name, "Sam");
        // Without parsed_data the whole record is the parsed payload.
        assert_eq!(cv.parsed_data["skills"], json!(["Rust"]));
    }

    #[test]
    fn test_parsed_data_passes_through_unmodified() {
        let parsed = json!({"contact_info": {"name": "A"}, "experiences": [{"company": "X"}]});
        let cv = normalize_cv(&json!({"id": 1, "parsed_data": parsed.clone()}));
        assert_eq!(cv.parsed_data, parsed);
    }

    #[test]
    fn test_upload_date_falls_back_to_created_at() {
        let cv = normalize_cv(&json!({"created_at": "2024-03-02T08:00:00"}));
        assert!(cv.upload_date.is_some());
    }

    #[test]
    fn test_file_size_from_file_upload() {
        let cv = normalize_cv(&json!({"file_upload": {"file_size": 2048}}));
        assert_eq!(cv.file_size_bytes, Some(2048));
    }
}
