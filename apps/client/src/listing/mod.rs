//! List Filter/Sort Engine: free-text, score bucket and facet filters plus a
//! single sort key, re-applied in full whenever the criteria change.

pub mod criteria;

pub use criteria::{Criteria, ScoreBucket, SortKey};

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::{AnalysisListItem, CvSummary, JobSummary};

/// An item the engine can filter and sort.
pub trait Listable {
    /// Fields searched by the free-text query.
    fn search_fields(&self) -> Vec<&str>;

    /// Name used by `SortKey::Name`.
    fn name(&self) -> &str;

    fn score(&self) -> Option<u32> {
        None
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn facet(&self, _key: &str) -> Option<&str> {
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub fn matches<T: Listable>(item: &T, criteria: &Criteria) -> bool {
    let query = criteria.query.trim().to_lowercase();
    if !query.is_empty()
        && !item
            .search_fields()
            .iter()
            .any(|f| f.to_lowercase().contains(&query))
    {
        return false;
    }

    if let Some(bucket) = criteria.bucket {
        // Items without a score never fall into a bucket.
        match item.score() {
            Some(score) if bucket.contains(score) => {}
            _ => return false,
        }
    }

    criteria.facets.iter().all(|(key, wanted)| {
        item.facet(key)
            .map(|v| v.eq_ignore_ascii_case(wanted.trim()))
            .unwrap_or(false)
    })
}

fn compare<T: Listable>(a: &T, b: &T, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => match (a.date(), b.date()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Score => match (a.score(), b.score()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
    }
}

/// Indices of `items` that pass `criteria`, in sorted order. The sort is
/// stable, so ties keep their original order.
pub fn apply<T: Listable>(items: &[T], criteria: &Criteria) -> Vec<usize> {
    let mut view: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches(*item, criteria))
        .map(|(i, _)| i)
        .collect();
    view.sort_by(|&a, &b| compare(&items[a], &items[b], criteria.sort));
    view
}

/// A loaded collection paired with its filtered, sorted projection.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    view: Vec<usize>,
    criteria: Criteria,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            view: Vec::new(),
            criteria: Criteria::default(),
        }
    }
}

impl<T: Listable> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut collection = Self {
            items,
            ..Self::default()
        };
        collection.refresh();
        collection
    }

    /// Swaps the base items and re-applies the current criteria.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.refresh();
    }

    pub fn push_front(&mut self, item: T) {
        self.items.insert(0, item);
        self.refresh();
    }

    /// Keeps the first `len` base items.
    pub fn truncate(&mut self, len: usize) {
        if self.items.len() > len {
            self.items.truncate(len);
            self.refresh();
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn view(&self) -> impl Iterator<Item = &T> + '_ {
        self.view.iter().map(|&i| &self.items[i])
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: Criteria) {
        self.criteria = criteria;
        self.refresh();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.criteria.query = query.into();
        self.refresh();
    }

    pub fn set_bucket(&mut self, bucket: Option<ScoreBucket>) {
        self.criteria.bucket = bucket;
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.criteria.sort = sort;
        self.refresh();
    }

    /// `None` removes the facet.
    pub fn set_facet(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(v) if !v.trim().is_empty() => {
                self.criteria.facets.insert(key.to_string(), v.to_string());
            }
            _ => {
                self.criteria.facets.remove(key);
            }
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        self.view = apply(&self.items, &self.criteria);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Listable records
// ────────────────────────────────────────────────────────────────────────────

impl Listable for JobSummary {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.company.as_deref());
        fields.extend(self.location.as_deref());
        fields.extend(self.required_skills.iter().map(String::as_str));
        fields
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "experience_level" => self.experience_level.as_deref(),
            "location" => self.location.as_deref(),
            "company" => self.company.as_deref(),
            _ => None,
        }
    }
}

impl Listable for CvSummary {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.display_name.as_str(), self.filename.as_str()];
        fields.extend(self.contact_name.as_deref());
        fields.extend(self.contact_email.as_deref());
        fields
    }

    fn name(&self) -> &str {
        &self.display_name
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.upload_date
    }
}

impl Listable for AnalysisListItem {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.cv_name.as_str(), self.job_title.as_str()];
        fields.extend(self.company.as_deref());
        fields
    }

    fn name(&self) -> &str {
        &self.job_title
    }

    fn score(&self) -> Option<u32> {
        Some(self.score)
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        Some(self.date)
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "company" => self.company.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use super::*;

    fn analysis(job: &str, score: u32, days_ago: i64) -> AnalysisListItem {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        AnalysisListItem {
            id: Some(format!("{job}-{score}")),
            cv_name: "jane_doe.pdf".to_string(),
            job_title: job.to_string(),
            company: Some("Acme".to_string()),
            score,
            date: base - Duration::days(days_ago),
        }
    }

    fn history() -> Vec<AnalysisListItem> {
        vec![
            analysis("Platform Engineer", 10, 0),
            analysis("backend developer", 49, 1),
            analysis("Data Scientist", 50, 2),
            analysis("Analyst", 55, 3),
            analysis("QA Engineer", 69, 4),
            analysis("Architect", 70, 5),
            analysis("DevOps Lead", 85, 6),
            analysis("Mobile Developer", 60, 7),
            analysis("Support Engineer", 40, 8),
            analysis("CTO", 99, 9),
        ]
    }

    fn job(title: &str, level: &str) -> JobSummary {
        JobSummary {
            id: None,
            title: title.to_string(),
            company: None,
            location: Some("Berlin".to_string()),
            experience_level: Some(level.to_string()),
            required_skills: vec!["Rust".to_string()],
            created_at: None,
            description: json!({}),
        }
    }

    #[test]
    fn test_medium_bucket_selects_half_open_range() {
        let items = history();
        let criteria = Criteria::default().with_bucket(ScoreBucket::Medium);
        let scores: Vec<u32> = apply(&items, &criteria)
            .into_iter()
            .map(|i| items[i].score)
            .collect();

        assert_eq!(scores.len(), 4);
        assert!(scores.iter().all(|s| (50..70).contains(s)));
    }

    #[test]
    fn test_sort_by_job_is_case_insensitive_ascending() {
        let collection = {
            let mut c = Collection::new(history());
            c.set_sort("job".parse().unwrap());
            c
        };
        let titles: Vec<&str> = collection.view().map(|a| a.job_title.as_str()).collect();

        let mut expected = titles.clone();
        expected.sort_by_key(|t| t.to_lowercase());
        assert_eq!(titles, expected);
        assert_eq!(titles[0], "Analyst");
        assert_eq!(titles[2], "backend developer");
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let collection = Collection::new(history());
        let first = collection.view().next().unwrap();
        assert_eq!(first.job_title, "Platform Engineer");
    }

    #[test]
    fn test_score_sort_descending() {
        let mut collection = Collection::new(history());
        collection.set_sort(SortKey::Score);
        let scores: Vec<u32> = collection.view().map(|a| a.score).collect();
        assert_eq!(scores[0], 99);
        assert_eq!(*scores.last().unwrap(), 10);
    }

    #[test]
    fn test_query_matches_any_configured_field() {
        let mut collection = Collection::new(history());
        collection.set_query("ENGINEER");
        assert_eq!(collection.view_len(), 3);

        collection.set_query("acme");
        assert_eq!(collection.view_len(), 10);

        collection.set_query("   ");
        assert_eq!(collection.view_len(), 10);
    }

    #[test]
    fn test_criteria_change_reruns_from_base() {
        let mut collection = Collection::new(history());
        collection.set_bucket(Some(ScoreBucket::High));
        assert_eq!(collection.view_len(), 3);
        collection.set_bucket(Some(ScoreBucket::Low));
        assert_eq!(collection.view_len(), 3);
        collection.set_bucket(None);
        assert_eq!(collection.view_len(), 10);
    }

    #[test]
    fn test_bucket_excludes_unscored_items() {
        let jobs = vec![job("Rust Dev", "senior")];
        let criteria = Criteria::default().with_bucket(ScoreBucket::Low);
        assert!(apply(&jobs, &criteria).is_empty());
    }

    #[test]
    fn test_facet_filter_is_exact_and_case_insensitive() {
        let mut collection = Collection::new(vec![
            job("Rust Dev", "Senior"),
            job("Go Dev", "junior"),
            job("Lead", "senior-plus"),
        ]);
        collection.set_facet("experience_level", Some("senior"));
        let titles: Vec<&str> = collection.view().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Rust Dev"]);

        collection.set_facet("experience_level", None);
        assert_eq!(collection.view_len(), 3);
    }

    #[test]
    fn test_skill_search_on_jobs() {
        let mut collection = Collection::new(vec![job("Backend", "mid")]);
        collection.set_query("rust");
        assert_eq!(collection.view_len(), 1);
        collection.set_query("python");
        assert_eq!(collection.view_len(), 0);
    }

    #[test]
    fn test_truncate_drops_oldest_inserts_and_refreshes_view() {
        let mut collection = Collection::new(history());
        collection.set_bucket(Some(ScoreBucket::High));
        assert_eq!(collection.view_len(), 3);

        collection.push_front(analysis("Staff Engineer", 90, -1));
        collection.truncate(5);
        assert_eq!(collection.items().len(), 5);
        assert_eq!(collection.items()[0].job_title, "Staff Engineer");
        let titles: Vec<&str> = collection.view().map(|a| a.job_title.as_str()).collect();
        assert_eq!(titles, vec!["Staff Engineer"]);

        collection.truncate(10);
        assert_eq!(collection.items().len(), 5);
    }
}
