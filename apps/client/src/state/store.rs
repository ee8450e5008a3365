use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{JobInputMode, ResultsTab, Route, ViewState};
use crate::backend::{AnalysisRequest, Backend};
use crate::config::Config;
use crate::errors::ClientError;
use crate::export;
use crate::listing::Criteria;
use crate::models::{AnalysisListItem, AnalysisResult, AnalysisStatistics, CvSummary, JobSummary};
use crate::normalize::{
    list_items, normalize_analysis, normalize_analysis_list_item, normalize_cv, normalize_job,
    normalize_public_config, normalize_sample_job,
};
use crate::notifications::{NotificationCenter, Notifier};
use crate::tracker::{TrackedOp, Tracker};
use crate::upload::{SelectedFile, UploadPolicy};

const RECENT_CVS_LIMIT: usize = 10;
const RECENT_ANALYSES_LIMIT: usize = 50;

const FILE: &str = "File";
const JOB: &str = "Job Description";
const CV: &str = "CV";
const RESULTS: &str = "Results";
const STARTUP: &str = "Startup";

/// Applies user actions to the `ViewState`.
///
/// Each action fetches through the `Backend`, normalizes the payload, writes
/// the canonical record into the view and reports the outcome to the
/// `NotificationCenter`. Failures leave the previous selections in place.
pub struct Store {
    config: Config,
    backend: Arc<dyn Backend>,
    center: NotificationCenter,
    tracker: Tracker,
    policy: UploadPolicy,
    view: ViewState,
}

impl Store {
    pub fn new(config: Config, backend: Arc<dyn Backend>, center: NotificationCenter) -> Self {
        Self {
            policy: config.upload_policy.clone(),
            tracker: Tracker::new(center.clone()),
            config,
            backend,
            center,
            view: ViewState::default(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn center(&self) -> &NotificationCenter {
        &self.center
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A channel-backed notifier for components without a center handle.
    /// Requests are dropped when no Tokio runtime is running.
    pub fn notifier(&self) -> Notifier {
        let (notifier, requests) = Notifier::channel();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(self.center.clone().listen(requests));
            }
            Err(_) => warn!("No async runtime; notifier requests will be dropped"),
        }
        notifier
    }

    // ── Initial load ───────────────────────────────────────────────────────

    /// Loads backend config, sample jobs, saved jobs, recent CVs and recent
    /// analyses. Every failure is logged; it is also notified unless
    /// `silent_initial_load` is set. Returns the sections that failed.
    pub async fn init(&mut self) -> Vec<&'static str> {
        self.view.loading = true;
        info!("Loading initial state from {}", self.config.backend_url);

        let outcomes = [
            ("configuration", self.refresh_public_config().await),
            ("sample jobs", self.refresh_sample_jobs().await.map(drop)),
            ("jobs", self.refresh_jobs().await.map(drop)),
            ("recent CVs", self.refresh_cvs().await.map(drop)),
            ("analysis history", self.refresh_history().await.map(drop)),
        ];

        let mut failed = Vec::new();
        for (section, outcome) in outcomes {
            if let Err(e) = outcome {
                warn!("Initial load of {section} failed: {e}");
                if !self.config.silent_initial_load {
                    self.center.error(
                        STARTUP,
                        format!("Failed to load {section}: {}", e.message_or("request failed")),
                    );
                }
                failed.push(section);
            }
        }

        self.view.loading = false;
        failed
    }

    /// The backend's upload limits replace the local defaults when present.
    pub async fn refresh_public_config(&mut self) -> Result<(), ClientError> {
        let public = normalize_public_config(&self.backend.public_config().await?);
        if let Some(mb) = public.max_file_size_mb {
            self.policy.max_file_size_mb = mb;
        }
        if !public.allowed_extensions.is_empty() {
            self.policy.allowed_extensions = public.allowed_extensions;
        }
        info!(
            "Upload policy: {} up to {}MB",
            self.policy.allowed_extensions.join(", "),
            self.policy.max_file_size_mb
        );
        Ok(())
    }

    pub async fn refresh_sample_jobs(&mut self) -> Result<usize, ClientError> {
        let payload = self.backend.sample_jobs().await?;
        if payload.get("success").and_then(Value::as_bool) == Some(false) {
            warn!("Backend reported no sample jobs");
        }
        self.view.sample_jobs = list_items(&payload, &["samples", "sample_jobs"])
            .iter()
            .map(normalize_sample_job)
            .collect();
        debug!("Loaded {} sample jobs", self.view.sample_jobs.len());
        Ok(self.view.sample_jobs.len())
    }

    pub async fn refresh_jobs(&mut self) -> Result<usize, ClientError> {
        let payload = self.backend.list_jobs().await?;
        let jobs: Vec<JobSummary> = list_items(&payload, &["jobs", "job_descriptions", "items"])
            .iter()
            .map(normalize_job)
            .collect();
        debug!("Loaded {} jobs", jobs.len());
        self.view.jobs.replace(jobs);
        Ok(self.view.jobs.items().len())
    }

    pub async fn refresh_cvs(&mut self) -> Result<usize, ClientError> {
        let payload = self.backend.recent_cvs(RECENT_CVS_LIMIT).await?;
        let cvs: Vec<CvSummary> = list_items(&payload, &["cvs", "items", "results"])
            .iter()
            .map(normalize_cv)
            .collect();
        debug!("Loaded {} recent CVs", cvs.len());
        self.view.recent_cvs.replace(cvs);
        Ok(self.view.recent_cvs.items().len())
    }

    pub async fn refresh_history(&mut self) -> Result<usize, ClientError> {
        let payload = self.backend.recent_analyses(RECENT_ANALYSES_LIMIT).await?;
        let now = Utc::now();
        let items: Vec<AnalysisListItem> = list_items(&payload, &["analyses", "items", "results"])
            .iter()
            .map(|raw| normalize_analysis_list_item(raw, now))
            .collect();
        debug!("Loaded {} recent analyses", items.len());
        self.view.recent_analyses.replace(items);
        Ok(self.view.recent_analyses.items().len())
    }

    // ── CV ─────────────────────────────────────────────────────────────────

    /// Validates a picked file locally. Nothing is sent to the backend.
    pub fn select_file(&mut self, path: &Path) -> Result<(), ClientError> {
        let file = self.report(FILE, "Invalid file", SelectedFile::inspect(path, &self.policy))?;
        info!("Selected {} ({} bytes)", file.file_name, file.size_bytes);
        self.view.selected_file = Some(file);
        self.center.success(FILE, "File selected successfully");
        Ok(())
    }

    pub fn remove_file(&mut self) {
        self.view.selected_file = None;
    }

    /// Uploads the selected file. On success the parsed CV becomes current
    /// and the file selection is cleared; on failure both stay as they were.
    pub async fn upload_cv(&mut self) -> Result<CvSummary, ClientError> {
        let Some(file) = self.view.selected_file.clone() else {
            return Err(self.missing("a file"));
        };

        let backend = Arc::clone(&self.backend);
        let payload = self
            .tracker
            .run(&mut self.view.upload, &TrackedOp::UPLOAD, move || async move {
                let content = tokio::fs::read(&file.path).await.map_err(|e| {
                    ClientError::Validation(format!("Cannot read {}: {e}", file.file_name))
                })?;
                backend.upload_cv(&file.file_name, Bytes::from(content)).await
            })
            .await?;

        let cv = normalize_cv(&payload);
        info!("Uploaded CV {:?} as {}", cv.id, cv.display_name);
        self.view.current_cv = Some(cv.clone());
        self.view.selected_file = None;
        self.view.recent_cvs.push_front(cv.clone());
        self.view.recent_cvs.truncate(RECENT_CVS_LIMIT);
        Ok(cv)
    }

    /// Makes a previously uploaded CV current.
    pub async fn load_cv(&mut self, id: &str) -> Result<CvSummary, ClientError> {
        let payload = self.backend.get_cv(id).await;
        let cv = normalize_cv(&self.report(CV, "Failed to load CV", payload)?);
        self.center.success(CV, format!("Selected: {}", cv.display_name));
        self.view.current_cv = Some(cv.clone());
        Ok(cv)
    }

    // ── Job description ────────────────────────────────────────────────────

    pub fn set_job_input(&mut self, mode: JobInputMode) {
        self.view.job_input = mode;
    }

    pub fn set_job_json(&mut self, text: impl Into<String>) {
        self.view.job_json = text.into();
        self.view.job_input = JobInputMode::Json;
    }

    /// Makes the sample at `index` current and copies its JSON into the
    /// editor buffer.
    pub fn select_sample_job(&mut self, index: usize) -> Result<JobSummary, ClientError> {
        let sample = self.view.sample_jobs.get(index).cloned().ok_or_else(|| {
            ClientError::Validation(format!("No sample job at position {index}"))
        })?;

        self.view.job_json = serde_json::to_string_pretty(&sample.job.description)?;
        self.view.job_input = JobInputMode::Sample;
        self.view.current_job = Some(sample.job.clone());
        self.center.success(JOB, format!("Selected: {}", sample.job.title));
        Ok(sample.job)
    }

    /// Parses the editor buffer locally, then has the backend check it.
    /// A local parse failure never reaches the backend.
    pub async fn validate_job_json(&mut self) -> Result<JobSummary, ClientError> {
        let parsed: Value = match serde_json::from_str(&self.view.job_json) {
            Ok(value) => value,
            Err(e) => {
                let message = format!("Invalid JSON: {e}");
                self.center.error(JOB, message.clone());
                return Err(ClientError::Validation(message));
            }
        };

        let response = self.backend.validate_job_json(&parsed).await;
        let response = self.report(JOB, "Validation failed", response)?;

        if response.get("valid").and_then(Value::as_bool).unwrap_or(false) {
            let data = response
                .get("parsed_data")
                .filter(|v| v.is_object())
                .unwrap_or(&parsed);
            let job = normalize_job(data);
            self.view.current_job = Some(job.clone());
            self.center.success(JOB, "Valid job description format!");
            Ok(job)
        } else {
            let errors = response
                .get("errors")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
            let message = format!("Invalid format: {errors}");
            self.center.error(JOB, message.clone());
            Err(ClientError::Validation(message))
        }
    }

    /// Makes a saved job description current.
    pub async fn select_job(&mut self, id: &str) -> Result<JobSummary, ClientError> {
        let payload = self.backend.get_job(id).await;
        let job = normalize_job(&self.report(JOB, "Failed to load job description", payload)?);
        self.view.job_input = JobInputMode::Saved;
        self.view.current_job = Some(job.clone());
        self.center.success(JOB, format!("Selected: {}", job.title));
        Ok(job)
    }

    // ── Analysis ───────────────────────────────────────────────────────────

    /// Runs the analysis of the current CV against the current job. On
    /// success the result becomes current and the view moves to Results.
    pub async fn analyze(&mut self) -> Result<AnalysisResult, ClientError> {
        let cv = match self.view.current_cv.clone() {
            Some(cv) => cv,
            None => return Err(self.missing("a CV")),
        };
        let job = match self.view.current_job.clone() {
            Some(job) => job,
            None => return Err(self.missing("a job description")),
        };

        let request = AnalysisRequest {
            cv_id: cv.id.clone(),
            job_id: job.id.clone(),
            cv_data: cv.parsed_data.clone(),
            job_description: job.description.clone(),
            detailed: true,
        };
        let backend = Arc::clone(&self.backend);
        let payload = self
            .tracker
            .run(&mut self.view.analysis, &TrackedOp::ANALYSIS, move || async move {
                backend.analyze(&request).await
            })
            .await?;

        let result = normalize_analysis(&payload);
        info!(
            "Analysis {:?}: {} scored {}",
            result.id, cv.display_name, result.suitability_score
        );
        self.view.recent_analyses.push_front(AnalysisListItem {
            id: result.id.clone(),
            cv_name: cv.display_name,
            job_title: job.title,
            company: job.company,
            score: result.suitability_score,
            date: result.analysis_date.unwrap_or_else(Utc::now),
        });
        self.view.recent_analyses.truncate(RECENT_ANALYSES_LIMIT);
        self.show_result(result.clone());
        Ok(result)
    }

    /// Opens a stored analysis from the history.
    pub async fn load_analysis(&mut self, id: &str) -> Result<AnalysisResult, ClientError> {
        let payload = self.backend.get_analysis(id).await;
        let result = normalize_analysis(&self.report(RESULTS, "Failed to load analysis", payload)?);
        self.show_result(result.clone());
        Ok(result)
    }

    fn show_result(&mut self, result: AnalysisResult) {
        self.view.current_analysis = Some(result);
        self.view.route = Route::Results;
        self.view.results_tab = ResultsTab::Summary;
    }

    /// Clears every selection and returns to the upload page.
    pub fn start_new_analysis(&mut self) {
        self.view.current_analysis = None;
        self.view.current_job = None;
        self.view.job_json.clear();
        self.view.current_cv = None;
        self.view.selected_file = None;
        self.view.job_input = JobInputMode::Sample;
        self.view.route = Route::Upload;
        self.view.results_tab = ResultsTab::Summary;
        self.center.success("Analysis", "Ready for new analysis");
    }

    /// Writes the current analysis to `dir` and returns the file path.
    pub fn export_results(&self, dir: &Path) -> Result<PathBuf, ClientError> {
        let Some(result) = self.view.current_analysis.as_ref() else {
            return Err(self.missing("an analysis"));
        };
        let written = export::write_export(result, dir, Utc::now().date_naive());
        let path = self.report("Export", "Export failed", written)?;
        self.center.success("Export", "Results exported successfully!");
        Ok(path)
    }

    pub fn statistics(&self) -> AnalysisStatistics {
        AnalysisStatistics::from_items(self.view.recent_analyses.items())
    }

    // ── Navigation and filters ─────────────────────────────────────────────

    /// Switches pages. Results is refused until an analysis is loaded.
    pub fn set_route(&mut self, route: Route) -> bool {
        if route == Route::Results && !self.view.can_view_results() {
            debug!("No analysis loaded; staying on {:?}", self.view.route);
            return false;
        }
        self.view.route = route;
        true
    }

    pub fn set_results_tab(&mut self, tab: ResultsTab) {
        self.view.results_tab = tab;
    }

    pub fn filter_jobs(&mut self, criteria: Criteria) {
        self.view.jobs.set_criteria(criteria);
    }

    pub fn filter_cvs(&mut self, criteria: Criteria) {
        self.view.recent_cvs.set_criteria(criteria);
    }

    pub fn filter_history(&mut self, criteria: Criteria) {
        self.view.recent_analyses.set_criteria(criteria);
    }

    /// Server-rendered HTML for a page or modal.
    pub async fn fragment(&self, name: &str) -> Result<String, ClientError> {
        let html = self.backend.fragment(name).await;
        self.report("Template", "Failed to load template", html)
    }

    // ── Internals ──────────────────────────────────────────────────────────

    /// Passes `result` through, raising an error notification on failure.
    fn report<T>(
        &self,
        title: &str,
        fallback: &str,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        result.map_err(|e| {
            warn!("{title}: {e}");
            self.center.error(title, e.message_or(fallback));
            e
        })
    }

    fn missing(&self, what: &'static str) -> ClientError {
        let err = ClientError::MissingSelection(what);
        self.center.warning("Selection", err.message_or("Nothing selected"));
        err
    }
}
