//! View state: the one mutable aggregate every renderer reads, and the
//! `Store` that applies user actions to it.

pub mod store;

pub use store::Store;

use serde::{Deserialize, Serialize};

use crate::listing::Collection;
use crate::models::{AnalysisListItem, AnalysisResult, CvSummary, JobSummary, SampleJob};
use crate::tracker::{OperationSlot, ProgressPlan};
use crate::upload::SelectedFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    Upload,
    Jobs,
    History,
    Results,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultsTab {
    #[default]
    Summary,
    Skills,
    Recommendations,
    Details,
}

/// How the job description is being provided on the upload page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobInputMode {
    #[default]
    Sample,
    Json,
    Saved,
}

/// Everything the UI renders from. Upload and analysis write disjoint
/// fields, so neither can clobber the other's state.
#[derive(Debug)]
pub struct ViewState {
    pub route: Route,
    pub results_tab: ResultsTab,
    pub job_input: JobInputMode,

    pub selected_file: Option<SelectedFile>,
    pub current_cv: Option<CvSummary>,
    /// Editor buffer for a pasted job description.
    pub job_json: String,
    pub current_job: Option<JobSummary>,
    pub current_analysis: Option<AnalysisResult>,

    pub sample_jobs: Vec<SampleJob>,
    pub jobs: Collection<JobSummary>,
    pub recent_cvs: Collection<CvSummary>,
    pub recent_analyses: Collection<AnalysisListItem>,

    pub upload: OperationSlot,
    pub analysis: OperationSlot,
    /// True while the initial load is running.
    pub loading: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            route: Route::default(),
            results_tab: ResultsTab::default(),
            job_input: JobInputMode::default(),
            selected_file: None,
            current_cv: None,
            job_json: String::new(),
            current_job: None,
            current_analysis: None,
            sample_jobs: Vec::new(),
            jobs: Collection::default(),
            recent_cvs: Collection::default(),
            recent_analyses: Collection::default(),
            upload: OperationSlot::new(ProgressPlan::busy_only()),
            analysis: OperationSlot::new(ProgressPlan::analysis()),
            loading: false,
        }
    }
}

impl ViewState {
    pub fn can_analyze(&self) -> bool {
        self.current_cv.is_some() && self.current_job.is_some() && !self.analysis.is_busy()
    }

    pub fn can_view_results(&self) -> bool {
        self.current_analysis.is_some()
    }
}
