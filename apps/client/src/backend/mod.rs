//! The backend collaborator. Everything the client knows about the server is
//! this trait: raw JSON payloads in, nothing normalized yet.
//!
//! `Store` holds an `Arc<dyn Backend>`, so tests swap in `FakeBackend`
//! without touching any caller.

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpBackend;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::errors::ClientError;

/// Body of a run-analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub cv_data: Value,
    pub job_description: Value,
    pub detailed: bool,
}

/// REST backend contract. Success payloads come back with the `data`
/// envelope already removed; failures come back as `ClientError::Backend`
/// carrying the body's `detail`/`error` message.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn upload_cv(&self, file_name: &str, content: Bytes) -> Result<Value, ClientError>;

    async fn get_cv(&self, id: &str) -> Result<Value, ClientError>;

    async fn recent_cvs(&self, limit: usize) -> Result<Value, ClientError>;

    /// Server-side schema check of a pasted job description.
    /// Returns `{valid, parsed_data, errors}`.
    async fn validate_job_json(&self, job: &Value) -> Result<Value, ClientError>;

    async fn list_jobs(&self) -> Result<Value, ClientError>;

    async fn get_job(&self, id: &str) -> Result<Value, ClientError>;

    async fn sample_jobs(&self) -> Result<Value, ClientError>;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ClientError>;

    async fn recent_analyses(&self, limit: usize) -> Result<Value, ClientError>;

    async fn get_analysis(&self, id: &str) -> Result<Value, ClientError>;

    async fn public_config(&self) -> Result<Value, ClientError>;

    /// Server-rendered HTML fragment for a page or modal template.
    async fn fragment(&self, name: &str) -> Result<String, ClientError>;
}
