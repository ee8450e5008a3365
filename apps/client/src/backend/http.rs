//! reqwest implementation of `Backend`.
//!
//! Timeouts are the HTTP client's business; nothing above this layer imposes
//! its own deadline.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use super::{AnalysisRequest, Backend};
use crate::errors::ClientError;
use crate::normalize::{error_message, unwrap_envelope};

const UPLOAD_CV_ENDPOINT: &str = "/api/cv/upload";
const CV_ENDPOINT: &str = "/api/cv";
const RECENT_CVS_ENDPOINT: &str = "/api/cv/recent";
const VALIDATE_JOB_ENDPOINT: &str = "/api/cv/validate-job-json";
const ANALYZE_ENDPOINT: &str = "/api/cv/analyze";
const JOBS_ENDPOINT: &str = "/api/jobs";
const SAMPLE_JOBS_ENDPOINT: &str = "/api/sample-job-descriptions";
const ANALYSIS_ENDPOINT: &str = "/api/analysis";
const RECENT_ANALYSES_ENDPOINT: &str = "/api/analysis/recent";
const CONFIG_ENDPOINT: &str = "/api/config";
const TEMPLATES_ENDPOINT: &str = "/api/templates";

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and returns the unwrapped JSON payload.
    /// Non-2xx bodies are mined for a `detail`/`error` message.
    async fn send_json(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| error_message(&v));
            warn!("Backend returned {}: {}", status, body);
            return Err(ClientError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Backend returned {} ({} bytes)", status, body.len());
        let payload: Value = serde_json::from_str(&body)?;
        Ok(unwrap_envelope(payload))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload_cv(&self, file_name: &str, content: Bytes) -> Result<Value, ClientError> {
        let form = Form::new().part(
            "file",
            Part::bytes(content.to_vec()).file_name(file_name.to_string()),
        );
        debug!("Uploading {} ({} bytes)", file_name, content.len());
        self.send_json(self.client.post(self.url(UPLOAD_CV_ENDPOINT)).multipart(form))
            .await
    }

    async fn get_cv(&self, id: &str) -> Result<Value, ClientError> {
        self.send_json(self.client.get(self.url(&format!("{CV_ENDPOINT}/{id}"))))
            .await
    }

    async fn recent_cvs(&self, limit: usize) -> Result<Value, ClientError> {
        self.send_json(
            self.client
                .get(self.url(RECENT_CVS_ENDPOINT))
                .query(&[("limit", limit)]),
        )
        .await
    }

    async fn validate_job_json(&self, job: &Value) -> Result<Value, ClientError> {
        self.send_json(self.client.post(self.url(VALIDATE_JOB_ENDPOINT)).json(job))
            .await
    }

    async fn list_jobs(&self) -> Result<Value, ClientError> {
        self.send_json(self.client.get(self.url(JOBS_ENDPOINT))).await
    }

    async fn get_job(&self, id: &str) -> Result<Value, ClientError> {
        self.send_json(self.client.get(self.url(&format!("{JOBS_ENDPOINT}/{id}"))))
            .await
    }

    async fn sample_jobs(&self) -> Result<Value, ClientError> {
        self.send_json(self.client.get(self.url(SAMPLE_JOBS_ENDPOINT)))
            .await
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ClientError> {
        self.send_json(self.client.post(self.url(ANALYZE_ENDPOINT)).json(request))
            .await
    }

    async fn recent_analyses(&self, limit: usize) -> Result<Value, ClientError> {
        self.send_json(
            self.client
                .get(self.url(RECENT_ANALYSES_ENDPOINT))
                .query(&[("limit", limit)]),
        )
        .await
    }

    async fn get_analysis(&self, id: &str) -> Result<Value, ClientError> {
        self.send_json(
            self.client
                .get(self.url(&format!("{ANALYSIS_ENDPOINT}/{id}"))),
        )
        .await
    }

    async fn public_config(&self) -> Result<Value, ClientError> {
        self.send_json(self.client.get(self.url(CONFIG_ENDPOINT))).await
    }

    async fn fragment(&self, name: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("{TEMPLATES_ENDPOINT}/{name}")))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Backend {
                status: status.as_u16(),
                message: serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| error_message(&v)),
            });
        }
        Ok(body)
    }
}
