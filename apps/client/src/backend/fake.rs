//! In-memory `Backend` for unit tests: canned responses per endpoint, a call
//! log, and an optional artificial latency to exercise progress timers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use super::{AnalysisRequest, Backend};
use crate::errors::ClientError;

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Ok(Value),
    Fail { status: u16, message: Option<String> },
}

#[derive(Default)]
pub struct FakeBackend {
    responses: Mutex<HashMap<&'static str, FakeResponse>>,
    calls: Mutex<Vec<&'static str>>,
    requests: Mutex<Vec<Value>>,
    delay: Duration,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, endpoint: &'static str, payload: Value) -> Self {
        self.set(endpoint, FakeResponse::Ok(payload));
        self
    }

    pub fn failing(self, endpoint: &'static str, status: u16, message: Option<&str>) -> Self {
        self.set(
            endpoint,
            FakeResponse::Fail {
                status,
                message: message.map(str::to_string),
            },
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set(&self, endpoint: &'static str, response: FakeResponse) {
        self.responses.lock().unwrap().insert(endpoint, response);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == endpoint)
            .count()
    }

    /// JSON bodies sent to `validate_job_json` and `analyze`, in order.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    async fn respond(&self, endpoint: &'static str) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(endpoint);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let response = self.responses.lock().unwrap().get(endpoint).cloned();
        match response {
            Some(FakeResponse::Ok(payload)) => Ok(payload),
            Some(FakeResponse::Fail { status, message }) => {
                Err(ClientError::Backend { status, message })
            }
            None => Err(ClientError::Backend {
                status: 404,
                message: Some(format!("no fake response for {endpoint}")),
            }),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn upload_cv(&self, _file_name: &str, _content: Bytes) -> Result<Value, ClientError> {
        self.respond("upload_cv").await
    }

    async fn get_cv(&self, _id: &str) -> Result<Value, ClientError> {
        self.respond("get_cv").await
    }

    async fn recent_cvs(&self, _limit: usize) -> Result<Value, ClientError> {
        self.respond("recent_cvs").await
    }

    async fn validate_job_json(&self, job: &Value) -> Result<Value, ClientError> {
        self.requests.lock().unwrap().push(job.clone());
        self.respond("validate_job_json").await
    }

    async fn list_jobs(&self) -> Result<Value, ClientError> {
        self.respond("list_jobs").await
    }

    async fn get_job(&self, _id: &str) -> Result<Value, ClientError> {
        self.respond("get_job").await
    }

    async fn sample_jobs(&self) -> Result<Value, ClientError> {
        self.respond("sample_jobs").await
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request)?);
        self.respond("analyze").await
    }

    async fn recent_analyses(&self, _limit: usize) -> Result<Value, ClientError> {
        self.respond("recent_analyses").await
    }

    async fn get_analysis(&self, _id: &str) -> Result<Value, ClientError> {
        self.respond("get_analysis").await
    }

    async fn public_config(&self) -> Result<Value, ClientError> {
        self.respond("public_config").await
    }

    async fn fragment(&self, name: &str) -> Result<String, ClientError> {
        self.respond("fragment")
            .await
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| format!("<div>{name}</div>")))
    }
}
