use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use super::fallback::{RemoteScript, ScriptOutput, ScriptRunner};
use super::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{IndexServerError, IndexServerResult};

/// Transport answering from a queue of canned responses
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request
    pub fn with_response(mut self, status: StatusCode, body: &str) -> Self {
        self.responses
            .get_mut()
            .push_back(HttpResponse::new(status, body));
        self
    }

    pub fn with_json(self, body: serde_json::Value) -> Self {
        self.with_response(StatusCode::OK, &body.to_string())
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> IndexServerResult<HttpResponse> {
        self.requests.lock().await.push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| IndexServerError::unexpected_response("no mock response queued"))
    }
}

/// Script runner answering from a queue of canned outputs
#[derive(Debug, Default)]
pub struct MockScriptRunner {
    outputs: Mutex<VecDeque<ScriptOutput>>,
    invocations: Mutex<Vec<(String, RemoteScript)>>,
}

impl MockScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: ScriptOutput) -> Self {
        self.outputs.get_mut().push_back(output);
        self
    }

    /// `(client name, script)` pairs run so far
    pub async fn invocations(&self) -> Vec<(String, RemoteScript)> {
        self.invocations.lock().await.clone()
    }
}

#[async_trait]
impl ScriptRunner for MockScriptRunner {
    async fn run_script(
        &self,
        client_name: &str,
        script: &RemoteScript,
    ) -> IndexServerResult<ScriptOutput> {
        self.invocations
            .lock()
            .await
            .push((client_name.to_string(), script.clone()));
        self.outputs
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| IndexServerError::fallback_failed("no mock script output queued"))
    }
}
