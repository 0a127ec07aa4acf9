//! Executes compiled queries and admin requests against a resolved node.
//!
//! Reads go over the primary HTTP transport. A forbidden answer moves the read
//! to the remote script channel, which fetches the same URL from the proxy
//! node. Deletes, commits, core listing and health checks have no fallback.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{IndexServerError, IndexServerResult};
use crate::logging::features::{LogFeature, PerformanceTimer};
use crate::query::CompiledQuery;
use crate::topology::ExecutionTarget;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, RemoteScript, ScriptRunner};

/// Window in milliseconds within which deletes are committed
pub const DELETE_COMMIT_WITHIN_MS: u64 = 1000;

/// Cores hosted by a node
#[derive(Debug, Clone, PartialEq)]
pub struct CoreListing {
    /// Core names in payload order
    pub names: Vec<String>,
    /// Per-core status objects keyed by core name
    pub status: Map<String, Value>,
}

/// Progress of a read request.
///
/// Transitions depend only on the primary transport's status code.
#[derive(Debug)]
enum ExecutionState {
    Direct,
    FallbackDispatch,
    Done(Value),
    Failed(IndexServerError),
}

/// Runs requests over the primary transport and the optional fallback channel
#[derive(Clone)]
pub struct QueryExecutor {
    transport: Arc<dyn HttpTransport>,
    script_runner: Option<Arc<dyn ScriptRunner>>,
    fallback_enabled: bool,
}

impl QueryExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            script_runner: None,
            fallback_enabled: true,
        }
    }

    pub fn with_script_runner(mut self, runner: Arc<dyn ScriptRunner>) -> Self {
        self.script_runner = Some(runner);
        self
    }

    /// When disabled, a forbidden read fails with [`IndexServerError::TransportRejected`]
    pub fn with_fallback_enabled(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    /// Run a select query and return the parsed payload
    pub async fn execute_read(
        &self,
        target: &ExecutionTarget,
        core: &str,
        query: &CompiledQuery,
    ) -> IndexServerResult<Value> {
        let url = format!("{}/select?{}", core_url(target, core), query);
        let request_id = Uuid::new_v4();
        let timer = PerformanceTimer::new(LogFeature::Transport, format!("read {}", request_id));
        crate::log_transport_info!(
            "[{}] Querying core '{}' on node '{}'",
            request_id,
            core,
            target.node_name
        );

        let mut state = ExecutionState::Direct;
        let result = loop {
            state = match state {
                ExecutionState::Direct => match self.transport.send(HttpRequest::get(&url)).await {
                    Ok(response) => self.after_direct_read(&url, response),
                    Err(e) => ExecutionState::Failed(e),
                },
                ExecutionState::FallbackDispatch => {
                    crate::log_fallback_warn!(
                        "[{}] Direct access forbidden, fetching {} through node '{}'",
                        request_id,
                        url,
                        target.node_name
                    );
                    self.dispatch_fallback(&url, target).await
                }
                ExecutionState::Done(payload) => break Ok(payload),
                ExecutionState::Failed(e) => break Err(e),
            };
        };

        match &result {
            Ok(_) => crate::log_transport_debug!("[{}] Query succeeded", request_id),
            Err(e) => crate::log_transport_error!("[{}] Query failed: {}", request_id, e),
        }
        timer.finish();
        result
    }

    fn after_direct_read(&self, url: &str, response: HttpResponse) -> ExecutionState {
        if response.is_success() {
            return match response.json() {
                Some(payload) if !is_empty_payload(&payload) => ExecutionState::Done(payload),
                _ => ExecutionState::Failed(IndexServerError::unexpected_response(format!(
                    "select on {} returned no JSON payload",
                    url
                ))),
            };
        }

        if response.is_forbidden() && self.fallback_enabled {
            return ExecutionState::FallbackDispatch;
        }

        ExecutionState::Failed(rejected(url, &response))
    }

    async fn dispatch_fallback(&self, url: &str, target: &ExecutionTarget) -> ExecutionState {
        let runner = match &self.script_runner {
            Some(runner) => runner,
            None => {
                return ExecutionState::Failed(IndexServerError::fallback_failed(
                    "no remote script channel configured",
                ))
            }
        };

        let script = RemoteScript::http_get(url, target.os_type);
        let output = match runner.run_script(&target.node_name, &script).await {
            Ok(output) => output,
            Err(e) => return ExecutionState::Failed(e),
        };
        crate::log_fallback_info!(
            "Script on '{}' exited with code {}",
            target.node_name,
            output.exit_code
        );

        if output.exit_code != 0 {
            return ExecutionState::Failed(IndexServerError::fallback_failed(format!(
                "script exited with code {}",
                output.exit_code
            )));
        }
        if !output.stderr.is_empty() {
            return ExecutionState::Failed(IndexServerError::fallback_failed(output.stderr));
        }

        match serde_json::from_str::<Value>(output.stdout.trim()) {
            Ok(payload) => {
                crate::log_fallback_info!("Fallback query through '{}' succeeded", target.node_name);
                ExecutionState::Done(payload)
            }
            Err(e) => {
                crate::log_fallback_error!("Script output from '{}' is not JSON: {}", target.node_name, e);
                ExecutionState::Failed(IndexServerError::fallback_failed(format!(
                    "unparseable script output: {}",
                    output.stdout
                )))
            }
        }
    }

    /// Delete every document matching the compiled read query
    pub async fn execute_delete_by_query(
        &self,
        target: &ExecutionTarget,
        core: &str,
        query: &CompiledQuery,
    ) -> IndexServerResult<()> {
        let url = format!(
            "{}/update?commitWithin={}&overwrite=true&wt=json",
            core_url(target, core),
            DELETE_COMMIT_WITHIN_MS
        );
        let envelope = json!({ "delete": { "query": query.delete_clause() } });
        crate::log_transport_info!(
            "Deleting from core '{}' on node '{}' where {}",
            core,
            target.node_name,
            query.delete_clause()
        );

        let response = self
            .transport
            .send(HttpRequest::post_json(&url, envelope))
            .await?;
        if !response.is_success() {
            return Err(rejected(&url, &response));
        }
        check_update_payload(&response, "delete by query")
    }

    /// Hard commit pending changes on a core
    pub async fn execute_commit(&self, target: &ExecutionTarget, core: &str) -> IndexServerResult<()> {
        let url = format!("{}/update?commit=true", core_url(target, core));
        crate::log_transport_info!("Committing core '{}' on node '{}'", core, target.node_name);

        let response = self.transport.send(HttpRequest::get(&url)).await?;
        if !response.is_success() {
            return Err(rejected(&url, &response));
        }
        check_update_payload(&response, "hard commit")
    }

    /// List the cores hosted by a node
    pub async fn list_cores(&self, target: &ExecutionTarget) -> IndexServerResult<CoreListing> {
        let url = format!("{}/solr/admin/cores", base_url(target));
        let response = self.transport.send(HttpRequest::get(&url)).await?;
        if !response.is_success() {
            return Err(rejected(&url, &response));
        }

        let payload = response.json().ok_or_else(|| {
            IndexServerError::unexpected_response("core listing returned no JSON payload")
        })?;
        if let Some(error) = payload.get("error") {
            return Err(IndexServerError::backend_error(format!(
                "unable to get core names: {}",
                error_message(error)
            )));
        }

        match payload.get("status") {
            Some(Value::Object(status)) => Ok(CoreListing {
                names: status.keys().cloned().collect(),
                status: status.clone(),
            }),
            _ => Err(IndexServerError::unexpected_response(
                "core listing has no status object",
            )),
        }
    }

    /// Fetch the raw health summary document of a node
    pub async fn health_summary(&self, target: &ExecutionTarget) -> IndexServerResult<String> {
        let url = format!("{}/solr/rest/admin/healthsummary", base_url(target));
        let request = HttpRequest::get(&url).header("Accept", "application/xml");
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(rejected(&url, &response));
        }
        Ok(response.body)
    }
}

fn base_url(target: &ExecutionTarget) -> &str {
    target.base_url.trim_end_matches('/')
}

fn core_url(target: &ExecutionTarget, core: &str) -> String {
    format!("{}/solr/{}", base_url(target), core)
}

fn rejected(url: &str, response: &HttpResponse) -> IndexServerError {
    crate::log_transport_warn!("{} answered HTTP {}", url, response.status);
    IndexServerError::TransportRejected {
        status: response.status.as_u16(),
        url: url.to_string(),
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

fn error_message(error: &Value) -> String {
    error
        .get("msg")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

/// `responseHeader.status` when present, given as an integer or integer
/// string. `Err` carries the raw value when it is neither.
fn header_status(payload: &Value) -> Option<Result<i64, String>> {
    let status = payload.get("responseHeader")?.get("status")?;
    let parsed = status
        .as_i64()
        .or_else(|| status.as_f64().filter(|x| x.fract() == 0.0).map(|x| x as i64))
        .or_else(|| status.as_str().and_then(|s| s.trim().parse().ok()));
    Some(parsed.ok_or_else(|| status.to_string()))
}

/// An `error` object or non-zero header status fails an update; any other
/// answer, including an empty body, counts as success.
fn check_update_payload(response: &HttpResponse, operation: &str) -> IndexServerResult<()> {
    let payload = match response.json() {
        Some(payload) => payload,
        None => {
            if !response.body.trim().is_empty() {
                crate::log_transport_warn!("{} returned a non-JSON body", operation);
            }
            return Ok(());
        }
    };

    if let Some(error) = payload.get("error") {
        return Err(IndexServerError::backend_error(format!(
            "{} failed with error message - {}",
            operation,
            error_message(error)
        )));
    }
    match header_status(&payload) {
        None | Some(Ok(0)) => Ok(()),
        Some(Ok(status)) => Err(IndexServerError::backend_error(format!(
            "{} returned bad status - {}",
            operation, status
        ))),
        Some(Err(raw)) => Err(IndexServerError::backend_error(format!(
            "{} returned bad status - {}",
            operation, raw
        ))),
    }
}
