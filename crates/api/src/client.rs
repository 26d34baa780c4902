//! Remote operation client.
//!
//! [`RemoteClient::call`] performs at most one HTTP round trip and always
//! returns a [`StepResult`]; transport and remote failures become values.

use std::time::{Duration, Instant};
use std::{env, fmt};

use async_trait::async_trait;
use atladmin_types::{RemoteCall, RemoteMethod, StepError, StepResult};
use atladmin_util::http::{
    extract_remote_error_message, parse_response_json_strict, resolve_endpoint, status_error_message,
};
use atladmin_util::redact_sensitive;
use reqwest::{Client, Method, header};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{AdminConfig, ConfigError, validate_base_url};

/// Parameter injected into every call so endpoint templates can reference the
/// configured site.
pub const CLOUD_ID_PARAM: &str = "cloudId";

/// Issues single requests against the remote platform.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Perform one remote call.
    ///
    /// An endpoint template that does not fully resolve fails as a
    /// precondition without any network traffic.
    async fn call(&self, call: &RemoteCall) -> StepResult;
}

/// reqwest-backed [`RemoteClient`] for the Atlassian REST APIs.
#[derive(Clone)]
pub struct AtlassianClient {
    base_url: String,
    cloud_id: String,
    http: Client,
    user_agent: String,
}

impl fmt::Debug for AtlassianClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlassianClient")
            .field("base_url", &self.base_url)
            .field("cloud_id", &self.cloud_id)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl AtlassianClient {
    /// Build a client with the credential's Basic authorization and
    /// `Accept: application/json` installed as default headers.
    pub fn new(config: &AdminConfig) -> Result<Self, ConfigError> {
        validate_base_url(&config.base_url)?;

        let mut default_headers = header::HeaderMap::new();
        let mut authorization = header::HeaderValue::from_str(&config.credential.authorization_header())
            .map_err(|error| ConfigError::HttpClient(format!("invalid credential header: {error}")))?;
        authorization.set_sensitive(true);
        default_headers.insert(header::AUTHORIZATION, authorization);
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()
            .map_err(|error| ConfigError::HttpClient(error.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_id: config.cloud_id.clone(),
            http,
            user_agent: format!("atladmin/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RemoteClient for AtlassianClient {
    async fn call(&self, call: &RemoteCall) -> StepResult {
        let mut params = call.params.clone();
        params
            .entry(CLOUD_ID_PARAM.to_string())
            .or_insert_with(|| self.cloud_id.clone());

        let path = match resolve_endpoint(&call.endpoint, &params) {
            Ok(path) => path,
            Err(error) => {
                warn!(method = %call.method, endpoint = %call.endpoint, missing = ?error.missing, "refusing unresolved endpoint");
                return StepResult::failed(StepError::precondition(error.to_string()));
            }
        };

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(http_method(call.method), &url)
            .header(header::USER_AGENT, &self.user_agent);
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let start = Instant::now();
        debug!(
            method = %call.method,
            path = %path,
            query_parameter_count = call.query.len(),
            has_body = call.body.is_some(),
            "sending remote request"
        );

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                let message = redact_sensitive(&format!("request failed: {error}"));
                warn!(
                    method = %call.method,
                    path = %path,
                    duration_ms = start.elapsed().as_millis(),
                    error = %message,
                    "remote request failed"
                );
                return StepResult::failed(StepError::transport(message));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(error) => {
                let message = format!("failed to read response body: {error}");
                warn!(method = %call.method, path = %path, status = %status, error = %message, "remote response unreadable");
                return StepResult::failed(StepError::transport(message));
            }
        };
        let elapsed = start.elapsed();

        if !status.is_success() {
            let message = remote_error_message(status.as_u16(), &text);
            warn!(
                method = %call.method,
                path = %path,
                status = %status,
                duration_ms = elapsed.as_millis(),
                error = %message,
                "remote request rejected"
            );
            return StepResult::failed(StepError::remote(status.as_u16(), message));
        }

        if text.trim().is_empty() {
            log_completed(call.method, &path, status, elapsed);
            return StepResult::succeeded(Value::Null);
        }

        match parse_response_json_strict(&text, Some(status)) {
            Ok(payload) => {
                log_completed(call.method, &path, status, elapsed);
                StepResult::succeeded(payload)
            }
            Err(error) => {
                let message = redact_sensitive(&error.to_string());
                warn!(
                    method = %call.method,
                    path = %path,
                    status = %status,
                    duration_ms = elapsed.as_millis(),
                    error = %message,
                    "remote response JSON parse failed"
                );
                StepResult::failed(StepError::transport(message))
            }
        }
    }
}

fn http_method(method: RemoteMethod) -> Method {
    match method {
        RemoteMethod::Read => Method::GET,
        RemoteMethod::Create => Method::POST,
        RemoteMethod::Update => Method::PUT,
        RemoteMethod::Delete => Method::DELETE,
    }
}

fn log_completed(method: RemoteMethod, path: &str, status: reqwest::StatusCode, elapsed: Duration) {
    debug!(
        method = %method,
        path = %path,
        status = %status,
        duration_ms = elapsed.as_millis(),
        "remote request completed"
    );
}

/// Primary message of a non-2xx response.
///
/// Falls back to the status hint, then to `HTTP <code>`.
fn remote_error_message(status: u16, text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .as_ref()
        .and_then(extract_remote_error_message)
        .or_else(|| status_error_message(status))
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_message_prefers_body_then_hint_then_status() {
        assert_eq!(
            remote_error_message(400, r#"{"errorMessages":["Group does not exist"]}"#),
            "Group does not exist"
        );
        assert!(remote_error_message(401, "").contains("ATLASSIAN_API_TOKEN"));
        assert_eq!(remote_error_message(502, "<html>bad gateway</html>"), "HTTP 502");
    }

    #[test]
    fn http_methods_map_to_verbs() {
        assert_eq!(http_method(RemoteMethod::Read), Method::GET);
        assert_eq!(http_method(RemoteMethod::Create), Method::POST);
        assert_eq!(http_method(RemoteMethod::Update), Method::PUT);
        assert_eq!(http_method(RemoteMethod::Delete), Method::DELETE);
    }
}
