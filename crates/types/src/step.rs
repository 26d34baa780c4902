//! Step-level request and result types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// HTTP verb family understood by the remote client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteMethod {
    /// `GET`
    Read,
    /// `POST`
    Create,
    /// `PUT`
    Update,
    /// `DELETE`
    Delete,
}

impl RemoteMethod {
    /// HTTP method name sent on the wire.
    pub fn http_verb(&self) -> &'static str {
        match self {
            RemoteMethod::Read => "GET",
            RemoteMethod::Create => "POST",
            RemoteMethod::Update => "PUT",
            RemoteMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RemoteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.http_verb())
    }
}

/// A fully shaped remote request.
///
/// `endpoint` is a template relative to the API base URL. Every `{name}`
/// placeholder must have an entry in `params`; the client refuses to send a
/// request whose template does not fully resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteCall {
    pub method: RemoteMethod,
    pub endpoint: String,
    pub params: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RemoteCall {
    pub fn new(method: RemoteMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Continuation marker for paginated issue searches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCursor {
    /// Offset-based paging (`startAt`).
    Offset(u64),
    /// Token-based paging (`nextPageToken`).
    Token(String),
}

/// One logical remote operation with its target references.
///
/// Enumerated values (`role`, `permission`) are carried as the caller supplied
/// them; the step executor maps them through its fixed tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    CreateUser {
        email: String,
        display_name: String,
        products: Vec<String>,
    },
    AddToGroup {
        account_id: String,
        group_name: String,
    },
    RemoveFromGroup {
        account_id: String,
        group_name: String,
    },
    GrantProjectRole {
        project_key: String,
        account_id: String,
        role: String,
    },
    GrantSpacePermission {
        space_key: String,
        account_id: String,
        permission: String,
    },
    DeactivateUser {
        account_id: String,
    },
    ListUserGroups {
        account_id: String,
    },
    SearchIssues {
        jql: String,
        cursor: Option<SearchCursor>,
        page_size: u32,
    },
    AssignIssue {
        issue_key: String,
        account_id: String,
    },
}

impl Operation {
    /// Stable name of the operation kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CreateUser { .. } => "create_user",
            Operation::AddToGroup { .. } => "add_to_group",
            Operation::RemoveFromGroup { .. } => "remove_from_group",
            Operation::GrantProjectRole { .. } => "grant_project_role",
            Operation::GrantSpacePermission { .. } => "grant_space_permission",
            Operation::DeactivateUser { .. } => "deactivate_user",
            Operation::ListUserGroups { .. } => "list_user_groups",
            Operation::SearchIssues { .. } => "search_issues",
            Operation::AssignIssue { .. } => "assign_issue",
        }
    }

    /// The reference that distinguishes this operation inside a batch.
    pub fn target(&self) -> &str {
        match self {
            Operation::CreateUser { email, .. } => email,
            Operation::AddToGroup { group_name, .. } | Operation::RemoveFromGroup { group_name, .. } => group_name,
            Operation::GrantProjectRole { role, .. } => role,
            Operation::GrantSpacePermission { permission, .. } => permission,
            Operation::DeactivateUser { account_id } | Operation::ListUserGroups { account_id } => account_id,
            Operation::SearchIssues { jql, .. } => jql,
            Operation::AssignIssue { issue_key, .. } => issue_key,
        }
    }
}

/// A step request built by the orchestrator and consumed by the step executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRequest {
    /// Identifier unique within the batch, e.g. `grant_space_permission:write`.
    pub id: String,
    pub operation: Operation,
}

impl StepRequest {
    pub fn new(operation: Operation) -> Self {
        let id = format!("{}:{}", operation.kind(), operation.target());
        Self { id, operation }
    }
}

/// Where a step failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Detected locally before any network call.
    Precondition,
    /// The remote platform could not be reached or the response could not be read.
    Transport,
    /// The remote platform answered with a non-success status.
    Remote,
}

/// Error value carried by a failed step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct StepError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl StepError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Precondition,
            message: message.into(),
            status: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: message.into(),
            status: None,
        }
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Remote,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn is_precondition(&self) -> bool {
        self.kind == ErrorKind::Precondition
    }
}

/// Normalized outcome of one step.
///
/// Exactly one of payload or error exists, which the enum shape enforces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    Succeeded { payload: Value },
    Failed { error: StepError },
}

impl StepResult {
    pub fn succeeded(payload: Value) -> Self {
        StepResult::Succeeded { payload }
    }

    pub fn failed(error: StepError) -> Self {
        StepResult::Failed { error }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StepResult::Succeeded { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            StepResult::Succeeded { payload } => Some(payload),
            StepResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&StepError> {
        match self {
            StepResult::Succeeded { .. } => None,
            StepResult::Failed { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Value, StepError> {
        match self {
            StepResult::Succeeded { payload } => Ok(payload),
            StepResult::Failed { error } => Err(error),
        }
    }
}

impl From<Result<Value, StepError>> for StepResult {
    fn from(result: Result<Value, StepError>) -> Self {
        match result {
            Ok(payload) => StepResult::succeeded(payload),
            Err(error) => StepResult::failed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn step_request_id_combines_kind_and_target() {
        let request = StepRequest::new(Operation::AssignIssue {
            issue_key: "ENG-7".into(),
            account_id: "abc".into(),
        });
        assert_eq!(request.id, "assign_issue:ENG-7");
    }

    #[test]
    fn step_result_exposes_exactly_one_side() {
        let ok = StepResult::succeeded(json!({"id": 1}));
        assert!(ok.is_ok());
        assert!(ok.error().is_none());
        assert_eq!(ok.payload(), Some(&json!({"id": 1})));

        let failed = StepResult::failed(StepError::remote(404, "Group not found"));
        assert!(!failed.is_ok());
        assert!(failed.payload().is_none());
        assert_eq!(failed.error().map(|error| error.status), Some(Some(404)));
    }

    #[test]
    fn step_result_serializes_with_status_tag() {
        let failed = StepResult::failed(StepError::precondition("unrecognized value"));
        let value = serde_json::to_value(&failed).expect("serialize");
        assert_eq!(value["status"], json!("failed"));
        assert_eq!(value["error"]["kind"], json!("precondition"));
        assert!(value["error"].get("status").is_none());
    }
}
