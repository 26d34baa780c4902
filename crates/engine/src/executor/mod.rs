//! Step execution: shapes one remote call per [`StepRequest`] and delegates it
//! to a [`RemoteClient`].
//!
//! - `mapping` holds the fixed role and permission tables
//! - `recording::RecordingClient` is an in-memory client for tests and previews
//! - Unmapped enumerated values fail without touching the network

use std::sync::Arc;

use atladmin_api::RemoteClient;
use atladmin_types::{Operation, RemoteCall, RemoteMethod, SearchCursor, StepError, StepRequest, StepResult};
use serde_json::json;
use tracing::{debug, warn};

pub mod mapping;
pub mod recording;

pub use recording::RecordingClient;

use mapping::{PROJECT_ROLES, SPACE_PERMISSIONS, accepted_names, project_role_id, space_operation_key};

pub const USERS_ENDPOINT: &str = "/users";
pub const USER_PROFILE_ENDPOINT: &str = "/users/{accountId}/manage/profile";
pub const GROUP_MEMBER_ENDPOINT: &str = "/rest/api/3/group/user";
pub const USER_GROUPS_ENDPOINT: &str = "/rest/api/3/user/groups";
pub const PROJECT_ROLE_ENDPOINT: &str = "/ex/jira/{cloudId}/rest/api/3/project/{projectKey}/role/{roleId}";
pub const SPACE_PERMISSION_ENDPOINT: &str = "/ex/confluence/{cloudId}/wiki/rest/api/space/{spaceKey}/permission";
pub const ISSUE_SEARCH_ENDPOINT: &str = "/ex/jira/{cloudId}/rest/api/3/search";
pub const ISSUE_ENDPOINT: &str = "/ex/jira/{cloudId}/rest/api/3/issue/{issueKey}";

/// Executes single steps against a shared remote client.
#[derive(Clone)]
pub struct StepExecutor {
    client: Arc<dyn RemoteClient>,
}

impl StepExecutor {
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self { client }
    }

    /// Execute one step and normalize its outcome.
    pub async fn execute(&self, request: &StepRequest) -> StepResult {
        let call = match shape_call(&request.operation) {
            Ok(call) => call,
            Err(error) => {
                warn!(step_id = %request.id, error = %error, "step rejected before remote call");
                return StepResult::failed(error);
            }
        };

        debug!(step_id = %request.id, method = %call.method, endpoint = %call.endpoint, "executing step");
        let result = self.client.call(&call).await;
        match result.error() {
            None => debug!(step_id = %request.id, "step succeeded"),
            Some(error) => warn!(
                step_id = %request.id,
                kind = ?error.kind,
                status = ?error.status,
                error = %error,
                "step failed"
            ),
        }
        result
    }
}

/// Build the remote call for an operation.
///
/// Role and permission names are mapped through the fixed tables; an unmapped
/// name is a precondition failure.
pub fn shape_call(operation: &Operation) -> Result<RemoteCall, StepError> {
    let call = match operation {
        Operation::CreateUser {
            email,
            display_name,
            products,
        } => RemoteCall::new(RemoteMethod::Create, USERS_ENDPOINT).with_body(json!({
            "email": email,
            "display_name": display_name,
            "products": products,
        })),
        Operation::AddToGroup { account_id, group_name } => RemoteCall::new(RemoteMethod::Create, GROUP_MEMBER_ENDPOINT)
            .with_query("groupname", group_name.as_str())
            .with_body(json!({ "accountId": account_id })),
        Operation::RemoveFromGroup { account_id, group_name } => RemoteCall::new(RemoteMethod::Delete, GROUP_MEMBER_ENDPOINT)
            .with_query("groupname", group_name.as_str())
            .with_query("accountId", account_id.as_str()),
        Operation::GrantProjectRole {
            project_key,
            account_id,
            role,
        } => {
            let role_id = project_role_id(role).ok_or_else(|| unrecognized_value("role", role, PROJECT_ROLES))?;
            RemoteCall::new(RemoteMethod::Create, PROJECT_ROLE_ENDPOINT)
                .with_param("projectKey", project_key.as_str())
                .with_param("roleId", role_id)
                .with_body(json!({ "user": [account_id] }))
        }
        Operation::GrantSpacePermission {
            space_key,
            account_id,
            permission,
        } => {
            let operation_key =
                space_operation_key(permission).ok_or_else(|| unrecognized_value("permission", permission, SPACE_PERMISSIONS))?;
            RemoteCall::new(RemoteMethod::Create, SPACE_PERMISSION_ENDPOINT)
                .with_param("spaceKey", space_key.as_str())
                .with_body(json!({
                    "subject": { "type": "user", "identifier": account_id },
                    "operation": { "key": operation_key, "target": "space" },
                }))
        }
        Operation::DeactivateUser { account_id } => {
            RemoteCall::new(RemoteMethod::Delete, USER_PROFILE_ENDPOINT).with_param("accountId", account_id.as_str())
        }
        Operation::ListUserGroups { account_id } => {
            RemoteCall::new(RemoteMethod::Read, USER_GROUPS_ENDPOINT).with_query("accountId", account_id.as_str())
        }
        Operation::SearchIssues { jql, cursor, page_size } => {
            let call = RemoteCall::new(RemoteMethod::Read, ISSUE_SEARCH_ENDPOINT).with_query("jql", jql.as_str());
            let call = match cursor {
                None => call.with_query("startAt", "0"),
                Some(SearchCursor::Offset(start_at)) => call.with_query("startAt", start_at.to_string()),
                Some(SearchCursor::Token(token)) => call.with_query("nextPageToken", token.as_str()),
            };
            call.with_query("maxResults", page_size.to_string()).with_query("fields", "key")
        }
        Operation::AssignIssue { issue_key, account_id } => RemoteCall::new(RemoteMethod::Update, ISSUE_ENDPOINT)
            .with_param("issueKey", issue_key.as_str())
            .with_body(json!({ "fields": { "assignee": { "accountId": account_id } } })),
    };
    Ok(call)
}

/// Precondition error for a value outside a fixed table.
pub fn unrecognized_value(field: &str, value: &str, table: &'static [(&'static str, &'static str)]) -> StepError {
    StepError::precondition(format!(
        "unrecognized value '{value}' for {field}; expected one of {}",
        accepted_names(table).join(", ")
    ))
}
