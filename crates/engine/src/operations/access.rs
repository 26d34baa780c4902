use atladmin_types::{
    GrantProjectAccessParams, Operation, ReportPolicy, SetConfluencePermissionsParams, StepError, StepRequest,
    ToolResponse,
};
use serde_json::Value;

use super::{AdminOperations, Required};
use crate::batch::run_batch;
use crate::executor::mapping::{PROJECT_ROLES, SPACE_PERMISSIONS, project_role_id, space_operation_key};
use crate::executor::unrecognized_value;
use crate::report::summarize;

impl AdminOperations {
    /// Grant a user a role on a Jira project.
    pub async fn grant_project_access(&self, params: GrantProjectAccessParams) -> ToolResponse {
        let result: Result<ToolResponse, StepError> = async {
            let mut required = Required::default();
            let project_key = required.take("projectKey", params.project_key);
            let account_id = required.take("accountId", params.account_id);
            let role = required.take("role", params.role);
            required.check()?;

            if project_role_id(&role).is_none() {
                return Err(unrecognized_value("role", &role, PROJECT_ROLES));
            }

            let request = StepRequest::new(Operation::GrantProjectRole {
                project_key: project_key.clone(),
                account_id,
                role: role.clone(),
            });
            let outcome = run_batch(&self.executor, [request]).await;
            let response = summarize(&outcome, ReportPolicy::AllOrNothing, self.report_detail);
            Ok(if response.success {
                response.with("message", format!("Granted {role} access to project {project_key}"))
            } else {
                response
            })
        }
        .await;
        self.finish("grant_project_access", result)
    }

    /// Grant each requested permission on a Confluence space, one call per
    /// permission, continuing past individual failures.
    pub async fn set_confluence_permissions(&self, params: SetConfluencePermissionsParams) -> ToolResponse {
        let result: Result<ToolResponse, StepError> = async {
            let mut required = Required::default();
            let space_key = required.take("spaceKey", params.space_key);
            let account_id = required.take("accountId", params.account_id);
            let permissions = required.take_list("permissions", params.permissions);
            required.check()?;

            // Every value is checked up front so a bad entry never leaves the
            // space half-updated.
            if let Some(unknown) = permissions
                .iter()
                .find(|permission| space_operation_key(permission).is_none())
            {
                return Err(unrecognized_value("permission", unknown, SPACE_PERMISSIONS));
            }

            let requests: Vec<StepRequest> = permissions
                .iter()
                .map(|permission| {
                    StepRequest::new(Operation::GrantSpacePermission {
                        space_key: space_key.clone(),
                        account_id: account_id.clone(),
                        permission: permission.clone(),
                    })
                })
                .collect();
            let outcome = run_batch(&self.executor, requests).await;

            let granted: Vec<String> = outcome
                .succeeded()
                .iter()
                .map(|step| step.request.operation.target().to_string())
                .collect();
            let details: Vec<Value> = granted
                .iter()
                .map(|permission| Value::String(format!("{permission} permission granted")))
                .collect();
            let message = format!("Set {} permissions on space {space_key}", granted.join(", "));

            Ok(summarize(&outcome, ReportPolicy::BestEffort, self.report_detail)
                .with("message", message)
                .with("details", details)
                .with("granted", granted.len()))
        }
        .await;
        self.finish("set_confluence_permissions", result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::executor::RecordingClient;
    use atladmin_types::StepResult;
    use serde_json::json;

    fn permissions_params(permissions: &[&str]) -> SetConfluencePermissionsParams {
        SetConfluencePermissionsParams {
            space_key: Some("DEV".into()),
            account_id: Some("abc".into()),
            permissions: Some(permissions.iter().map(|permission| permission.to_string()).collect()),
        }
    }

    fn fail_write_permission() -> RecordingClient {
        RecordingClient::new(|call| {
            let key = call
                .body
                .as_ref()
                .and_then(|body| body.pointer("/operation/key"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            if key == "write" {
                StepResult::failed(StepError::remote(403, "User lacks write access"))
            } else {
                StepResult::succeeded(Value::Null)
            }
        })
    }

    #[tokio::test]
    async fn grant_project_access_maps_role() {
        let client = Arc::new(RecordingClient::succeeding(Value::Null));
        let operations = AdminOperations::new(client.clone());

        let response = operations
            .grant_project_access(GrantProjectAccessParams {
                project_key: Some("ENG".into()),
                account_id: Some("abc".into()),
                role: Some("Developer".into()),
            })
            .await;
        assert_eq!(
            response.to_value(),
            json!({"success": true, "message": "Granted Developer access to project ENG"})
        );
        assert_eq!(client.calls()[0].params.get("roleId").map(String::as_str), Some("10001"));
    }

    #[tokio::test]
    async fn grant_project_access_unknown_role_makes_no_call() {
        let client = Arc::new(RecordingClient::succeeding(Value::Null));
        let operations = AdminOperations::new(client.clone());

        let response = operations
            .grant_project_access(GrantProjectAccessParams {
                project_key: Some("ENG".into()),
                account_id: Some("abc".into()),
                role: Some("Owner".into()),
            })
            .await;
        assert!(!response.success);
        assert!(response.error.as_deref().unwrap_or_default().starts_with("unrecognized value 'Owner'"));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn partial_permission_failure_is_still_success_with_detail() {
        let client = Arc::new(fail_write_permission());
        let operations = AdminOperations::new(client.clone());

        let response = operations.set_confluence_permissions(permissions_params(&["read", "write"])).await;

        assert!(response.success);
        assert_eq!(response.field("granted"), Some(&json!(1)));
        assert_eq!(response.field("attempted"), Some(&json!(2)));
        assert_eq!(response.field("details"), Some(&json!(["read permission granted"])));
        assert_eq!(
            response.field("failed"),
            Some(&json!([{"permission": "write", "error": "User lacks write access"}]))
        );
        assert_eq!(response.message(), Some("Set read permissions on space DEV"));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn permissions_are_applied_in_order() {
        let client = Arc::new(RecordingClient::succeeding(Value::Null));
        let operations = AdminOperations::new(client.clone());

        let response = operations
            .set_confluence_permissions(permissions_params(&["admin", "read", "write"]))
            .await;
        assert_eq!(response.message(), Some("Set admin, read, write permissions on space DEV"));

        let keys: Vec<String> = client
            .calls()
            .iter()
            .filter_map(|call| call.body.as_ref()?.pointer("/operation/key")?.as_str().map(str::to_string))
            .collect();
        assert_eq!(keys, vec!["admin", "read", "write"]);
    }

    #[tokio::test]
    async fn unknown_permission_rejects_whole_request() {
        let client = Arc::new(RecordingClient::succeeding(Value::Null));
        let operations = AdminOperations::new(client.clone());

        let response = operations
            .set_confluence_permissions(permissions_params(&["read", "delete"]))
            .await;
        assert!(!response.success);
        assert!(
            response
                .error
                .as_deref()
                .unwrap_or_default()
                .starts_with("unrecognized value 'delete' for permission")
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_permission_list_is_an_empty_successful_batch() {
        let client = Arc::new(RecordingClient::succeeding(Value::Null));
        let operations = AdminOperations::new(client.clone());

        let response = operations.set_confluence_permissions(permissions_params(&[])).await;
        assert!(response.success);
        assert_eq!(response.field("attempted"), Some(&json!(0)));
        assert_eq!(response.field("granted"), Some(&json!(0)));
        assert_eq!(client.call_count(), 0);
    }
}
