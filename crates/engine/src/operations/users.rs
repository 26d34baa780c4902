use atladmin_types::{
    AccountParams, CreateUserParams, Operation, ReportPolicy, StepError, StepRequest, ToolResponse,
};
use serde_json::Value;

use super::{AdminOperations, Required};
use crate::batch::run_batch;
use crate::report::summarize;

/// Products granted when a create request names none.
pub const DEFAULT_PRODUCTS: &[&str] = &["jira-software", "confluence"];

impl AdminOperations {
    /// Create a user account and report the identity the platform assigned.
    pub async fn create_user(&self, params: CreateUserParams) -> ToolResponse {
        let result: Result<ToolResponse, StepError> = async {
            let mut required = Required::default();
            let email = required.take("email", params.email);
            let display_name = required.take("displayName", params.display_name);
            required.check()?;

            let products = params
                .products
                .unwrap_or_else(|| DEFAULT_PRODUCTS.iter().map(|product| product.to_string()).collect());
            let request = StepRequest::new(Operation::CreateUser {
                email,
                display_name: display_name.clone(),
                products,
            });

            let outcome = run_batch(&self.executor, [request]).await;
            let response = summarize(&outcome, ReportPolicy::AllOrNothing, self.report_detail);
            let Some(payload) = outcome.payloads().next() else {
                return Ok(response);
            };
            Ok(response
                .with("accountId", field_or_null(payload, "account_id"))
                .with("email", field_or_null(payload, "email"))
                .with("displayName", field_or_null(payload, "display_name"))
                .with("message", format!("User {display_name} created successfully")))
        }
        .await;
        self.finish("create_user", result)
    }

    /// Deactivate a user account.
    pub async fn deactivate_user(&self, params: AccountParams) -> ToolResponse {
        let result: Result<ToolResponse, StepError> = async {
            let mut required = Required::default();
            let account_id = required.take("accountId", params.account_id);
            required.check()?;

            let outcome = run_batch(&self.executor, [StepRequest::new(Operation::DeactivateUser { account_id })]).await;
            let response = summarize(&outcome, ReportPolicy::AllOrNothing, self.report_detail);
            Ok(if response.success {
                response.with("message", "User account deactivated successfully")
            } else {
                response
            })
        }
        .await;
        self.finish("deactivate_user", result)
    }

    /// List the names of the groups a user belongs to.
    pub async fn list_user_groups(&self, params: AccountParams) -> ToolResponse {
        let result: Result<ToolResponse, StepError> = async {
            let mut required = Required::default();
            let account_id = required.take("accountId", params.account_id);
            required.check()?;

            let outcome = run_batch(&self.executor, [StepRequest::new(Operation::ListUserGroups { account_id })]).await;
            let response = summarize(&outcome, ReportPolicy::AllOrNothing, self.report_detail);
            let Some(payload) = outcome.payloads().next() else {
                return Ok(response);
            };
            let groups = group_names(payload)?;
            let count = groups.len();
            Ok(response.with("groups", groups).with("count", count))
        }
        .await;
        self.finish("list_user_groups", result)
    }
}

fn field_or_null(payload: &Value, key: &str) -> Value {
    payload.get(key).cloned().unwrap_or(Value::Null)
}

fn group_names(payload: &Value) -> Result<Vec<String>, StepError> {
    let groups = payload
        .as_array()
        .ok_or_else(|| StepError::transport("malformed groups response: expected an array"))?;
    groups
        .iter()
        .map(|group| {
            group
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| StepError::transport("malformed groups response: group entry without a name"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::executor::RecordingClient;
    use atladmin_types::{RemoteMethod, StepResult};
    use serde_json::json;

    #[tokio::test]
    async fn create_user_defaults_products_and_maps_identity() {
        let client = Arc::new(RecordingClient::succeeding(json!({
            "account_id": "557058:abc",
            "email": "jane@example.com",
            "display_name": "Jane Doe"
        })));
        let operations = AdminOperations::new(client.clone());

        let response = operations
            .create_user(CreateUserParams {
                email: Some("jane@example.com".into()),
                display_name: Some("Jane Doe".into()),
                products: None,
            })
            .await;

        assert_eq!(
            response.to_value(),
            json!({
                "success": true,
                "accountId": "557058:abc",
                "email": "jane@example.com",
                "displayName": "Jane Doe",
                "message": "User Jane Doe created successfully"
            })
        );
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, RemoteMethod::Create);
        assert_eq!(
            calls[0].body,
            Some(json!({
                "email": "jane@example.com",
                "display_name": "Jane Doe",
                "products": ["jira-software", "confluence"]
            }))
        );
    }

    #[tokio::test]
    async fn create_user_missing_fields_makes_no_call() {
        let client = Arc::new(RecordingClient::succeeding(Value::Null));
        let operations = AdminOperations::new(client.clone());

        let response = operations.create_user(CreateUserParams::default()).await;
        assert_eq!(
            response.to_value(),
            json!({"success": false, "error": "missing required parameters: email, displayName"})
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn deactivate_user_reports_remote_failure() {
        let client = Arc::new(RecordingClient::new(|_| StepResult::failed(StepError::remote(404, "User not found"))));
        let operations = AdminOperations::new(client);

        let response = operations
            .deactivate_user(AccountParams {
                account_id: Some("ghost".into()),
            })
            .await;
        assert_eq!(response.to_value(), json!({"success": false, "error": "User not found"}));
    }

    #[tokio::test]
    async fn list_user_groups_returns_names_and_count() {
        let client = Arc::new(RecordingClient::succeeding(json!([
            {"name": "jira-users", "groupId": "1"},
            {"name": "eng", "groupId": "2"}
        ])));
        let operations = AdminOperations::new(client);

        let response = operations
            .list_user_groups(AccountParams {
                account_id: Some("abc".into()),
            })
            .await;
        assert_eq!(
            response.to_value(),
            json!({"success": true, "groups": ["jira-users", "eng"], "count": 2})
        );
    }

    #[tokio::test]
    async fn list_user_groups_rejects_entries_without_name() {
        let client = Arc::new(RecordingClient::succeeding(json!([
            {"name": "jira-users", "groupId": "1"},
            {"groupId": "2"}
        ])));
        let operations = AdminOperations::new(client);

        let response = operations
            .list_user_groups(AccountParams {
                account_id: Some("abc".into()),
            })
            .await;
        assert_eq!(
            response.to_value(),
            json!({"success": false, "error": "malformed groups response: group entry without a name"})
        );
    }

    #[tokio::test]
    async fn list_user_groups_rejects_unexpected_shape() {
        let client = Arc::new(RecordingClient::succeeding(json!({"groups": []})));
        let operations = AdminOperations::new(client);

        let response = operations
            .list_user_groups(AccountParams {
                account_id: Some("abc".into()),
            })
            .await;
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("malformed groups response: expected an array"));
    }
}
