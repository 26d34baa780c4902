use atladmin_types::{Operation, ReportPolicy, StepError, StepRequest, ToolResponse, TransferIssuesParams};
use tracing::info;

use super::{AdminOperations, Required, optional};
use crate::batch::run_batch;
use crate::pagination::search_issue_keys;
use crate::report::{aborted, summarize};

impl AdminOperations {
    /// Reassign every unresolved issue from one user to another.
    ///
    /// All matching issues are collected across pages before any reassignment
    /// starts; a failed search aborts the tool without reassigning anything.
    pub async fn transfer_issues(&self, params: TransferIssuesParams) -> ToolResponse {
        let result: Result<ToolResponse, StepError> = async {
            let mut required = Required::default();
            let from_account_id = required.take("fromAccountId", params.from_account_id);
            let to_account_id = required.take("toAccountId", params.to_account_id);
            required.check()?;
            let project_key = optional(params.project_key);

            let jql = issue_search_jql(&from_account_id, project_key.as_deref());
            let issue_keys = match search_issue_keys(&self.executor, &jql, self.search_page_size).await {
                Ok(keys) => keys,
                Err(error) => return Ok(aborted(&error, self.report_detail)),
            };
            info!(matched = issue_keys.len(), "issue search completed");

            let requests: Vec<StepRequest> = issue_keys
                .into_iter()
                .map(|issue_key| {
                    StepRequest::new(Operation::AssignIssue {
                        issue_key,
                        account_id: to_account_id.clone(),
                    })
                })
                .collect();
            let outcome = run_batch(&self.executor, requests).await;

            let transferred: Vec<String> = outcome
                .succeeded()
                .iter()
                .map(|step| step.request.operation.target().to_string())
                .collect();
            let count = transferred.len();

            Ok(summarize(&outcome, ReportPolicy::BestEffort, self.report_detail)
                .with("transferred", count)
                .with("issues", transferred)
                .with("message", format!("Transferred {count} issues")))
        }
        .await;
        self.finish("transfer_issues", result)
    }
}

/// JQL matching unresolved issues assigned to `account_id`, optionally
/// limited to one project.
pub fn issue_search_jql(account_id: &str, project_key: Option<&str>) -> String {
    let mut jql = format!("assignee = {} AND resolution = Unresolved", quote_jql(account_id));
    if let Some(project_key) = project_key {
        jql.push_str(&format!(" AND project = {}", quote_jql(project_key)));
    }
    jql
}

fn quote_jql(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::executor::{ISSUE_SEARCH_ENDPOINT, RecordingClient};
    use atladmin_types::{RemoteCall, RemoteMethod, StepResult};
    use serde_json::json;

    fn params(project_key: Option<&str>) -> TransferIssuesParams {
        TransferIssuesParams {
            from_account_id: Some("from-1".into()),
            to_account_id: Some("to-2".into()),
            project_key: project_key.map(str::to_string),
        }
    }

    fn query_value<'a>(call: &'a RemoteCall, name: &str) -> Option<&'a str> {
        call.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn jql_quotes_and_escapes_values() {
        assert_eq!(
            issue_search_jql("557058:abc", None),
            "assignee = \"557058:abc\" AND resolution = Unresolved"
        );
        assert_eq!(
            issue_search_jql("a\"b", Some("EN\\G")),
            "assignee = \"a\\\"b\" AND resolution = Unresolved AND project = \"EN\\\\G\""
        );
    }

    #[tokio::test]
    async fn zero_matches_is_successful_and_empty() {
        let client = Arc::new(RecordingClient::succeeding(json!({"startAt": 0, "total": 0, "issues": []})));
        let operations = AdminOperations::new(client.clone());

        let response = operations.transfer_issues(params(None)).await;
        assert!(response.success);
        assert_eq!(response.field("transferred"), Some(&json!(0)));
        assert_eq!(response.field("issues"), Some(&json!([])));
        assert_eq!(response.message(), Some("Transferred 0 issues"));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn transfers_across_pages_and_reports_partial_failure() {
        let client = Arc::new(RecordingClient::new(|call| match call.method {
            RemoteMethod::Read => match query_value(call, "startAt") {
                Some("0") => StepResult::succeeded(json!({"total": 3, "issues": [{"key": "ENG-1"}, {"key": "ENG-2"}]})),
                Some("2") => StepResult::succeeded(json!({"total": 3, "issues": [{"key": "ENG-3"}]})),
                _ => StepResult::failed(StepError::remote(400, "bad page")),
            },
            _ if call.params.get("issueKey").map(String::as_str) == Some("ENG-2") => {
                StepResult::failed(StepError::remote(400, "Issue is closed"))
            }
            _ => StepResult::succeeded(serde_json::Value::Null),
        }));
        let operations = AdminOperations::new(client.clone()).with_search_page_size(2);

        let response = operations.transfer_issues(params(Some("ENG"))).await;

        assert!(response.success);
        assert_eq!(response.field("transferred"), Some(&json!(2)));
        assert_eq!(response.field("issues"), Some(&json!(["ENG-1", "ENG-3"])));
        assert_eq!(response.field("attempted"), Some(&json!(3)));
        assert_eq!(response.field("failed"), Some(&json!([{"issue": "ENG-2", "error": "Issue is closed"}])));

        let calls = client.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0].endpoint, ISSUE_SEARCH_ENDPOINT);
        assert_eq!(
            query_value(&calls[0], "jql"),
            Some("assignee = \"from-1\" AND resolution = Unresolved AND project = \"ENG\"")
        );
        assert_eq!(query_value(&calls[0], "maxResults"), Some("2"));
        assert_eq!(calls[2].body, Some(json!({"fields": {"assignee": {"accountId": "to-2"}}})));
    }

    #[tokio::test]
    async fn failed_search_page_aborts_without_reassigning() {
        let client = Arc::new(RecordingClient::new(|call| match query_value(call, "startAt") {
            Some("0") => StepResult::succeeded(json!({"total": 4, "issues": [{"key": "ENG-1"}, {"key": "ENG-2"}]})),
            _ => StepResult::failed(StepError::remote(503, "Service unavailable")),
        }));
        let operations = AdminOperations::new(client.clone()).with_search_page_size(2);

        let response = operations.transfer_issues(params(None)).await;

        assert_eq!(response.to_value(), json!({"success": false, "error": "Service unavailable"}));
        assert!(client.calls().iter().all(|call| call.method == RemoteMethod::Read));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn missing_target_account_makes_no_call() {
        let client = Arc::new(RecordingClient::succeeding(json!({"issues": []})));
        let operations = AdminOperations::new(client.clone());

        let response = operations
            .transfer_issues(TransferIssuesParams {
                from_account_id: Some("from-1".into()),
                to_account_id: None,
                project_key: None,
            })
            .await;
        assert_eq!(
            response.to_value(),
            json!({"success": false, "error": "missing required parameter: toAccountId"})
        );
        assert_eq!(client.call_count(), 0);
    }
}
