//! Name-based tool invocation outside an MCP session.

use atladmin_engine::AdminOperations;
use atladmin_types::ToolResponse;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Invoke a tool by its advertised name with JSON arguments.
///
/// `null` arguments are treated as an empty object, so missing parameters
/// surface in the tool response rather than as a decode error.
pub async fn call_tool(operations: &AdminOperations, name: &str, arguments: Value) -> Result<ToolResponse, DispatchError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    let response = match name {
        "atlassian_admin_create_user" => operations.create_user(decode(name, arguments)?).await,
        "atlassian_admin_add_to_group" => operations.add_to_group(decode(name, arguments)?).await,
        "atlassian_admin_remove_from_group" => operations.remove_from_group(decode(name, arguments)?).await,
        "atlassian_admin_grant_project_access" => operations.grant_project_access(decode(name, arguments)?).await,
        "atlassian_admin_set_confluence_permissions" => operations.set_confluence_permissions(decode(name, arguments)?).await,
        "atlassian_admin_deactivate_user" => operations.deactivate_user(decode(name, arguments)?).await,
        "atlassian_admin_list_user_groups" => operations.list_user_groups(decode(name, arguments)?).await,
        "atlassian_admin_transfer_issues" => operations.transfer_issues(decode(name, arguments)?).await,
        other => return Err(DispatchError::UnknownTool(other.to_string())),
    };
    Ok(response)
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, DispatchError> {
    serde_json::from_value(arguments).map_err(|source| DispatchError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::server::AtlassianAdminServer;
    use atladmin_engine::RecordingClient;
    use serde_json::json;

    fn operations() -> (Arc<RecordingClient>, AdminOperations) {
        let client = Arc::new(RecordingClient::succeeding(json!([{"name": "jira-users"}, {"name": "eng"}])));
        (client.clone(), AdminOperations::new(client))
    }

    #[tokio::test]
    async fn every_catalogued_tool_is_dispatchable() {
        let (_, operations) = operations();
        for tool in AtlassianAdminServer::tool_catalog() {
            let result = call_tool(&operations, &tool.name, Value::Null).await;
            assert!(result.is_ok(), "{} should dispatch", tool.name);
        }
    }

    #[tokio::test]
    async fn dispatches_with_camel_case_arguments() {
        let (client, operations) = operations();
        let response = call_tool(&operations, "atlassian_admin_list_user_groups", json!({"accountId": "abc"}))
            .await
            .expect("dispatch");
        assert_eq!(response.field("count"), Some(&json!(2)));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_and_bad_arguments_are_errors() {
        let (client, operations) = operations();
        let error = call_tool(&operations, "atlassian_admin_delete_org", json!({}))
            .await
            .expect_err("unknown tool");
        assert!(matches!(error, DispatchError::UnknownTool(ref name) if name == "atlassian_admin_delete_org"));

        let error = call_tool(&operations, "atlassian_admin_deactivate_user", json!({"accountId": 42}))
            .await
            .expect_err("wrong type");
        assert!(error.to_string().starts_with("invalid arguments for atlassian_admin_deactivate_user"));
        assert_eq!(client.call_count(), 0);
    }
}
