use atladmin_engine::AdminOperations;
use atladmin_types::{
    AccountParams, CreateUserParams, GrantProjectAccessParams, GroupMembershipParams, SetConfluencePermissionsParams, ToolResponse,
    TransferIssuesParams,
};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo, Tool};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};
use tracing::debug;

const SERVER_INSTRUCTIONS: &str = "Atlassian organization administration tools.\n\
RESPONSES:\n\
- Every tool returns {success, ...fields, error?}.\n\
- create_user, add_to_group, remove_from_group, grant_project_access, deactivate_user and list_user_groups succeed only when their single remote call succeeds.\n\
- set_confluence_permissions and transfer_issues report success once every item was attempted; check `failed` and `attempted` for per-item failures.\n\
- transfer_issues fails without reassigning anything when the issue search cannot be completed.\n\
VALUES:\n\
- role is one of Administrator, Developer, Viewer.\n\
- permissions entries are read, write or admin.";

/// MCP handler exposing the Atlassian admin tools.
#[derive(Clone)]
pub struct AtlassianAdminServer {
    tool_router: ToolRouter<Self>,
    operations: AdminOperations,
}

#[tool_router]
impl AtlassianAdminServer {
    pub fn new(operations: AdminOperations) -> Self {
        Self {
            tool_router: Self::tool_router(),
            operations,
        }
    }

    /// Tool definitions advertised to clients, sorted by name.
    pub fn tool_catalog() -> Vec<Tool> {
        let mut tools = Self::tool_router().list_all();
        tools.sort_by(|left, right| left.name.cmp(&right.name));
        tools
    }

    #[tool(
        name = "atlassian_admin_create_user",
        annotations(open_world_hint = true),
        description = "Create a new Atlassian user account. Input: email, displayName, optional products (defaults to jira-software and confluence). Returns accountId, email, displayName."
    )]
    async fn create_user(&self, param: Parameters<CreateUserParams>) -> Result<CallToolResult, ErrorData> {
        debug!(tool = "create_user", "tool call received");
        Ok(into_call_result(self.operations.create_user(param.0).await))
    }

    #[tool(
        name = "atlassian_admin_add_to_group",
        annotations(open_world_hint = true, idempotent_hint = true),
        description = "Add a user to an Atlassian group. Input: accountId, groupName."
    )]
    async fn add_to_group(&self, param: Parameters<GroupMembershipParams>) -> Result<CallToolResult, ErrorData> {
        debug!(tool = "add_to_group", "tool call received");
        Ok(into_call_result(self.operations.add_to_group(param.0).await))
    }

    #[tool(
        name = "atlassian_admin_remove_from_group",
        annotations(destructive_hint = true, open_world_hint = true),
        description = "Remove a user from an Atlassian group. Input: accountId, groupName."
    )]
    async fn remove_from_group(&self, param: Parameters<GroupMembershipParams>) -> Result<CallToolResult, ErrorData> {
        debug!(tool = "remove_from_group", "tool call received");
        Ok(into_call_result(self.operations.remove_from_group(param.0).await))
    }

    #[tool(
        name = "atlassian_admin_grant_project_access",
        annotations(open_world_hint = true, idempotent_hint = true),
        description = "Grant a user access to a Jira project with a specific role. Input: projectKey, accountId, role (Administrator, Developer or Viewer)."
    )]
    async fn grant_project_access(&self, param: Parameters<GrantProjectAccessParams>) -> Result<CallToolResult, ErrorData> {
        debug!(tool = "grant_project_access", "tool call received");
        Ok(into_call_result(self.operations.grant_project_access(param.0).await))
    }

    #[tool(
        name = "atlassian_admin_set_confluence_permissions",
        annotations(open_world_hint = true),
        description = "Set permissions for a user on a Confluence space. Input: spaceKey, accountId, permissions (each read, write or admin). Each permission is granted separately; partial failures are listed in `failed`."
    )]
    async fn set_confluence_permissions(&self, param: Parameters<SetConfluencePermissionsParams>) -> Result<CallToolResult, ErrorData> {
        debug!(tool = "set_confluence_permissions", "tool call received");
        Ok(into_call_result(self.operations.set_confluence_permissions(param.0).await))
    }

    #[tool(
        name = "atlassian_admin_deactivate_user",
        annotations(destructive_hint = true, open_world_hint = true),
        description = "Deactivate an Atlassian user account. Input: accountId."
    )]
    async fn deactivate_user(&self, param: Parameters<AccountParams>) -> Result<CallToolResult, ErrorData> {
        debug!(tool = "deactivate_user", "tool call received");
        Ok(into_call_result(self.operations.deactivate_user(param.0).await))
    }

    #[tool(
        name = "atlassian_admin_list_user_groups",
        annotations(read_only_hint = true, open_world_hint = true),
        description = "List all groups a user belongs to. Input: accountId. Returns group names and count."
    )]
    async fn list_user_groups(&self, param: Parameters<AccountParams>) -> Result<CallToolResult, ErrorData> {
        debug!(tool = "list_user_groups", "tool call received");
        Ok(into_call_result(self.operations.list_user_groups(param.0).await))
    }

    #[tool(
        name = "atlassian_admin_transfer_issues",
        annotations(open_world_hint = true),
        description = "Transfer unresolved Jira issue assignments from one user to another. Input: fromAccountId, toAccountId, optional projectKey. Searches all result pages before reassigning; per-issue failures are listed in `failed`."
    )]
    async fn transfer_issues(&self, param: Parameters<TransferIssuesParams>) -> Result<CallToolResult, ErrorData> {
        debug!(tool = "transfer_issues", "tool call received");
        Ok(into_call_result(self.operations.transfer_issues(param.0).await))
    }
}

#[tool_handler]
impl ServerHandler for AtlassianAdminServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "atlassian-admin".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Atlassian Admin MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}

/// Wrap a tool response as structured MCP content; `success:false` responses
/// are flagged as tool errors.
fn into_call_result(response: ToolResponse) -> CallToolResult {
    let value = response.to_value();
    if response.success {
        CallToolResult::structured(value)
    } else {
        CallToolResult::structured_error(value)
    }
}
