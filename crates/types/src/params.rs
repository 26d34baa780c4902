//! Tool input parameter types.
//!
//! Fields the tool requires are still modelled as `Option` so that a missing
//! value reaches the operation layer and is reported as a precondition failure
//! in the regular response shape instead of a protocol-level decode error.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserParams {
    #[schemars(description = "Required. User email address.")]
    pub email: Option<String>,
    #[schemars(description = "Required. User display name.")]
    pub display_name: Option<String>,
    #[schemars(description = "Products to grant access to, e.g. [\"jira-software\", \"confluence\"]. Defaults to both.")]
    pub products: Option<Vec<String>>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembershipParams {
    #[schemars(description = "Required. User account ID.")]
    pub account_id: Option<String>,
    #[schemars(description = "Required. Name of the group.")]
    pub group_name: Option<String>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrantProjectAccessParams {
    #[schemars(description = "Required. Project key, e.g. \"ENG\".")]
    pub project_key: Option<String>,
    #[schemars(description = "Required. User account ID.")]
    pub account_id: Option<String>,
    #[schemars(description = "Required. Role to assign: one of Administrator, Developer, Viewer.")]
    pub role: Option<String>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetConfluencePermissionsParams {
    #[schemars(description = "Required. Confluence space key.")]
    pub space_key: Option<String>,
    #[schemars(description = "Required. User account ID.")]
    pub account_id: Option<String>,
    #[schemars(description = "Required. Permissions to grant, each one of read, write, admin. Applied in the order given.")]
    pub permissions: Option<Vec<String>>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountParams {
    #[schemars(description = "Required. User account ID.")]
    pub account_id: Option<String>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferIssuesParams {
    #[schemars(description = "Required. Source user account ID.")]
    pub from_account_id: Option<String>,
    #[schemars(description = "Required. Target user account ID.")]
    pub to_account_id: Option<String>,
    #[schemars(description = "Optional project key limiting the transfer to one project.")]
    pub project_key: Option<String>,
}
