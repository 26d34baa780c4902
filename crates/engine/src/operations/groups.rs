use atladmin_types::{GroupMembershipParams, Operation, ReportPolicy, StepError, StepRequest, ToolResponse};

use super::{AdminOperations, Required};
use crate::batch::run_batch;
use crate::report::summarize;

impl AdminOperations {
    /// Add a user to a group.
    pub async fn add_to_group(&self, params: GroupMembershipParams) -> ToolResponse {
        let result = self
            .change_membership(params, |account_id, group_name| Operation::AddToGroup { account_id, group_name }, "added to")
            .await;
        self.finish("add_to_group", result)
    }

    /// Remove a user from a group.
    pub async fn remove_from_group(&self, params: GroupMembershipParams) -> ToolResponse {
        let result = self
            .change_membership(
                params,
                |account_id, group_name| Operation::RemoveFromGroup { account_id, group_name },
                "removed from",
            )
            .await;
        self.finish("remove_from_group", result)
    }

    async fn change_membership(
        &self,
        params: GroupMembershipParams,
        operation: impl FnOnce(String, String) -> Operation,
        verb: &str,
    ) -> Result<ToolResponse, StepError> {
        let mut required = Required::default();
        let account_id = required.take("accountId", params.account_id);
        let group_name = required.take("groupName", params.group_name);
        required.check()?;

        let request = StepRequest::new(operation(account_id, group_name.clone()));
        let outcome = run_batch(&self.executor, [request]).await;
        let response = summarize(&outcome, ReportPolicy::AllOrNothing, self.report_detail);
        Ok(if response.success {
            response.with("message", format!("User {verb} group {group_name}"))
        } else {
            response
        })
    }
}
