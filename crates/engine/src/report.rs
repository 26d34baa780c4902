//! Outcome reporting.
//!
//! Reduces executed steps into the tool response shape. The policy decides how
//! the top-level `success` flag is derived; the detail level decides whether
//! failure responses carry diagnostics beyond the single `error` message.

use atladmin_types::{BatchOutcome, FailedStep, Operation, ReportDetail, ReportPolicy, StepError, ToolResponse};
use serde_json::{Map, Value, json};

use crate::pagination::{PaginationError, PaginationFailure};

/// Summarize a batch according to `policy`.
///
/// - `AllOrNothing`: success mirrors the batch's (single) step; the first
///   failure becomes the response error.
/// - `BestEffort`: success is true once the batch ran; the response carries
///   `attempted` and a `failed` list with one entry per failed item.
pub fn summarize(outcome: &BatchOutcome, policy: ReportPolicy, detail: ReportDetail) -> ToolResponse {
    match policy {
        ReportPolicy::AllOrNothing => match outcome.failed().first() {
            None => ToolResponse::success(),
            Some(failed) => rejected(&failed.error, detail),
        },
        ReportPolicy::BestEffort => {
            let failed: Vec<Value> = outcome.failed().iter().map(|step| failed_item(step, detail)).collect();
            ToolResponse::success()
                .with("attempted", outcome.total())
                .with("failed", failed)
        }
    }
}

/// Failure response for an error detected before or during a single step.
pub fn rejected(error: &StepError, detail: ReportDetail) -> ToolResponse {
    let response = ToolResponse::failure(error.message.clone());
    match detail {
        ReportDetail::Compact => response,
        ReportDetail::Detailed => with_diagnostics(response, error),
    }
}

/// Failure response for a search that ended before exhausting its pages.
///
/// The partially collected items are never presented as a result.
pub fn aborted<T>(error: &PaginationError<T>, detail: ReportDetail) -> ToolResponse {
    let response = ToolResponse::failure(error.to_string());
    match detail {
        ReportDetail::Compact => response,
        ReportDetail::Detailed => {
            let response = response
                .with("errorKind", "pagination")
                .with("pagesFetched", error.pages_fetched)
                .with("collectedBeforeAbort", error.collected.len());
            match &error.failure {
                PaginationFailure::Fetch(fetch_error) => {
                    let response = response.with("fetchErrorKind", json!(fetch_error.kind));
                    match fetch_error.status {
                        Some(status) => response.with("status", status),
                        None => response,
                    }
                }
                PaginationFailure::PageLimit(_) | PaginationFailure::StalledCursor(_) => response,
            }
        }
    }
}

fn with_diagnostics(response: ToolResponse, error: &StepError) -> ToolResponse {
    let kind = serde_json::to_value(error.kind).unwrap_or(Value::Null);
    let response = response.with("errorKind", kind);
    match error.status {
        Some(status) => response.with("status", status),
        None => response,
    }
}

fn failed_item(step: &FailedStep, detail: ReportDetail) -> Value {
    let mut item = Map::new();
    item.insert(
        item_label(&step.request.operation).to_string(),
        Value::String(step.request.operation.target().to_string()),
    );
    item.insert("error".to_string(), Value::String(step.error.message.clone()));
    if detail == ReportDetail::Detailed {
        item.insert("errorKind".to_string(), json!(step.error.kind));
        if let Some(status) = step.error.status {
            item.insert("status".to_string(), json!(status));
        }
    }
    Value::Object(item)
}

fn item_label(operation: &Operation) -> &'static str {
    match operation {
        Operation::GrantSpacePermission { .. } => "permission",
        Operation::AssignIssue { .. } => "issue",
        Operation::AddToGroup { .. } | Operation::RemoveFromGroup { .. } => "group",
        Operation::GrantProjectRole { .. } => "role",
        Operation::CreateUser { .. } => "email",
        Operation::DeactivateUser { .. } | Operation::ListUserGroups { .. } => "accountId",
        Operation::SearchIssues { .. } => "jql",
    }
}
