//! Tool-level operations.
//!
//! Each public method of [`AdminOperations`] implements one admin tool: it
//! validates parameters, builds step requests, runs them and reduces the
//! outcome into a [`ToolResponse`]. Precondition failures are reported before
//! any remote call.

use std::sync::Arc;

use atladmin_api::RemoteClient;
use atladmin_types::{ReportDetail, StepError, ToolResponse};
use tracing::{info, warn};

use crate::executor::StepExecutor;
use crate::report;

mod access;
mod groups;
mod issues;
mod users;

pub use issues::issue_search_jql;

/// Default issue search page size.
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 50;

/// Entry point for every admin tool.
#[derive(Clone)]
pub struct AdminOperations {
    executor: StepExecutor,
    search_page_size: u32,
    report_detail: ReportDetail,
}

impl AdminOperations {
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self {
            executor: StepExecutor::new(client),
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
            report_detail: ReportDetail::default(),
        }
    }

    pub fn with_search_page_size(mut self, page_size: u32) -> Self {
        self.search_page_size = page_size.max(1);
        self
    }

    pub fn with_report_detail(mut self, report_detail: ReportDetail) -> Self {
        self.report_detail = report_detail;
        self
    }

    pub fn report_detail(&self) -> ReportDetail {
        self.report_detail
    }

    /// Turn a tool body's result into the final response, reporting
    /// precondition rejections in the regular response shape.
    fn finish(&self, tool: &str, result: Result<ToolResponse, StepError>) -> ToolResponse {
        let response = match result {
            Ok(response) => response,
            Err(error) => {
                warn!(tool, error = %error, "tool rejected");
                report::rejected(&error, self.report_detail)
            }
        };
        info!(tool, success = response.success, "tool completed");
        response
    }
}

/// Collects missing required parameters so all of them are reported at once.
#[derive(Debug, Default)]
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    /// Take a required string; blank values count as missing.
    fn take(&mut self, name: &'static str, value: Option<String>) -> String {
        match value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty()) {
            Some(value) => value,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    /// Take a required list; an absent list counts as missing, an empty one does not.
    fn take_list(&mut self, name: &'static str, value: Option<Vec<String>>) -> Vec<String> {
        match value {
            Some(values) => values,
            None => {
                self.missing.push(name);
                Vec::new()
            }
        }
    }

    fn check(self) -> Result<(), StepError> {
        if self.missing.is_empty() {
            return Ok(());
        }
        let noun = if self.missing.len() == 1 { "parameter" } else { "parameters" };
        Err(StepError::precondition(format!(
            "missing required {noun}: {}",
            self.missing.join(", ")
        )))
    }
}

/// Trimmed optional string, `None` when blank.
fn optional(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}
