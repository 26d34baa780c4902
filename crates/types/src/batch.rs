//! Batch accumulation and pagination types.

use serde::Serialize;
use serde_json::Value;

use crate::step::{StepError, StepRequest, StepResult};

/// A batch item whose step succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SucceededStep {
    pub request: StepRequest,
    pub payload: Value,
}

/// A batch item whose step failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedStep {
    pub request: StepRequest,
    pub error: StepError,
}

/// Ordered results of a batch.
///
/// Items are only added through [`BatchOutcome::record`], so
/// `total() == succeeded().len() + failed().len()` always holds and both lists
/// keep the order in which steps were issued.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    succeeded: Vec<SucceededStep>,
    failed: Vec<FailedStep>,
}

impl BatchOutcome {
    /// Record the result of one issued step.
    pub fn record(&mut self, request: StepRequest, result: StepResult) {
        match result {
            StepResult::Succeeded { payload } => self.succeeded.push(SucceededStep { request, payload }),
            StepResult::Failed { error } => self.failed.push(FailedStep { request, error }),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn succeeded(&self) -> &[SucceededStep] {
        &self.succeeded
    }

    pub fn failed(&self) -> &[FailedStep] {
        &self.failed
    }

    /// Success payloads in issue order.
    pub fn payloads(&self) -> impl Iterator<Item = &Value> {
        self.succeeded.iter().map(|step| &step.payload)
    }

    /// True when no recorded step failed. An empty batch is clean.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One page of a paginated remote listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` once the listing is exhausted.
    pub next: Option<C>,
}

impl<T, C> Page<T, C> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn with_next(items: Vec<T>, next: C) -> Self {
        Self { items, next: Some(next) }
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }
}
