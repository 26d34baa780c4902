//! Shared type definitions for the Atladmin crates.
//!
//! The data model mirrors how a single tool invocation flows through the
//! engine:
//!
//! - [`StepRequest`] describes one remote operation and its targets
//! - [`RemoteCall`] is the shaped HTTP request the client sends
//! - [`StepResult`] is the normalized outcome of one step
//! - [`BatchOutcome`] accumulates the ordered results of a batch
//! - [`ToolResponse`] is the JSON shape returned to the invoking caller

pub mod batch;
pub mod params;
pub mod response;
pub mod step;

pub use batch::{BatchOutcome, FailedStep, Page, SucceededStep};
pub use params::{
    AccountParams, CreateUserParams, GrantProjectAccessParams, GroupMembershipParams, SetConfluencePermissionsParams,
    TransferIssuesParams,
};
pub use response::{ReportDetail, ReportPolicy, ToolResponse};
pub use step::{ErrorKind, Operation, RemoteCall, RemoteMethod, SearchCursor, StepError, StepRequest, StepResult};
