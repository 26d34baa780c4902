//! # Atladmin Engine
//!
//! Turns a single admin tool invocation into an ordered sequence of remote
//! calls and reduces their outcomes into one response.
//!
//! ## Architecture
//!
//! - **`executor`**: shapes and executes one step through a [`RemoteClient`](atladmin_api::RemoteClient)
//! - **`batch`**: runs steps sequentially without stopping at failures
//! - **`pagination`**: walks paginated listings until exhaustion or a terminal error
//! - **`report`**: applies the all-or-nothing or best-effort reporting policy
//! - **`operations`**: one method per admin tool on [`AdminOperations`]
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use atladmin_engine::{AdminOperations, RecordingClient};
//! use atladmin_types::GroupMembershipParams;
//! use serde_json::Value;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let operations = AdminOperations::new(Arc::new(RecordingClient::succeeding(Value::Null)));
//! let response = operations
//!     .add_to_group(GroupMembershipParams {
//!         account_id: Some("abc".into()),
//!         group_name: Some("eng".into()),
//!     })
//!     .await;
//! assert_eq!(response.message(), Some("User added to group eng"));
//! # });
//! ```

pub mod batch;
pub mod executor;
pub mod operations;
pub mod pagination;
pub mod report;

pub use batch::run_batch;
pub use executor::{RecordingClient, StepExecutor, shape_call};
pub use operations::{AdminOperations, issue_search_jql};
pub use pagination::{MAX_PAGES, PaginationError, PaginationFailure, collect_all, search_issue_keys};
pub use report::summarize;
