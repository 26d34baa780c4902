//! Atlassian API access for the admin tools.
//!
//! This crate provides:
//!
//! - [`AdminConfig`]: process configuration loaded once from the environment
//! - [`Credential`]: the email/API-token pair used for Basic authentication
//! - [`RemoteClient`]: the seam through which every remote call is issued
//! - [`AtlassianClient`]: the reqwest-backed implementation of that seam
//!
//! # Example
//!
//! ```ignore
//! use atladmin_api::{AdminConfig, AtlassianClient, RemoteClient};
//! use atladmin_types::{RemoteCall, RemoteMethod};
//!
//! let config = AdminConfig::from_env()?;
//! let client = AtlassianClient::new(&config)?;
//! let call = RemoteCall::new(RemoteMethod::Read, "/rest/api/3/user/groups").with_query("accountId", "abc");
//! let result = client.call(&call).await;
//! println!("ok: {}", result.is_ok());
//! ```

pub mod client;
pub mod config;
pub mod credential;

pub use client::{AtlassianClient, RemoteClient};
pub use config::{AdminConfig, ConfigError};
pub use credential::Credential;
