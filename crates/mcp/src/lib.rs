//! Model Context Protocol server for Atlassian organization administration.
//!
//! Exposes the admin operations as MCP tools over stdio or a local
//! streamable HTTP endpoint.

pub mod server;

pub use server::{
    AtlassianAdminServer, DispatchError, MCP_HTTP_PATH, McpHttpServer, RunningMcpHttpServer, call_tool, resolve_bind_address,
    serve_stdio,
};
