mod core;
mod dispatch;
mod http;
mod stdio;

pub use core::AtlassianAdminServer;
pub use dispatch::{DispatchError, call_tool};
pub use http::{MCP_HTTP_PATH, McpHttpServer, RunningMcpHttpServer, resolve_bind_address};
pub use stdio::serve_stdio;
