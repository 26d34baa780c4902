use anyhow::{Context, Result};
use atladmin_engine::AdminOperations;
use rmcp::ServiceExt;
use tracing::{error, info};

use crate::server::core::AtlassianAdminServer;

/// Serve the admin tools over stdin/stdout until the client disconnects.
///
/// Stdout carries the protocol, so logging must be routed to stderr.
pub async fn serve_stdio(operations: AdminOperations) -> Result<()> {
    info!("starting MCP server on stdio");
    let service = AtlassianAdminServer::new(operations)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|err| error!(error = %err, "failed to start MCP stdio session"))
        .context("failed to start MCP stdio session")?;
    let reason = service.waiting().await.context("MCP stdio session failed")?;
    info!(?reason, "MCP stdio session closed");
    Ok(())
}
