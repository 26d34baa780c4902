//! Streamable HTTP hosting for the admin MCP server.

use std::net::{IpAddr, SocketAddr};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use atladmin_engine::AdminOperations;
use axum::Router;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::server::core::AtlassianAdminServer;

/// Path the MCP endpoint is mounted under.
pub const MCP_HTTP_PATH: &str = "/mcp";

/// Host configuration for a local MCP HTTP server instance.
#[derive(Clone)]
pub struct McpHttpServer {
    bind_address: SocketAddr,
    operations: AdminOperations,
}

impl McpHttpServer {
    pub fn new(bind_address: SocketAddr, operations: AdminOperations) -> Self {
        Self { bind_address, operations }
    }

    /// Bind the listener and serve sessions until [`RunningMcpHttpServer::stop`] is called.
    pub async fn start(self) -> Result<RunningMcpHttpServer> {
        let cancellation_token = CancellationToken::new();
        let session_manager = Arc::new(LocalSessionManager::default());
        let client_counter = Arc::new(AtomicUsize::new(0));
        let monitor_handle = spawn_session_monitor(
            Arc::clone(&session_manager),
            Arc::clone(&client_counter),
            cancellation_token.child_token(),
        );

        let operations = self.operations;
        let service: StreamableHttpService<AtlassianAdminServer, LocalSessionManager> = StreamableHttpService::new(
            move || Ok(AtlassianAdminServer::new(operations.clone())),
            Arc::clone(&session_manager),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: None,
                cancellation_token: cancellation_token.child_token(),
                ..Default::default()
            },
        );

        let router = Router::new().nest_service(MCP_HTTP_PATH, service);
        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("failed to bind MCP HTTP listener on {}", self.bind_address))?;
        let bound_address = listener.local_addr()?;
        info!(address = %bound_address, path = MCP_HTTP_PATH, "MCP HTTP server listening");

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let served = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
                if let Err(error) = served {
                    warn!(address = %bound_address, error = %error, "MCP HTTP server exited with an error");
                }
            }
        });

        Ok(RunningMcpHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
            monitor_handle,
            client_counter,
        })
    }
}

/// Runtime handle for a running MCP HTTP server.
#[derive(Debug)]
pub struct RunningMcpHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
    monitor_handle: JoinHandle<()>,
    client_counter: Arc<AtomicUsize>,
}

impl RunningMcpHttpServer {
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Most recently observed number of open MCP sessions.
    pub fn connected_clients(&self) -> usize {
        self.client_counter.load(Ordering::Relaxed)
    }

    /// Stop the server and wait for background tasks to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.monitor_handle
            .await
            .map_err(|error| anyhow!("MCP HTTP monitor task failed: {error}"))?;
        self.server_handle
            .await
            .map_err(|error| anyhow!("MCP HTTP server task failed: {error}"))?;
        info!(address = %self.bind_address, "MCP HTTP server stopped");
        Ok(())
    }
}

/// Resolve a loopback bind address, defaulting to an ephemeral port.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    let address = bind_address.unwrap_or("127.0.0.1:0");
    let parsed: SocketAddr = address
        .parse()
        .map_err(|error| anyhow!("invalid MCP HTTP bind address '{address}': {error}"))?;
    if !is_loopback(parsed.ip()) {
        return Err(anyhow!("MCP HTTP server must bind to a loopback address"));
    }
    Ok(parsed)
}

fn is_loopback(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(ip) => ip.is_loopback(),
        IpAddr::V6(ip) => ip.is_loopback(),
    }
}

fn spawn_session_monitor(
    session_manager: Arc<LocalSessionManager>,
    client_counter: Arc<AtomicUsize>,
    cancellation_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(500));
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => break,
                _ = ticker.tick() => {
                    let count = session_manager.sessions.read().await.len();
                    client_counter.store(count, Ordering::Relaxed);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use atladmin_engine::RecordingClient;
    use serde_json::Value;

    #[test]
    fn default_bind_address_is_ephemeral_loopback() {
        let address = resolve_bind_address(None).expect("default address");
        assert!(address.ip().is_loopback());
        assert_eq!(address.port(), 0);
    }

    #[test]
    fn accepts_ipv6_loopback() {
        let address = resolve_bind_address(Some("[::1]:8787")).expect("ipv6 loopback");
        assert_eq!(address.port(), 8787);
    }

    #[test]
    fn rejects_non_loopback_and_malformed_addresses() {
        let error = resolve_bind_address(Some("0.0.0.0:8080")).expect_err("wildcard must be rejected");
        assert!(error.to_string().contains("loopback"));
        let error = resolve_bind_address(Some("localhost")).expect_err("missing port");
        assert!(error.to_string().contains("invalid MCP HTTP bind address 'localhost'"));
    }

    #[tokio::test]
    async fn starts_on_ephemeral_port_and_stops() {
        let operations = AdminOperations::new(Arc::new(RecordingClient::succeeding(Value::Null)));
        let address = resolve_bind_address(None).expect("default address");
        let running = McpHttpServer::new(address, operations).start().await.expect("server start");

        assert!(running.bound_address().ip().is_loopback());
        assert_ne!(running.bound_address().port(), 0);
        assert_eq!(running.connected_clients(), 0);
        running.stop().await.expect("server stop");
    }
}
