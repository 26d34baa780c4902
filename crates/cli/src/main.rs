use std::sync::Arc;

use anyhow::{Context, Result, bail};
use atladmin_api::{AdminConfig, AtlassianClient};
use atladmin_engine::AdminOperations;
use atladmin_mcp::{AtlassianAdminServer, McpHttpServer, resolve_bind_address, serve_stdio};
use atladmin_types::ReportDetail;
use atladmin_util::truncate_for_summary;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("tools", _)) => print_tools(),
        Some(("call", sub)) => run_call(sub).await,
        Some(("serve", sub)) => {
            let transport = sub.get_one::<String>("transport").map(String::as_str).unwrap_or("stdio");
            let bind = sub.get_one::<String>("bind").map(String::as_str);
            run_serve(sub, transport, bind).await
        }
        _ => run_serve(&matches, "stdio", None).await,
    }
}

/// Logs go to stderr; stdout belongs to the stdio transport and `call` output.
fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cli() -> Command {
    Command::new("atladmin")
        .about("Atlassian organization administration over MCP")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("report-detail")
                .long("report-detail")
                .global(true)
                .action(ArgAction::Set)
                .value_parser(["compact", "detailed"])
                .help("Override ATLASSIAN_ADMIN_REPORT_DETAIL"),
        )
        .arg(
            Arg::new("page-size")
                .long("page-size")
                .global(true)
                .action(ArgAction::Set)
                .value_parser(value_parser!(u32))
                .help("Override ATLASSIAN_SEARCH_PAGE_SIZE"),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the admin tools over MCP (default)")
                .arg(
                    Arg::new("transport")
                        .long("transport")
                        .action(ArgAction::Set)
                        .value_parser(["stdio", "http"])
                        .default_value("stdio"),
                )
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .action(ArgAction::Set)
                        .help("Loopback address for the http transport, e.g. 127.0.0.1:8787"),
                ),
        )
        .subcommand(Command::new("tools").about("List the available tools"))
        .subcommand(
            Command::new("call")
                .about("Run one tool and print its JSON response")
                .arg(Arg::new("tool").required(true).help("Tool name, e.g. atlassian_admin_list_user_groups"))
                .arg(
                    Arg::new("args")
                        .long("args")
                        .action(ArgAction::Set)
                        .help("Tool arguments as a JSON object"),
                ),
        )
}

/// `matches` must be the innermost matches so global overrides are visible.
fn load_operations(matches: &ArgMatches) -> Result<AdminOperations> {
    let mut config = AdminConfig::from_env().context("failed to load Atlassian configuration")?;
    if let Some(detail) = matches.get_one::<String>("report-detail") {
        let detail: ReportDetail = detail.parse().map_err(anyhow::Error::msg)?;
        config = config.with_report_detail(detail);
    }
    if let Some(page_size) = matches.get_one::<u32>("page-size") {
        config = config.with_search_page_size(*page_size);
    }

    let client = AtlassianClient::new(&config).context("failed to build Atlassian client")?;
    info!(
        base_url = %config.base_url,
        report_detail = %config.report_detail,
        page_size = config.search_page_size,
        "configuration loaded"
    );
    Ok(AdminOperations::new(Arc::new(client))
        .with_search_page_size(config.search_page_size)
        .with_report_detail(config.report_detail))
}

async fn run_serve(matches: &ArgMatches, transport: &str, bind: Option<&str>) -> Result<()> {
    let operations = load_operations(matches)?;
    match transport {
        "stdio" => serve_stdio(operations).await,
        "http" => {
            let bind_address = resolve_bind_address(bind)?;
            let running = McpHttpServer::new(bind_address, operations).start().await?;
            eprintln!("MCP endpoint: http://{}{}", running.bound_address(), atladmin_mcp::MCP_HTTP_PATH);
            tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
            info!(clients = running.connected_clients(), "shutdown requested");
            running.stop().await
        }
        other => bail!("unsupported transport: {other}"),
    }
}

async fn run_call(sub: &ArgMatches) -> Result<()> {
    let tool = sub.get_one::<String>("tool").context("expected a tool name")?;
    let arguments = match sub.get_one::<String>("args") {
        Some(raw) => serde_json::from_str(raw).with_context(|| format!("--args is not valid JSON: {raw}"))?,
        None => serde_json::Value::Null,
    };
    let operations = load_operations(sub)?;
    let response = atladmin_mcp::call_tool(&operations, tool, arguments).await?;
    println!("{}", serde_json::to_string_pretty(&response.to_value())?);
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_tools() -> Result<()> {
    for tool in AtlassianAdminServer::tool_catalog() {
        let description = tool.description.as_deref().unwrap_or_default();
        println!("{:<44} {}", tool.name, truncate_for_summary(description, 72));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn global_overrides_reach_subcommands() {
        let matches = cli()
            .try_get_matches_from(["atladmin", "serve", "--transport", "http", "--report-detail", "detailed", "--page-size", "25"])
            .expect("valid arguments");
        let (name, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "serve");
        assert_eq!(sub.get_one::<String>("transport").map(String::as_str), Some("http"));
        assert_eq!(sub.get_one::<String>("report-detail").map(String::as_str), Some("detailed"));
        assert_eq!(sub.get_one::<u32>("page-size"), Some(&25));
    }

    #[test]
    fn rejects_unknown_transport() {
        assert!(cli().try_get_matches_from(["atladmin", "serve", "--transport", "sse"]).is_err());
    }
}
