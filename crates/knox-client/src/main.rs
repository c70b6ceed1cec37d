use anyhow::Context as _;
use clap::Parser as _;
use knox_mcp_client::cli::Cli;
use knox_mcp_client::http::HttpCaller;
use knox_mcp_client::logging;
use knox_mcp_client::server::KnoxServer;
use rmcp::ServiceExt as _;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format)?;

    let http = HttpCaller::new(cli.request_timeout()).context("build HTTP client")?;
    let service = KnoxServer::new(http)
        .serve(rmcp::transport::stdio())
        .await
        .context("MCP initialize over stdio")?;
    info!(version = env!("CARGO_PKG_VERSION"), "knox-client MCP server ready");

    let cancel = service.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            cancel.cancel();
        }
    });

    service.waiting().await.context("MCP service task")?;
    info!("stdio transport closed");
    Ok(())
}
