//! Demo upstream entry point.
//!
//! Serves the `joke` and `name-age` demo tools as a standalone MCP server,
//! over streamable HTTP by default or STDIO when `DEMO_TRANSPORT=stdio`.
//! `DEMO_TOOLS` restricts which tools are served, so two instances can play
//! two separate upstreams.

use anyhow::Result;
use rmcp::{
    ServiceExt,
    transport::streamable_http_server::{
        StreamableHttpService, session::local::LocalSessionManager,
    },
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use tool_gateway::domains::demo::{DemoConfig, DemoServer};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let server = DemoServer::new(DemoConfig::from_env())?;

    let transport = std::env::var("DEMO_TRANSPORT").unwrap_or_default();
    if transport.eq_ignore_ascii_case("stdio") {
        info!("Demo upstream ready on stdin/stdout");
        server.serve(rmcp::transport::stdio()).await?.waiting().await?;
        return Ok(());
    }

    let port: u16 = std::env::var("DEMO_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8001);
    let addr = format!("127.0.0.1:{port}");

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let app = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Demo upstream ready at http://{}/mcp", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
