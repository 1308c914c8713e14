//! Gateway Entry Point
//!
//! Loads configuration, discovers every configured upstream, and only then
//! starts serving the aggregated catalog on the configured transport.

use anyhow::Result;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

use tool_gateway::core::{Config, GatewayServer, TransportService};
use tool_gateway::domains::upstream::RmcpConnector;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_logging(&config.logging.level, config.logging.with_timestamps);

    info!("Starting {} v{}", config.server.name, config.server.version);
    config.log_summary();

    let server = match GatewayServer::bootstrap(config.clone(), &RmcpConnector).await {
        Ok(server) => server,
        Err(e) => {
            error!("Tool discovery failed, not serving: {}", e);
            return Err(e.into());
        }
    };

    let transport = TransportService::new(config.transport);
    transport.run(server).await?;

    info!("Gateway shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs always go to stderr; stdout belongs to the STDIO transport.
fn init_logging(level: &str, with_timestamps: bool) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
