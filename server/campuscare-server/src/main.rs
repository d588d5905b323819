use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use campuscare_server::{create_app, CampusCareServer};

/// CampusCare Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "campuscare-server")]
#[command(about = "Campus health-centre management HTTP API server")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8080", env = "PORT")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.verbose)?;

    info!("Starting CampusCare Engine HTTP Server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let server = CampusCareServer::new().await?;
    let app = create_app(server);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!("Server running on http://{addr}");
    info!("Health check available at: http://{addr}/health");
    info!("API v1 available at: http://{addr}/api/v1");
    info!("API docs available at: http://{addr}/docs");

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose {
        "campuscare_server=debug,clinic_workflow=debug,tower_http=debug,info"
    } else {
        "campuscare_server=info,clinic_workflow=info,info"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("invalid RUST_LOG filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to initialize tracing")?;
    Ok(())
}
