use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use devregd::core::DeviceRepository;
use devregd::{assets, config, context, db, logging, web};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "devregd")]
#[command(about = "Device Lifecycle Registry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve(ServerArgs),
}

#[derive(Args, Serialize)]
struct ServerArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    http_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    database_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    bucket: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    simulation: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    log_json: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve(args) => {
            let config = config::AppConfig::new(Some(args))?;
            logging::init(logging::LogConfig {
                json: config.log_json,
                verbose: config.verbose,
            });
            run_server(config).await.context("Failed to start server")?
        }
    }

    Ok(())
}

async fn run_server(config: config::AppConfig) -> Result<()> {
    let repo: Arc<dyn DeviceRepository> = if config.simulation {
        tracing::warn!("simulation mode: device records held in memory only");
        Arc::new(db::MemoryDeviceRepository::new())
    } else {
        let conn = db::init(&config.database_path)
            .await
            .context("Failed to open device database")?;
        Arc::new(db::SqliteDeviceRepository::new(conn))
    };

    let assets = assets::get_store(&config).await;
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let ctx = context::AppContext::new(config, repo, assets);

    let server = Arc::new(web::WebServer::new(ctx, bind_addr));

    let signal_target = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_target.shutdown();
        }
    });

    server.start().await
}
