// src/main.rs
//! Traffic insurance policy API entry point.
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use traffic_insurance_api::api::server::PolicyServer;
use traffic_insurance_api::app;
use traffic_insurance_api::core::config::AppConfig;
use traffic_insurance_api::service::PolicyLookupService;

#[derive(Parser)]
#[command(name = "policy_api")]
#[command(about = "Traffic insurance policy and balance API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Path to a TOML config file (defaults to $CONFIG_PATH or ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind, overrides the config file
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides the config file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Look up one policy and print the JSON document
    Lookup {
        /// Caller account address
        #[arg(long)]
        address: String,
        /// Car license plate
        #[arg(long)]
        plate: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging()?;

    info!("Starting traffic insurance policy API v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(args.config.as_deref())?;
    let reader = app::bootstrap(&config).await?;

    match args.command {
        Some(Commands::Lookup { address, plate }) => {
            let service = PolicyLookupService::new(reader);
            let doc = service.policy_and_balance(&address, &plate).await?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            PolicyServer::new(reader, &config.server).start().await?;
        }
        None => {
            info!("No command specified, starting server on {}", config.server.bind_addr());
            PolicyServer::new(reader, &config.server).start().await?;
        }
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=info,h2=info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
