use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use autocaller_gateway::{
    ServerConfig,
    core::{Readiness, TurnStrategy, gate},
    routes,
    state::AppState,
};

/// Autocaller Gateway - AI voice turns for Twilio calls
#[derive(Parser, Debug)]
#[command(name = "autocaller-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the configuration and report which webhook routes are ready
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing (RUST_LOG, default info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    // Load configuration from file or environment
    let config = if let Some(config_path) = cli.config {
        println!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    info!(
        app_url = config.public_url.is_some(),
        openai_key = config.openai_api_key.is_some(),
        elevenlabs_key = config.elevenlabs_api_key.is_some(),
        elevenlabs_voice = config.elevenlabs_voice_id.is_some(),
        storage = %config.storage.backend,
        "Configuration loaded"
    );

    if let Some(Commands::CheckConfig) = cli.command {
        let mut all_ready = true;
        for strategy in [TurnStrategy::Conversational, TurnStrategy::Echo] {
            match gate::readiness(&config, strategy) {
                Readiness::Ready => println!("{strategy}: ready"),
                Readiness::Missing(missing) => {
                    all_ready = false;
                    println!("{strategy}: missing {}", missing.join(", "));
                }
            }
        }
        if !all_ready {
            anyhow::bail!("Configuration incomplete");
        }
        return Ok(());
    }

    let address = config.address();
    let tls_config = config.tls.clone();
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config);
    let app = routes::create_app(app_state);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    // Start server with or without TLS
    if let Some(tls) = tls_config {
        // Load TLS configuration from certificate and key files
        let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to load TLS certificates from {} and {}: {}",
                    tls.cert_path.display(),
                    tls.key_path.display(),
                    e
                )
            })?;

        println!("Server listening on https://{} (TLS enabled)", socket_addr);

        axum_server::bind_rustls(socket_addr, rustls_config)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|e| anyhow!("TLS server error: {}", e))?;
    } else {
        println!("Server listening on http://{}", socket_addr);

        let listener = TcpListener::bind(&socket_addr).await?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
    }

    Ok(())
}
