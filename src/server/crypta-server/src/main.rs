//! Crypta Server - Main entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crypta_api::AppState;
use crypta_crypto::{KeyPair, RsaCipher};
use crypta_data::DataEngine;
use crypta_storage::{MemoryStore, RecordStore};
use crypta_storage_sqlite::SqliteStore;

/// Name of the SQLite database under the data directory.
const STORE_NAME: &str = "crypta";

#[derive(Parser)]
#[command(name = "crypta-server")]
#[command(about = "Crypta - values encrypted at rest, decrypted on read")]
#[command(version)]
struct Cli {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:8080", env = "CRYPTA_BIND_ADDRESS")]
    bind: String,

    /// Directory holding the SQLite database
    #[arg(long, default_value = "data", env = "CRYPTA_DATA_DIR")]
    data_dir: PathBuf,

    /// Base64 DER (X.509 SubjectPublicKeyInfo) RSA public key
    #[arg(long, env = "CRYPTA_RSA_PUBLIC_KEY", hide_env_values = true)]
    rsa_public_key: Option<String>,

    /// Base64 DER (PKCS#8) RSA private key
    #[arg(long, env = "CRYPTA_RSA_PRIVATE_KEY", hide_env_values = true)]
    rsa_private_key: Option<String>,

    /// Enable development mode (ephemeral keys, in-memory storage)
    #[arg(long, env = "CRYPTA_DEV_MODE")]
    dev: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a 2048-bit RSA key pair and print it as environment variables
    Keygen,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Some(Command::Keygen) = cli.command {
        return keygen();
    }

    info!("Starting Crypta server...");
    info!("Bind address: {}", cli.bind);

    let (cipher, store) = if cli.dev {
        warn!("Development mode enabled - DO NOT USE IN PRODUCTION");
        warn!("Using an ephemeral key pair and in-memory storage; data is lost on exit");
        let keys = KeyPair::generate().context("failed to generate development key pair")?;
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        (RsaCipher::new(keys), store)
    } else {
        let cipher = load_cipher(&cli)?;
        let store: Arc<dyn RecordStore> = Arc::new(
            SqliteStore::open(&cli.data_dir, STORE_NAME)
                .await
                .with_context(|| format!("failed to open store in {}", cli.data_dir.display()))?,
        );
        (cipher, store)
    };

    let engine = DataEngine::new(store, Arc::new(cipher));
    let app = crypta_api::router(AppState::new(Arc::new(engine)));

    let listener = TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;

    info!(address = %listener.local_addr()?, "Crypta server started successfully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");

    Ok(())
}

/// Loads the configured key pair. Both halves are required.
fn load_cipher(cli: &Cli) -> anyhow::Result<RsaCipher> {
    let public_key = cli
        .rsa_public_key
        .as_deref()
        .context("missing RSA public key: set CRYPTA_RSA_PUBLIC_KEY or pass --rsa-public-key")?;
    let private_key = cli
        .rsa_private_key
        .as_deref()
        .context("missing RSA private key: set CRYPTA_RSA_PRIVATE_KEY or pass --rsa-private-key")?;

    RsaCipher::from_base64(public_key, private_key).context("failed to load RSA key pair")
}

fn keygen() -> anyhow::Result<()> {
    let keys = KeyPair::generate()?;
    println!("CRYPTA_RSA_PUBLIC_KEY={}", keys.public_key_base64()?);
    println!("CRYPTA_RSA_PRIVATE_KEY={}", *keys.private_key_base64()?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
