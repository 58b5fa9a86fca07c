//! Crypta CLI - Command line interface.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "crypta")]
#[command(about = "Crypta CLI - Store and read encrypted values")]
#[command(version)]
struct Cli {
    /// Crypta server address
    #[arg(long, default_value = "http://localhost:8080", env = "CRYPTA_ADDR")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Status,
    /// List stored records (ciphertext)
    List,
    /// Read one record decrypted
    Get {
        /// Record id
        id: i64,
        /// Output format (json, value)
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Encrypt and store a new value
    Create {
        /// Value to store (1 to 245 bytes)
        value: String,
    },
    /// Encrypt and replace an existing value
    Update {
        /// Record id
        id: i64,
        /// New value (1 to 245 bytes)
        value: String,
    },
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct DataRequest<'a> {
    data: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
struct DataResponse {
    id: i64,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ValidationErrors {
    errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldError {
    field: Option<String>,
    default_message: String,
}

// ============================================================================
// HTTP Client
// ============================================================================

struct CryptaClient {
    client: Client,
    base_url: String,
}

impl CryptaClient {
    fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_health(&self) -> Result<HealthResponse> {
        let resp = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .context("Failed to connect to server")?;

        let resp = check(resp, "Health check").await?;
        resp.json().await.context("Failed to parse response")
    }

    async fn list(&self) -> Result<Vec<DataResponse>> {
        let resp = self
            .client
            .get(self.url("/data"))
            .send()
            .await
            .context("Failed to connect to server")?;

        let resp = check(resp, "List").await?;
        resp.json().await.context("Failed to parse response")
    }

    async fn get_decrypted(&self, id: i64) -> Result<DataResponse> {
        let resp = self
            .client
            .get(self.url(&format!("/data/{}/decrypted", id)))
            .send()
            .await
            .context("Failed to connect to server")?;

        if resp.status() == StatusCode::NOT_FOUND {
            bail!("no record with id {}", id);
        }

        let resp = check(resp, "Get").await?;
        resp.json().await.context("Failed to parse response")
    }

    async fn create(&self, value: &str) -> Result<DataResponse> {
        let resp = self
            .client
            .post(self.url("/data"))
            .json(&DataRequest { data: value })
            .send()
            .await
            .context("Failed to connect to server")?;

        let resp = check(resp, "Create").await?;
        resp.json().await.context("Failed to parse response")
    }

    async fn update(&self, id: i64, value: &str) -> Result<DataResponse> {
        let resp = self
            .client
            .put(self.url(&format!("/data/{}", id)))
            .json(&DataRequest { data: value })
            .send()
            .await
            .context("Failed to connect to server")?;

        if resp.status() == StatusCode::NOT_FOUND {
            bail!("no record with id {}", id);
        }

        let resp = check(resp, "Update").await?;
        resp.json().await.context("Failed to parse response")
    }
}

/// Turns a non-success response into an error carrying the server's message.
async fn check(resp: Response, action: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();

    if status == StatusCode::BAD_REQUEST {
        if let Ok(validation) = serde_json::from_str::<ValidationErrors>(&body) {
            let reasons: Vec<String> = validation
                .errors
                .into_iter()
                .map(|e| match e.field {
                    Some(field) => format!("{}: {}", field, e.default_message),
                    None => e.default_message,
                })
                .collect();
            bail!("{} rejected: {}", action, reasons.join("; "));
        }
    }

    let message = serde_json::from_str::<ErrorMessage>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| format!("HTTP {}", status));
    bail!("{} failed: {}", action, message)
}

// ============================================================================
// Command Handlers
// ============================================================================

async fn cmd_status(client: &CryptaClient) -> Result<()> {
    let health = client.get_health().await?;

    println!("Crypta server status:");
    println!("  Status:  {}", health.status);
    println!("  Version: {}", health.version);

    Ok(())
}

async fn cmd_list(client: &CryptaClient) -> Result<()> {
    let records = client.list().await?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn cmd_get(client: &CryptaClient, id: i64, format: &str) -> Result<()> {
    let record = client.get_decrypted(id).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&record)?),
        "value" => println!("{}", record.data),
        _ => bail!("Unknown format: {}. Use 'json' or 'value'", format),
    }

    Ok(())
}

async fn cmd_create(client: &CryptaClient, value: &str) -> Result<()> {
    let record = client.create(value).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn cmd_update(client: &CryptaClient, id: i64, value: &str) -> Result<()> {
    let record = client.update(id, value).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = CryptaClient::new(&cli.addr)?;

    match cli.command {
        Commands::Status => cmd_status(&client).await,
        Commands::List => cmd_list(&client).await,
        Commands::Get { id, format } => cmd_get(&client, id, &format).await,
        Commands::Create { value } => cmd_create(&client, &value).await,
        Commands::Update { id, value } => cmd_update(&client, id, &value).await,
    }
}
