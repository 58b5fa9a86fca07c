//! Integration tests for Crypta server.
//!
//! These tests drive the full HTTP stack against a SQLite store, from value
//! creation to decrypted reads.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crypta_api::AppState;
use crypta_crypto::RsaCipher;
use crypta_data::DataEngine;
use crypta_storage_sqlite::SqliteStore;

/// Base64 SubjectPublicKeyInfo used by every test server.
pub const PUBLIC_KEY: &str = include_str!("../../../src/core/crypta-crypto/testdata/public_key.b64");
/// Base64 PKCS#8 private key matching [`PUBLIC_KEY`].
pub const PRIVATE_KEY: &str =
    include_str!("../../../src/core/crypta-crypto/testdata/private_key.b64");

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct DataRequest<'a> {
    pub data: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataResponse {
    pub id: i64,
    pub data: String,
}

// ============================================================================
// Test Server
// ============================================================================

/// An in-process server bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    _data_dir: Option<TempDir>,
}

impl TestServer {
    /// Start a server on a fresh data directory.
    pub async fn start() -> Result<Self> {
        let data_dir = TempDir::new().context("Failed to create temp dir")?;
        let mut server = Self::start_in(data_dir.path()).await?;
        server._data_dir = Some(data_dir);
        Ok(server)
    }

    /// Start a server on an existing data directory.
    pub async fn start_in(data_dir: &Path) -> Result<Self> {
        let store = SqliteStore::open(data_dir, "crypta")
            .await
            .context("Failed to open store")?;
        let cipher = RsaCipher::from_base64(PUBLIC_KEY, PRIVATE_KEY)?;
        let engine = DataEngine::new(Arc::new(store), Arc::new(cipher));
        let app = crypta_api::router(AppState::new(Arc::new(engine)));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await;
        });

        let server = Self {
            base_url: format!("http://{}", addr),
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
            _data_dir: None,
        };

        server.wait_for_ready().await?;

        Ok(server)
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_for_ready(&self) -> Result<()> {
        let client = Client::new();
        let url = format!("{}/health", self.base_url);

        for _ in 0..50 {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }

        bail!("Server failed to start within 5 seconds")
    }

    /// Get a configured HTTP client for this server.
    pub fn client(&self) -> CryptaClient {
        CryptaClient::new(&self.base_url)
    }

    /// Stop the server and wait for it to release the store.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// Test Client
// ============================================================================

/// HTTP client for testing the Crypta API.
pub struct CryptaClient {
    client: Client,
    base_url: String,
}

impl CryptaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.json().await?)
    }

    pub async fn list(&self) -> Result<Vec<DataResponse>> {
        let resp = self.client.get(self.url("/data")).send().await?;
        if !resp.status().is_success() {
            bail!("List failed: {}", resp.text().await?);
        }
        Ok(resp.json().await?)
    }

    pub async fn create(&self, value: &str) -> Result<DataResponse> {
        let (status, body) = self
            .create_raw(&serde_json::to_value(DataRequest { data: value })?)
            .await?;
        if status != StatusCode::CREATED {
            bail!("Create failed with {}: {}", status, body);
        }
        Ok(serde_json::from_value(body)?)
    }

    pub async fn update(&self, id: i64, value: &str) -> Result<DataResponse> {
        let (status, body) = self
            .update_raw(id, &serde_json::to_value(DataRequest { data: value })?)
            .await?;
        if !status.is_success() {
            bail!("Update failed with {}: {}", status, body);
        }
        Ok(serde_json::from_value(body)?)
    }

    pub async fn get_decrypted(&self, id: i64) -> Result<DataResponse> {
        let (status, body) = self.get_decrypted_raw(id).await?;
        if !status.is_success() {
            bail!("Get failed with {}: {}", status, body);
        }
        Ok(serde_json::from_value(body)?)
    }

    /// `POST /data` with an arbitrary JSON body.
    pub async fn create_raw(&self, body: &Value) -> Result<(StatusCode, Value)> {
        let resp = self.client.post(self.url("/data")).json(body).send().await?;
        read(resp).await
    }

    /// `PUT /data/{id}` with an arbitrary JSON body.
    pub async fn update_raw(&self, id: i64, body: &Value) -> Result<(StatusCode, Value)> {
        let resp = self
            .client
            .put(self.url(&format!("/data/{}", id)))
            .json(body)
            .send()
            .await?;
        read(resp).await
    }

    /// `GET /data/{id}/decrypted`
    pub async fn get_decrypted_raw(&self, id: i64) -> Result<(StatusCode, Value)> {
        let resp = self
            .client
            .get(self.url(&format!("/data/{}/decrypted", id)))
            .send()
            .await?;
        read(resp).await
    }

    /// Send a raw request and return status, headers and body text.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut req = self.client.request(method, self.url(path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        if let Some(body) = body {
            req = req.body(body.to_string());
        }
        Ok(req.send().await?)
    }
}

/// Status and JSON body of a response. An empty body reads as `null`.
async fn read(resp: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = resp.status();
    let text = resp.text().await?;
    if text.is_empty() {
        return Ok((status, Value::Null));
    }
    Ok((status, serde_json::from_str(&text)?))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_server_health() {
        let server = TestServer::start().await.unwrap();
        let health = server.client().health().await.unwrap();

        assert_eq!(health.status, "ok");
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_full_data_workflow() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        // 1. Nothing stored yet
        assert!(client.list().await.unwrap().is_empty());

        // 2. Create a value; the response carries ciphertext
        let created = client.create("test").await.unwrap();
        assert_eq!(created.id, 1);
        assert_ne!(created.data, "test");

        // 3. Listing shows the same ciphertext
        let list = client.list().await.unwrap();
        assert_eq!(list, vec![created.clone()]);

        // 4. Decrypted read returns the plaintext
        let plain = client.get_decrypted(1).await.unwrap();
        assert_eq!(plain, DataResponse { id: 1, data: "test".to_string() });

        // 5. Update under the same id
        let updated = client.update(1, "updated").await.unwrap();
        assert_eq!(updated.id, 1);
        assert_ne!(updated.data, created.data);

        // 6. Decrypted read follows the update
        let plain = client.get_decrypted(1).await.unwrap();
        assert_eq!(plain.data, "updated");

        // 7. Unknown ids are not found
        let (status, body) = client.get_decrypted_raw(999).await.unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        for (i, value) in ["a", "b", "c"].iter().enumerate() {
            let created = client.create(value).await.unwrap();
            assert_eq!(created.id, i as i64 + 1);
        }

        let ids: Vec<i64> = client.list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_unknown_id_creates_nothing() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let (status, body) = client.update_raw(42, &json!({ "data": "x" })).await.unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, Value::Null);
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_rejects_out_of_range_values() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        for body in [
            json!({ "data": "" }),
            json!({ "data": null }),
            json!({}),
            json!({ "data": "x".repeat(246) }),
        ] {
            let (status, response) = client.create_raw(&body).await.unwrap();
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(response["status"], 400);
            assert_eq!(response["error"], "Bad Request");
            assert_eq!(response["errors"][0]["field"], "data");
            assert_eq!(
                response["errors"][0]["defaultMessage"],
                "size must be between 1 and 245"
            );
        }

        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_limit_counts_bytes() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let max = "x".repeat(245);
        let created = client.create(&max).await.unwrap();
        assert_eq!(client.get_decrypted(created.id).await.unwrap().data, max);

        // 123 two-byte characters is 246 bytes
        let (status, _) = client
            .create_raw(&json!({ "data": "é".repeat(123) }))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unicode = "Olá, mundo! 🔐";
        let created = client.create(unicode).await.unwrap();
        assert_eq!(client.get_decrypted(created.id).await.unwrap().data, unicode);
    }

    #[tokio::test]
    async fn test_update_validation_keeps_old_value() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        client.create("keep").await.unwrap();
        let (status, _) = client.update_raw(1, &json!({ "data": "" })).await.unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(client.get_decrypted(1).await.unwrap().data, "keep");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let resp = client
            .request(
                reqwest::Method::POST,
                "/data",
                &[("content-type", "application/json")],
                Some("{not json"),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let resp = client
            .request(
                reqwest::Method::OPTIONS,
                "/data",
                &[
                    ("origin", "http://example.org"),
                    ("access-control-request-method", "POST"),
                ],
                None,
            )
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_data_survives_restart() {
        let data_dir = TempDir::new().unwrap();

        let server = TestServer::start_in(data_dir.path()).await.unwrap();
        let created = server.client().create("persistent").await.unwrap();
        server.stop().await;

        let server = TestServer::start_in(data_dir.path()).await.unwrap();
        let client = server.client();

        assert_eq!(client.list().await.unwrap(), vec![created.clone()]);
        assert_eq!(
            client.get_decrypted(created.id).await.unwrap().data,
            "persistent"
        );

        // Ids keep counting after a restart
        assert_eq!(client.create("next").await.unwrap().id, created.id + 1);
    }
}
