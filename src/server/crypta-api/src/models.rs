//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crypta_storage::{Record, RecordId};

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
pub struct DataRequest {
    /// Plaintext value. A missing or null field counts as empty.
    pub data: Option<String>,
}

/// One record as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse {
    /// Record id.
    pub id: RecordId,
    /// Ciphertext, or plaintext on the decrypted endpoint.
    pub data: String,
}

impl From<Record> for DataResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            data: record.data,
        }
    }
}

/// Body of 500 responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Human-readable message.
    pub message: String,
}

/// Body of 400 responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// HTTP status code.
    pub status: u16,
    /// HTTP reason phrase.
    pub error: String,
    /// Individual failures.
    pub errors: Vec<FieldError>,
}

/// One validation failure.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Offending field, if the failure is tied to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// What went wrong.
    pub default_message: String,
}

/// Body of the health endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Server version.
    pub version: String,
}
