//! # Crypta API
//!
//! REST layer for Crypta.
//!
//! ## Endpoints
//!
//! - `GET /data` - List records (ciphertext)
//! - `POST /data` - Encrypt and store a value
//! - `PUT /data/{id}` - Encrypt and replace a value
//! - `GET /data/{id}/decrypted` - Read one record decrypted
//! - `GET /health` - Liveness

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crypta_data::DataService;

pub use error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The data service requests are served from.
    pub data: Arc<dyn DataService>,
}

impl AppState {
    /// Creates state around a data service.
    pub fn new(data: Arc<dyn DataService>) -> Self {
        Self { data }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/data", get(handlers::list_data).post(handlers::save_data))
        .route("/data/{id}", put(handlers::update_data))
        .route("/data/{id}/decrypted", get(handlers::get_decrypted_data))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
