//! Media Download Server
//!
//! A small HTTP service that serves indexed media files as forced,
//! nonce-protected downloads, streamed in fixed 1 MiB chunks so memory
//! stays bounded for arbitrarily large files.
//!
//! # Modules
//!
//! - `auth`: anti-forgery nonces and request authorization
//! - `download`: header assembly and the chunked streaming body
//! - `hooks`: permission / header extension points
//! - `media`: attachment index (sqlite) and media-root scanner

pub mod auth;
pub mod config;
pub mod download;
pub mod error;
pub mod hooks;
pub mod media;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest(
            "/media",
            routes::download::router().merge(routes::form::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
