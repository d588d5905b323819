//! CampusCare Server - campus health-centre management API
//!
//! This library provides the core functionality of the CampusCare HTTP
//! server: the student registry, medicine inventory, prescription workflow
//! and lab reporting endpoints.

pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use error::*;
pub use server::CampusCareServer;

use axum::http::{header, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// CORS layer for browser clients
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}

/// Create the main application router with all routes and middleware
pub fn create_app(server: CampusCareServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer()),
        )
        .with_state(server)
}
