//! HTTP API module
//!
//! Provides JSON endpoints for triple pattern search, counting, literal search and
//! term lookup over one open document.

pub mod server;

pub use server::{create_server, start_server, AppState, ErrorResponse, HealthResponse};
