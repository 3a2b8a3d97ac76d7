//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server exposing location detection, exchange rates and
//! conversion.

mod client_ip;
mod handlers;
mod rate_limit;
mod server;

pub use client_ip::{UNKNOWN_CLIENT_IP, client_ip_from_headers};
pub use handlers::{AppState, CACHE_ERROR, CACHE_SUCCESS};
pub use server::HttpServer;
