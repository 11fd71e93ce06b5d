//! Viewer library module.
//!
//! Provides the HTTP server, the SSE publish loop, and the embedded
//! single-page client for interactive heatmap display.
//!
//! # Architecture
//!
//! - `server` - axum router, API handlers, and the per-subscription publish
//!   loop that polls the counter store and pushes snapshots

pub mod server;

pub use server::{run_server, ServerConfig, DEFAULT_PUSH_INTERVAL};
