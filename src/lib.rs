//! # Hedge Fund Backend
//!
//! Service-composition shell for the hedge fund web backend. This crate wires
//! runtime configuration, the persistent store, the cross-origin policy, the
//! prebuilt single-page frontend and the Ollama startup diagnostics into one
//! axum server process.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`config`]: Environment-driven settings with an optional `.env` layer
//! - [`db`]: SQLite-backed persistent store, pooling and schema bootstrap
//! - [`http`]: Axum router, CORS policy, static frontend and API handlers
//! - [`services`]: External collaborators (Ollama status probe)
//!
//! Domain route handlers are mounted under `/api` and treated as an opaque
//! collaborator; this layer only provides the mount point, the middleware
//! stack and the SPA fallback around it.

pub mod config;
pub mod db;
pub mod http;
pub mod services;
