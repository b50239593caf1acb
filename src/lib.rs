//! # Curator
//!
//! A catalog server for code assets and published modules harvested from
//! source repositories, usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! curator = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use curator::server::{AppState, create_router};
//!
//! let state = Arc::new(AppState {
//!     db_path: PathBuf::from("./data/catalog.db"),
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the `curator` binary. Disable with
//!   `default-features = false`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
