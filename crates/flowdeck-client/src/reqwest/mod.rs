//! Reqwest-based HTTP client for the workflow service.
//!
//! Response bodies are rewritten to camelCase keys before parsing. Request
//! bodies are sent as camelCase unless [`ReqwestConfig::request_key_case`] asks
//! for snake_case.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowdeck_client::WorkflowApi;
//! use flowdeck_client::reqwest::{ReqwestClient, ReqwestConfig};
//!
//! let client = ReqwestClient::new(ReqwestConfig::default())?;
//! let document = client.fetch_workflow("twflow_7c671147ef").await?;
//! ```

mod client;
mod config;
mod error;

pub use client::ReqwestClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, ReqwestConfig};
pub use error::{Error, Result};

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "flowdeck_client::reqwest";
