#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod connectivity;
pub mod editor;
mod id;
pub mod schema;
pub mod transcode;
pub mod wire;

#[doc(hidden)]
pub mod prelude;

pub use id::{DEFAULT_ID_PREFIX, generate_id};

/// Tracing target for graph transcoding.
pub const TRACING_TARGET: &str = "flowdeck_graph";

/// Tracing target for connectivity checks.
pub const TRACING_TARGET_CONNECTIVITY: &str = "flowdeck_graph::connectivity";
