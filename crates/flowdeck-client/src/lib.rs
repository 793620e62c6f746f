#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod api;
pub mod catalog;
pub mod query;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use api::WorkflowApi;
pub use catalog::{AllNodeTypes, NodeCatalog, NodeCategory};
pub use flowdeck_core::{Error, ErrorKind, Result};

/// Tracing target for workflow API operations.
pub const TRACING_TARGET: &str = "flowdeck_client";

/// Tracing target for the query cache.
pub const TRACING_TARGET_QUERY: &str = "flowdeck_client::query";
