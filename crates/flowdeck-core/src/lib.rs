#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod case;
mod error;

pub use error::{BoxedError, Error, ErrorKind, Result};
