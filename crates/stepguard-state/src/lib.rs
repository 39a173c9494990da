//! Resource-state and stack oracles.
//!
//! - [`OracleRegistry`]: resource type -> existence check, with an optional fallback
//! - [`Snapshot`]: a JSON document of known resources and stacks
//! - [`HttpOracle`]: a JSON-over-HTTP state endpoint
//!
//! This crate is allowed to do filesystem and network IO.

#![forbid(unsafe_code)]

mod http;
mod registry;
mod snapshot;

pub use http::HttpOracle;
pub use registry::{ExistenceCheck, FallbackCheck, OracleRegistry};
pub use snapshot::{NoStacks, Snapshot};
