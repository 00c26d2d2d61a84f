//! selectgen-lib: translation of per-variant module properties into Bazel
//! configurable attributes.
//!
//! The crate is organised leaves first:
//! - `axis`: configuration axes and the registry of their valid values
//! - `attribute`: configurable list attributes and their resolution
//! - `cquery`: requests to the configured-query tool and reply parsing
//! - `emit`: `select()` decomposition and Starlark rendering
//! - `convert`: module snapshots in, BUILD files out

pub mod attribute;
pub mod axis;
pub mod consts;
pub mod convert;
pub mod cquery;
pub mod emit;
