//! libcfg - library and module configuration resolver
//!
//! This crate turns per-library declaration files into resolved build kinds,
//! linkage facts, and a revision-checked module registry for the code
//! generators to consume.

pub mod core;
pub mod ops;
pub mod registry;
pub mod resolver;
pub mod util;

/// Test fixtures for libcfg unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use core::{declaration::LibraryDeclaration, env::Environment};

pub use resolver::{Resolution, ResolveError, Resolver};
pub use util::context::GlobalContext;
