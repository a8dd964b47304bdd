//! High-level operations.
//!
//! This module contains the implementation of libcfg commands.

pub mod catalog;
pub mod load;
pub mod resolve;

pub use catalog::{catalog_entries, CatalogEntry, LoaderTable, TableCounts};
pub use load::{load_declarations, parse_declarations, LoadedDeclarations};
pub use resolve::{resolve_declarations, BuildKindSummary, ResolveRequest};
