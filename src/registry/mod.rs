//! Registries filled from library declarations.
//!
//! - [`LibraryRegistry`]: one resolved build configuration per library
//! - [`ModuleRegistry`]: module identities and their revision histories
//! - [`LinkageFacts`]: shared-library records and static linkage flags

pub mod library;
pub mod linkage;
pub mod module;

pub use library::{LibraryRegistry, Registration};
pub use linkage::{LinkageFacts, SharedLibFact};
pub use module::{module_from_declaration, ModuleEntry, ModuleRegistry};
