//! Core data structures for libcfg.
//!
//! This module contains the foundational types used throughout libcfg:
//! - Environment flags and mode switches
//! - Flag-conditioned values
//! - Build kinds and the build-kind policy
//! - Raw declarations, resolved libraries, module identities and revisions

pub mod build_kind;
pub mod conditional;
pub mod declaration;
pub mod env;
pub mod library;
pub mod module;

pub use build_kind::{resolve_library_build_kind, BuildKind, KindResolution};
pub use conditional::{ConditionalValue, MissingDefault};
pub use declaration::{AmdbDescriptor, IslandValue, LibraryDeclaration};
pub use env::{Environment, Modes};
pub use library::ResolvedLibrary;
pub use module::{BuiltType, InterfaceType, ModuleId, ModuleRevision, ModuleType};
