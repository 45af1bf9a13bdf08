//! Regen Core - Structural merge engine for regenerated source.
//!
//! When code generated from a schema is regenerated after the schema
//! changes, the previous output may carry developer edits (function bodies,
//! helper methods, listener configuration). This crate merges the previous
//! declaration tree with the freshly generated one so those edits survive,
//! and reports every change that can break existing clients.
//!
//! # Features
//!
//! - **Kind-aware merge**: services, classes, object types, records, unions,
//!   enums and functions each follow their own merge policy
//! - **Breaking-change warnings**: a closed catalog of warning kinds, emitted
//!   in traversal order
//! - **Parallel batch merge**: merge many file pairs concurrently using Rayon
//! - **JSON exchange**: trees and results travel as JSON between tools
//!
//! # Usage
//!
//! ```
//! use regen_core::{merge_modules, SchemaIndex};
//! use regen_core::types::{Declaration, FunctionDecl, Member, Module, ServiceDecl, TypeExpr};
//!
//! let resolver = |returns: TypeExpr| {
//!     Member::Function(FunctionDecl::resource("get", "name").returning(returns))
//! };
//! let service = |members| {
//!     Module::new(vec![Declaration::Service(ServiceDecl { members, ..Default::default() })])
//! };
//!
//! let prev = service(vec![resolver(TypeExpr::named("string"))]);
//! let next = service(vec![resolver(TypeExpr::named("string").optional())]);
//!
//! let outcome = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap();
//! assert_eq!(outcome.warnings[0].values, vec!["string", "string?"]);
//! ```

pub mod error;
pub mod exporter;
pub mod merge;
pub mod schema;
pub mod types;
pub mod warning;

pub use error::{MergeError, Result};
pub use merge::{merge_module_pairs, merge_modules, MergeOutcome, ModulePair};
pub use schema::{SchemaIndex, SchemaQuery};
pub use warning::{Warning, WarningKind, WarningSummary};

/// Crate version, as reported by the CLI.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
