//! Structural merge engine for regenerated declaration trees.
//!
//! This module reconciles a previously generated (and possibly hand-edited)
//! declaration tree with a freshly generated one, producing a merged tree and
//! an ordered list of breaking-change warnings.
//!
//! # Layers
//!
//! - **types**: structural equality of type expressions
//! - **variable**: parameter/field comparison
//! - **matcher**: generic first-match-wins pairing of sibling lists
//! - **function**, **object**, **record**, **enums**, **union**: per-kind policy
//! - **module**: the orchestrator walking top-level declarations
//!
//! # Example
//!
//! ```
//! use regen_core::merge::merge_modules;
//! use regen_core::schema::SchemaIndex;
//! use regen_core::types::{Declaration, EnumDecl, Module};
//!
//! let prev = Module::new(vec![Declaration::Enum(EnumDecl::new("Genre", &["FICTION", "POETRY"]))]);
//! let next = Module::new(vec![Declaration::Enum(EnumDecl::new("Genre", &["FICTION"]))]);
//!
//! let outcome = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap();
//! assert_eq!(outcome.warnings.len(), 1);
//! ```

use serde::Serialize;

use crate::schema::SchemaQuery;
use crate::types::Module;
use crate::warning::{Warning, WarningSummary};

pub mod enums;
pub mod function;
pub mod matcher;
pub mod module;
pub mod object;
pub mod record;
pub mod types;
pub mod union;
pub mod variable;

pub use matcher::{match_members, MatchOutcome, MemberKey, MemberPolicy, Removal};
pub use module::{merge_module_pairs, merge_modules, ModulePair};

/// State owned by a single merge invocation.
///
/// Holds the warning accumulator and the schema handle; it is passed
/// explicitly through every comparator so independent merges never share
/// mutable state.
pub struct MergeContext<'a> {
    schema: &'a dyn SchemaQuery,
    warnings: Vec<Warning>,
}

impl<'a> MergeContext<'a> {
    pub fn new(schema: &'a dyn SchemaQuery) -> Self {
        Self {
            schema,
            warnings: Vec::new(),
        }
    }

    pub fn schema(&self) -> &dyn SchemaQuery {
        self.schema
    }

    /// Record a warning, preserving traversal order.
    pub fn warn(&mut self, warning: Warning) {
        tracing::debug!(
            kind = warning.kind.as_str(),
            container = %warning.container,
            member = %warning.member,
            "breaking change"
        );
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// Result of merging one pair of modules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// The merged declaration tree
    pub module: Module,

    /// Warnings in traversal order
    pub warnings: Vec<Warning>,
}

impl MergeOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn summary(&self) -> WarningSummary {
        WarningSummary::from_warnings(&self.warnings)
    }
}
