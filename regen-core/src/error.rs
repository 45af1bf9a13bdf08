//! Error types for regen-core.

use thiserror::Error;

use crate::types::NodeKind;

/// Result type alias for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Errors that abort a merge.
#[derive(Error, Debug)]
pub enum MergeError {
    /// A node-kind combination the merge has no rule for. Aborts the whole
    /// merge.
    #[error("unsupported shape in '{declaration}' ({kind}): {detail}")]
    UnsupportedShape {
        /// Name of the declaration being merged when the gap was hit.
        declaration: String,
        /// Kind of the offending node.
        kind: NodeKind,
        /// What combination was encountered.
        detail: String,
    },

    /// A declaration tree could not be decoded.
    #[error("invalid declaration tree: {0}")]
    InvalidTree(#[from] serde_json::Error),
}

impl MergeError {
    /// Creates an unsupported shape error.
    pub fn unsupported_shape(
        declaration: impl Into<String>,
        kind: NodeKind,
        detail: impl Into<String>,
    ) -> Self {
        Self::UnsupportedShape {
            declaration: declaration.into(),
            kind,
            detail: detail.into(),
        }
    }

    /// Whether this error reports a gap in the declaration taxonomy.
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, MergeError::UnsupportedShape { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MergeError::unsupported_shape(
            "Person",
            NodeKind::TypeDef,
            "cannot merge record into union",
        );
        let message = err.to_string();
        assert!(message.contains("'Person'"));
        assert!(message.contains("type definition"));
        assert!(message.contains("record into union"));
        assert!(err.is_unsupported_shape());
    }

    #[test]
    fn test_invalid_tree_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: MergeError = json_err.into();
        assert!(!err.is_unsupported_shape());
        assert!(err.to_string().starts_with("invalid declaration tree"));
    }
}
