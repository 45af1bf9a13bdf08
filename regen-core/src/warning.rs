//! Breaking-change warning catalog.
//!
//! Warnings are pure data: a kind from a closed vocabulary, the container the
//! change happened in, the member it concerns, and up to two positional
//! values (old/new type, old default). Rendering them to text is left to the
//! presentation layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of backward-compatibility warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MemberRemoved,
    FieldTypeChanged,
    FieldDefaultRemoved,
    FieldAddedNoDefault,
    UnionMemberRemoved,
    EnumMemberRemoved,
    ParameterRemoved,
    ParameterTypeChanged,
    ParameterAddedNoDefault,
    ParameterDefaultRemoved,
    ReturnTypeChanged,
    ResolverCategoryInterchanged,
    QualifierListChanged,
    ResolverRemoved,
}

impl WarningKind {
    pub const ALL: [WarningKind; 14] = [
        WarningKind::MemberRemoved,
        WarningKind::FieldTypeChanged,
        WarningKind::FieldDefaultRemoved,
        WarningKind::FieldAddedNoDefault,
        WarningKind::UnionMemberRemoved,
        WarningKind::EnumMemberRemoved,
        WarningKind::ParameterRemoved,
        WarningKind::ParameterTypeChanged,
        WarningKind::ParameterAddedNoDefault,
        WarningKind::ParameterDefaultRemoved,
        WarningKind::ReturnTypeChanged,
        WarningKind::ResolverCategoryInterchanged,
        WarningKind::QualifierListChanged,
        WarningKind::ResolverRemoved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::MemberRemoved => "member_removed",
            WarningKind::FieldTypeChanged => "field_type_changed",
            WarningKind::FieldDefaultRemoved => "field_default_removed",
            WarningKind::FieldAddedNoDefault => "field_added_no_default",
            WarningKind::UnionMemberRemoved => "union_member_removed",
            WarningKind::EnumMemberRemoved => "enum_member_removed",
            WarningKind::ParameterRemoved => "parameter_removed",
            WarningKind::ParameterTypeChanged => "parameter_type_changed",
            WarningKind::ParameterAddedNoDefault => "parameter_added_no_default",
            WarningKind::ParameterDefaultRemoved => "parameter_default_removed",
            WarningKind::ReturnTypeChanged => "return_type_changed",
            WarningKind::ResolverCategoryInterchanged => "resolver_category_interchanged",
            WarningKind::QualifierListChanged => "qualifier_list_changed",
            WarningKind::ResolverRemoved => "resolver_removed",
        }
    }

    /// Number of positional values a warning of this kind carries.
    pub fn arity(&self) -> usize {
        match self {
            WarningKind::MemberRemoved
            | WarningKind::UnionMemberRemoved
            | WarningKind::EnumMemberRemoved
            | WarningKind::ParameterRemoved
            | WarningKind::ResolverRemoved => 0,
            WarningKind::FieldDefaultRemoved
            | WarningKind::FieldAddedNoDefault
            | WarningKind::ParameterAddedNoDefault
            | WarningKind::ParameterDefaultRemoved => 1,
            WarningKind::FieldTypeChanged
            | WarningKind::ParameterTypeChanged
            | WarningKind::ReturnTypeChanged
            | WarningKind::ResolverCategoryInterchanged
            | WarningKind::QualifierListChanged => 2,
        }
    }
}

/// A single breaking-change warning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,

    /// Declaration the change happened in (type, service, or `Owner.function`)
    pub container: String,

    /// Member the change concerns (field, parameter, function, enum member)
    pub member: String,

    /// Positional extras, e.g. old and new type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Warning {
    fn new(
        kind: WarningKind,
        container: impl Into<String>,
        member: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        debug_assert_eq!(values.len(), kind.arity());
        Self {
            kind,
            container: container.into(),
            member: member.into(),
            values,
        }
    }

    pub fn member_removed(container: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(WarningKind::MemberRemoved, container, member, vec![])
    }

    pub fn field_type_changed(
        container: impl Into<String>,
        field: impl Into<String>,
        old_type: impl Into<String>,
        new_type: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::FieldTypeChanged,
            container,
            field,
            vec![old_type.into(), new_type.into()],
        )
    }

    pub fn field_default_removed(
        container: impl Into<String>,
        field: impl Into<String>,
        old_default: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::FieldDefaultRemoved,
            container,
            field,
            vec![old_default.into()],
        )
    }

    pub fn field_added_no_default(
        container: impl Into<String>,
        field: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::FieldAddedNoDefault,
            container,
            field,
            vec![field_type.into()],
        )
    }

    pub fn union_member_removed(container: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(WarningKind::UnionMemberRemoved, container, member, vec![])
    }

    pub fn enum_member_removed(container: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(WarningKind::EnumMemberRemoved, container, member, vec![])
    }

    pub fn parameter_removed(container: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::new(WarningKind::ParameterRemoved, container, parameter, vec![])
    }

    pub fn parameter_type_changed(
        container: impl Into<String>,
        parameter: impl Into<String>,
        old_type: impl Into<String>,
        new_type: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::ParameterTypeChanged,
            container,
            parameter,
            vec![old_type.into(), new_type.into()],
        )
    }

    pub fn parameter_added_no_default(
        container: impl Into<String>,
        parameter: impl Into<String>,
        parameter_type: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::ParameterAddedNoDefault,
            container,
            parameter,
            vec![parameter_type.into()],
        )
    }

    pub fn parameter_default_removed(
        container: impl Into<String>,
        parameter: impl Into<String>,
        old_default: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::ParameterDefaultRemoved,
            container,
            parameter,
            vec![old_default.into()],
        )
    }

    pub fn return_type_changed(
        container: impl Into<String>,
        function: impl Into<String>,
        old_type: impl Into<String>,
        new_type: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::ReturnTypeChanged,
            container,
            function,
            vec![old_type.into(), new_type.into()],
        )
    }

    pub fn resolver_category_interchanged(
        container: impl Into<String>,
        function: impl Into<String>,
        old_qualifier: impl Into<String>,
        new_qualifier: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::ResolverCategoryInterchanged,
            container,
            function,
            vec![old_qualifier.into(), new_qualifier.into()],
        )
    }

    pub fn qualifier_list_changed(
        container: impl Into<String>,
        function: impl Into<String>,
        old_qualifiers: impl Into<String>,
        new_qualifiers: impl Into<String>,
    ) -> Self {
        Self::new(
            WarningKind::QualifierListChanged,
            container,
            function,
            vec![old_qualifiers.into(), new_qualifiers.into()],
        )
    }

    pub fn resolver_removed(container: impl Into<String>, function: impl Into<String>) -> Self {
        Self::new(WarningKind::ResolverRemoved, container, function, vec![])
    }

    /// Positional value at `index`, if the kind carries one.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

/// Per-kind warning counts for a merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningSummary {
    pub counts: BTreeMap<WarningKind, usize>,
    pub total: usize,
}

impl WarningSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_warnings(warnings: &[Warning]) -> Self {
        let mut summary = Self::new();
        for warning in warnings {
            summary.record(warning.kind);
        }
        summary
    }

    /// Increment the counter for `kind`.
    pub fn record(&mut self, kind: WarningKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        if self.counts.is_empty() {
            return "No warnings".to_string();
        }

        self.counts
            .iter()
            .map(|(kind, count)| format!("{}: {}", kind.as_str().replace('_', " "), count))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_kind_as_str() {
        assert_eq!(WarningKind::MemberRemoved.as_str(), "member_removed");
        assert_eq!(
            WarningKind::ResolverCategoryInterchanged.as_str(),
            "resolver_category_interchanged"
        );
    }

    #[test]
    fn test_constructors_respect_arity() {
        let warnings = vec![
            Warning::member_removed("Person", "age"),
            Warning::field_type_changed("Person", "age", "int", "string"),
            Warning::field_default_removed("Person", "age", "0"),
            Warning::field_added_no_default("NewUser", "email", "string"),
            Warning::union_member_removed("SearchResult", "Book"),
            Warning::enum_member_removed("Genre", "POETRY"),
            Warning::parameter_removed("Query.book", "id"),
            Warning::parameter_type_changed("Query.book", "id", "int", "string"),
            Warning::parameter_added_no_default("Query.book", "isbn", "string"),
            Warning::parameter_default_removed("Query.books", "limit", "10"),
            Warning::return_type_changed("Query", "book", "Book", "Book?"),
            Warning::resolver_category_interchanged("Query", "book", "resource", "remote"),
            Warning::qualifier_list_changed("Query", "book", "isolated", "isolated resource"),
            Warning::resolver_removed("Query", "book"),
        ];

        assert_eq!(warnings.len(), WarningKind::ALL.len());
        for (warning, kind) in warnings.iter().zip(WarningKind::ALL) {
            assert_eq!(warning.kind, kind);
            assert_eq!(warning.values.len(), kind.arity());
        }
    }

    #[test]
    fn test_warning_value_access() {
        let warning = Warning::return_type_changed("Query", "name", "string", "string?");
        assert_eq!(warning.value(0), Some("string"));
        assert_eq!(warning.value(1), Some("string?"));
        assert_eq!(warning.value(2), None);
    }

    #[test]
    fn test_warning_json_omits_empty_values() {
        let json = serde_json::to_string(&Warning::resolver_removed("Query", "name")).unwrap();
        assert!(json.contains("\"kind\":\"resolver_removed\""));
        assert!(!json.contains("values"));
    }

    #[test]
    fn test_summary_record() {
        let mut summary = WarningSummary::new();
        summary.record(WarningKind::ParameterRemoved);
        summary.record(WarningKind::ParameterRemoved);
        summary.record(WarningKind::ReturnTypeChanged);

        assert_eq!(summary.count(WarningKind::ParameterRemoved), 2);
        assert_eq!(summary.count(WarningKind::EnumMemberRemoved), 0);
        assert_eq!(summary.total, 3);
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_summary_text() {
        let summary = WarningSummary::from_warnings(&[
            Warning::enum_member_removed("Genre", "POETRY"),
            Warning::resolver_removed("Query", "book"),
        ]);
        let text = summary.text();
        assert!(text.contains("enum member removed: 1"));
        assert!(text.contains("resolver removed: 1"));
    }

    #[test]
    fn test_summary_text_no_warnings() {
        assert_eq!(WarningSummary::default().text(), "No warnings");
    }
}
