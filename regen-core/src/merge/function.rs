//! Function and method signature merge.
//!
//! The generated side owns the signature (name, resource path, parameters,
//! return type); the developer owns the body. Qualifiers are kept from the
//! previous declaration except for the resolver-category keyword, which the
//! schema decides.

use crate::error::Result;
use crate::merge::matcher::{match_members, MemberKey, MemberPolicy, Removal};
use crate::merge::types::{compare_return_types, optional_types_equal};
use crate::merge::variable::{self, compare_variables};
use crate::merge::MergeContext;
use crate::types::{qualifiers_to_string, FunctionDecl, Metadata, NodeKind, Parameter, Qualifier};
use crate::warning::Warning;

/// Container name used for functions declared at module level.
pub const MODULE_CONTAINER: &str = "module";

/// Whether two matched functions need no merge.
///
/// Differences in non-resolver qualifiers are incidental and do not count.
pub fn functions_equal(prev: &FunctionDecl, next: &FunctionDecl) -> bool {
    prev.resolver_category() == next.resolver_category()
        && prev.name == next.name
        && prev.path == next.path
        && prev.parameters.len() == next.parameters.len()
        && prev
            .parameters
            .iter()
            .zip(&next.parameters)
            .all(|(p, n)| variable::equal(p, n))
        && optional_types_equal(prev.return_type.as_ref(), next.return_type.as_ref())
        && Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()) == prev.metadata
        && (prev.body.is_some() || next.body.is_none())
}

/// Merge a matched function pair declared inside `owner`.
///
/// Warnings are emitted in order: resolver category, return type, then
/// parameters.
pub fn merge_function(
    ctx: &mut MergeContext<'_>,
    owner: &str,
    prev: &FunctionDecl,
    next: &FunctionDecl,
) -> Result<FunctionDecl> {
    let identity = next.identity();

    match (prev.resolver_category(), next.resolver_category()) {
        (Some(old), Some(new)) if old != new => {
            ctx.warn(Warning::resolver_category_interchanged(
                owner,
                identity,
                old.qualifier().as_str(),
                new.qualifier().as_str(),
            ));
        }
        (Some(_), None) | (None, Some(_)) => {
            ctx.warn(Warning::qualifier_list_changed(
                owner,
                identity,
                qualifiers_to_string(&prev.qualifiers),
                qualifiers_to_string(&next.qualifiers),
            ));
        }
        _ => {
            if prev.qualifiers != next.qualifiers {
                tracing::debug!(
                    owner,
                    function = identity,
                    prev = %qualifiers_to_string(&prev.qualifiers),
                    next = %qualifiers_to_string(&next.qualifiers),
                    "ignoring qualifier difference"
                );
            }
        }
    }

    let returns = compare_return_types(prev.return_type.as_ref(), next.return_type.as_ref());
    if !returns.equal {
        ctx.warn(Warning::return_type_changed(
            owner,
            identity,
            returns.prev,
            returns.next,
        ));
    }

    let container = format!("{}.{}", owner, identity);
    let policy = ParameterPolicy {
        container: &container,
    };
    // Parameters come verbatim from next; the match only reports changes.
    match_members(&policy, ctx, &prev.parameters, &next.parameters)?;

    Ok(FunctionDecl {
        qualifiers: merge_qualifiers(&prev.qualifiers, next),
        name: next.name.clone(),
        path: next.path.clone(),
        parameters: next.parameters.clone(),
        return_type: next.return_type.clone(),
        body: prev.body.clone().or_else(|| next.body.clone()),
        metadata: Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()),
    })
}

/// Previous qualifiers with the resolver-category keyword taken from next.
///
/// The keyword is replaced in place, appended when prev had none, and
/// removed when next has none.
pub fn merge_qualifiers(prev: &[Qualifier], next: &FunctionDecl) -> Vec<Qualifier> {
    let category = next.resolver_category().map(|c| c.qualifier());
    let mut merged = Vec::with_capacity(prev.len() + 1);
    let mut placed = false;

    for qualifier in prev {
        if qualifier.resolver_category().is_some() {
            if let (Some(category), false) = (&category, placed) {
                merged.push(category.clone());
                placed = true;
            }
        } else {
            merged.push(qualifier.clone());
        }
    }

    if let (Some(category), false) = (category, placed) {
        merged.push(category);
    }
    merged
}

struct ParameterPolicy<'c> {
    container: &'c str,
}

impl MemberPolicy for ParameterPolicy<'_> {
    type Node = Parameter;

    fn identity(&self, node: &Parameter) -> MemberKey {
        MemberKey::new(NodeKind::Parameter, node.name.as_str())
    }

    fn equal(&self, prev: &Parameter, next: &Parameter) -> bool {
        variable::equal(prev, next)
    }

    fn merge(
        &self,
        ctx: &mut MergeContext<'_>,
        prev: &Parameter,
        next: &Parameter,
    ) -> Result<Parameter> {
        if let Some(cmp) = compare_variables(prev, next) {
            if cmp.type_changed() {
                ctx.warn(Warning::parameter_type_changed(
                    self.container,
                    cmp.name.as_str(),
                    cmp.types.prev.as_str(),
                    cmp.types.next.as_str(),
                ));
            }
            if let (true, Some(old_default)) = (cmp.default_removed, cmp.prev_default.as_deref()) {
                ctx.warn(Warning::parameter_default_removed(
                    self.container,
                    cmp.name.as_str(),
                    old_default,
                ));
            }
        }
        Ok(next.clone())
    }

    fn removed(&self, ctx: &mut MergeContext<'_>, prev: &Parameter) -> Removal {
        ctx.warn(Warning::parameter_removed(self.container, prev.name.as_str()));
        Removal::Drop
    }

    fn added(&self, ctx: &mut MergeContext<'_>, next: &Parameter) {
        if next.default_value.is_none() {
            ctx.warn(Warning::parameter_added_no_default(
                self.container,
                next.name.as_str(),
                next.type_expr.to_string(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaIndex;
    use crate::types::TypeExpr;
    use crate::warning::WarningKind;

    fn named(name: &str) -> TypeExpr {
        TypeExpr::named(name)
    }

    fn merge(prev: &FunctionDecl, next: &FunctionDecl) -> (FunctionDecl, Vec<Warning>) {
        let schema = SchemaIndex::default();
        let mut ctx = MergeContext::new(&schema);
        let merged = merge_function(&mut ctx, "Query", prev, next).unwrap();
        (merged, ctx.into_warnings())
    }

    #[test]
    fn test_return_type_change_keeps_body() {
        let prev = FunctionDecl::resource("get", "name")
            .returning(named("string"))
            .with_body("{ return \"x\"; }");
        let next = FunctionDecl::resource("get", "name").returning(named("string").optional());

        assert!(!functions_equal(&prev, &next));
        let (merged, warnings) = merge(&prev, &next);

        assert_eq!(merged.body.as_deref(), Some("{ return \"x\"; }"));
        assert_eq!(merged.return_type, Some(named("string").optional()));
        assert_eq!(
            warnings,
            vec![Warning::return_type_changed("Query", "name", "string", "string?")]
        );
    }

    #[test]
    fn test_body_only_difference_is_equal() {
        let prev = FunctionDecl::remote("addBook").with_body("{ db.insert(); }");
        let next = FunctionDecl::remote("addBook");
        assert!(functions_equal(&prev, &next));

        // a generated body fills in a missing one
        assert!(!functions_equal(&next, &prev));
        let (merged, warnings) = merge(&next, &prev);
        assert_eq!(merged.body.as_deref(), Some("{ db.insert(); }"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parameter_changes() {
        let prev = FunctionDecl::resource("get", "books")
            .with_parameter(Parameter::new("id", named("int")))
            .with_parameter(Parameter::new("limit", named("int")).with_default("10"))
            .with_parameter(Parameter::new("author", named("string")));
        let next = FunctionDecl::resource("get", "books")
            .with_parameter(Parameter::new("id", named("string")))
            .with_parameter(Parameter::new("limit", named("int")))
            .with_parameter(Parameter::new("isbn", named("string")))
            .with_parameter(Parameter::new("offset", named("int")).with_default("0"));

        let (merged, warnings) = merge(&prev, &next);
        let kinds: Vec<_> = warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::ParameterTypeChanged,
                WarningKind::ParameterDefaultRemoved,
                WarningKind::ParameterRemoved,
                WarningKind::ParameterAddedNoDefault,
            ]
        );
        assert_eq!(warnings[0].container, "Query.books");
        assert_eq!(warnings[1].value(0), Some("10"));
        assert_eq!(warnings[2].member, "author");
        assert_eq!(warnings[3].value(0), Some("string"));
        assert_eq!(merged.parameters, next.parameters);
    }

    #[test]
    fn test_single_warning_per_removed_parameter() {
        let prev = FunctionDecl::remote("rate")
            .with_parameter(Parameter::new("id", named("int")))
            .with_parameter(Parameter::new("stars", named("int")))
            .with_parameter(Parameter::new("comment", named("string")));
        let next = FunctionDecl::remote("rate").with_parameter(Parameter::new("id", named("int")));

        let (_, warnings) = merge(&prev, &next);
        let removed: Vec<_> = warnings
            .iter()
            .filter(|w| w.kind == WarningKind::ParameterRemoved)
            .map(|w| w.member.as_str())
            .collect();
        assert_eq!(removed, vec!["stars", "comment"]);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_resolver_category_interchanged() {
        let prev = FunctionDecl::resource("get", "book").with_qualifier(Qualifier::Isolated);
        let mut next = FunctionDecl::remote("book");
        next.qualifiers.insert(0, Qualifier::Isolated);

        let (merged, warnings) = merge(&prev, &next);
        assert_eq!(
            warnings,
            vec![Warning::resolver_category_interchanged(
                "Query", "book", "resource", "remote"
            )]
        );
        assert_eq!(merged.qualifiers, vec![Qualifier::Remote, Qualifier::Isolated]);
    }

    #[test]
    fn test_qualifier_list_changed_on_lost_category() {
        let prev = FunctionDecl::remote("sync").with_qualifier(Qualifier::Isolated);
        let next = FunctionDecl::new("sync").with_qualifier(Qualifier::Isolated);

        let (merged, warnings) = merge(&prev, &next);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::QualifierListChanged);
        assert_eq!(warnings[0].value(0), Some("remote isolated"));
        assert_eq!(warnings[0].value(1), Some("isolated"));
        assert_eq!(merged.qualifiers, vec![Qualifier::Isolated]);
    }

    #[test]
    fn test_incidental_qualifiers_are_equal() {
        let prev = FunctionDecl::resource("get", "name").with_qualifier(Qualifier::Isolated);
        let next = FunctionDecl::resource("get", "name");
        assert!(functions_equal(&prev, &next));
    }

    #[test]
    fn test_documentation_precedence() {
        let mut prev = FunctionDecl::remote("addBook").with_body("{}");
        prev.metadata = Some(Metadata::documented("Old doc"));
        let mut next = FunctionDecl::remote("addBook");
        next.metadata = Some(Metadata::documented("New doc"));

        assert!(!functions_equal(&prev, &next));
        let (merged, warnings) = merge(&prev, &next);
        assert!(warnings.is_empty());
        assert_eq!(
            merged.metadata.and_then(|m| m.documentation).as_deref(),
            Some("New doc")
        );
        assert_eq!(merged.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_merge_qualifiers_appends_category() {
        let next = FunctionDecl::resource("get", "name");
        assert_eq!(
            merge_qualifiers(&[Qualifier::Isolated], &next),
            vec![Qualifier::Isolated, Qualifier::Resource]
        );
    }
}
