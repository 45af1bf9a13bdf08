//! Object shapes, services and classes.
//!
//! All three hold a member list of type references and functions; classes
//! may also declare plain fields. They differ in what happens to a member
//! that disappears from the generated side:
//!
//! | Scope        | removed resolver | removed helper | removed type ref |
//! |--------------|------------------|----------------|------------------|
//! | object shape | MemberRemoved    | MemberRemoved  | MemberRemoved    |
//! | service      | ResolverRemoved  | retained       | MemberRemoved    |
//! | class        | ResolverRemoved  | retained       | MemberRemoved    |
//!
//! Class fields are never generated from the schema, so they pass through
//! untouched.

use crate::error::{MergeError, Result};
use crate::merge::function::{functions_equal, merge_function};
use crate::merge::matcher::{match_members, MemberKey, MemberPolicy, Removal};
use crate::merge::MergeContext;
use crate::types::{ClassDecl, Member, Metadata, NodeKind, ObjectShape, ServiceDecl};
use crate::warning::Warning;

/// Container name used for warnings inside an anonymous service.
pub const ANONYMOUS_SERVICE: &str = "service";

/// Where a member list lives; decides removal policy and allowed members.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberScope {
    ObjectShape,
    Service,
    Class,
}

impl MemberScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberScope::ObjectShape => "object",
            MemberScope::Service => "service",
            MemberScope::Class => "class",
        }
    }

    fn allows_fields(&self) -> bool {
        matches!(self, MemberScope::Class)
    }
}

/// Identity key of a member.
pub fn member_key(member: &Member) -> MemberKey {
    MemberKey::new(member.kind(), member.identity())
}

/// Whether a matched member pair needs no merge.
pub fn members_equal(prev: &Member, next: &Member) -> bool {
    match (prev, next) {
        (Member::TypeRef(p), Member::TypeRef(n)) => p.name == n.name,
        (Member::Function(p), Member::Function(n)) => functions_equal(p, n),
        (Member::Field(p), Member::Field(n)) => p.name == n.name,
        _ => false,
    }
}

/// Pairwise member equality over two whole lists.
pub fn member_lists_equal(prev: &[Member], next: &[Member]) -> bool {
    prev.len() == next.len()
        && prev
            .iter()
            .zip(next)
            .all(|(p, n)| member_key(p) == member_key(n) && members_equal(p, n))
}

/// Merge two member lists declared inside `owner`.
pub fn merge_members(
    ctx: &mut MergeContext<'_>,
    scope: MemberScope,
    owner: &str,
    prev: &[Member],
    next: &[Member],
) -> Result<Vec<Member>> {
    check_members(scope, owner, prev)?;
    check_members(scope, owner, next)?;

    let policy = MemberListPolicy { scope, owner };
    let outcome = match_members(&policy, ctx, prev, next)?;
    tracing::trace!(
        owner,
        scope = scope.as_str(),
        changed = outcome.changed.len(),
        removed = outcome.removed.len(),
        added = outcome.added.len(),
        "merged members"
    );
    Ok(outcome.merged)
}

/// Reject members `scope` cannot hold: fields outside a class.
pub fn check_members(scope: MemberScope, owner: &str, members: &[Member]) -> Result<()> {
    if scope.allows_fields() {
        return Ok(());
    }
    match members.iter().find(|m| matches!(m, Member::Field(_))) {
        Some(field) => Err(MergeError::unsupported_shape(
            owner,
            NodeKind::Field,
            format!(
                "field '{}' is not allowed in a {}",
                field.identity(),
                scope.as_str()
            ),
        )),
        None => Ok(()),
    }
}

/// Merge an object shape belonging to type definition `owner`.
///
/// Qualifiers follow the generated side.
pub fn merge_object_shape(
    ctx: &mut MergeContext<'_>,
    owner: &str,
    prev: &ObjectShape,
    next: &ObjectShape,
) -> Result<ObjectShape> {
    Ok(ObjectShape {
        qualifiers: next.qualifiers.clone(),
        members: merge_members(ctx, MemberScope::ObjectShape, owner, &prev.members, &next.members)?,
    })
}

pub fn object_shapes_equal(prev: &ObjectShape, next: &ObjectShape) -> bool {
    prev.qualifiers == next.qualifiers && member_lists_equal(&prev.members, &next.members)
}

/// Merge a service. The attach point is developer-configured and kept.
pub fn merge_service(
    ctx: &mut MergeContext<'_>,
    prev: &ServiceDecl,
    next: &ServiceDecl,
) -> Result<ServiceDecl> {
    let owner = prev.name.as_deref().unwrap_or(ANONYMOUS_SERVICE);

    Ok(ServiceDecl {
        name: prev.name.clone(),
        qualifiers: prev.qualifiers.clone(),
        distinct: next.distinct,
        attach_point: prev.attach_point.clone().or_else(|| next.attach_point.clone()),
        members: merge_members(ctx, MemberScope::Service, owner, &prev.members, &next.members)?,
        metadata: Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()),
    })
}

pub fn services_equal(prev: &ServiceDecl, next: &ServiceDecl) -> bool {
    prev.distinct == next.distinct
        && (prev.attach_point.is_some() || next.attach_point.is_none())
        && Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()) == prev.metadata
        && member_lists_equal(&prev.members, &next.members)
}

pub fn merge_class(
    ctx: &mut MergeContext<'_>,
    prev: &ClassDecl,
    next: &ClassDecl,
) -> Result<ClassDecl> {
    Ok(ClassDecl {
        name: prev.name.clone(),
        qualifiers: prev.qualifiers.clone(),
        distinct: next.distinct,
        members: merge_members(ctx, MemberScope::Class, &prev.name, &prev.members, &next.members)?,
        metadata: Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()),
    })
}

pub fn classes_equal(prev: &ClassDecl, next: &ClassDecl) -> bool {
    prev.distinct == next.distinct
        && Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()) == prev.metadata
        && member_lists_equal(&prev.members, &next.members)
}

struct MemberListPolicy<'o> {
    scope: MemberScope,
    owner: &'o str,
}

impl MemberPolicy for MemberListPolicy<'_> {
    type Node = Member;

    fn identity(&self, node: &Member) -> MemberKey {
        member_key(node)
    }

    fn equal(&self, prev: &Member, next: &Member) -> bool {
        members_equal(prev, next)
    }

    fn merge(&self, ctx: &mut MergeContext<'_>, prev: &Member, next: &Member) -> Result<Member> {
        match (prev, next) {
            (Member::Function(p), Member::Function(n)) => {
                Ok(Member::Function(merge_function(ctx, self.owner, p, n)?))
            }
            // Keys include the kind, so the remaining pairs are same-kind
            // members that compare equal by name.
            _ => Ok(prev.clone()),
        }
    }

    fn removed(&self, ctx: &mut MergeContext<'_>, prev: &Member) -> Removal {
        match (self.scope, prev) {
            (MemberScope::ObjectShape, _) | (_, Member::TypeRef(_)) => {
                ctx.warn(Warning::member_removed(self.owner, prev.identity()));
                Removal::Drop
            }
            (_, Member::Function(function)) if function.is_resolver() => {
                ctx.warn(Warning::resolver_removed(self.owner, function.identity()));
                Removal::Drop
            }
            _ => Removal::Retain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaIndex;
    use crate::types::{Field, FunctionDecl, TypeExpr, TypeRef};
    use crate::warning::WarningKind;

    fn resolver(name: &str, returns: &str) -> Member {
        Member::Function(
            FunctionDecl::resource("get", name)
                .returning(TypeExpr::named(returns))
                .with_body("{ return todo(); }"),
        )
    }

    fn helper(name: &str) -> Member {
        Member::Function(FunctionDecl::new(name).with_body("{ }"))
    }

    fn service(name: &str, members: Vec<Member>) -> ServiceDecl {
        ServiceDecl {
            name: Some(name.to_string()),
            attach_point: Some("on new graphql:Listener(9090)".to_string()),
            members,
            ..ServiceDecl::default()
        }
    }

    #[test]
    fn test_service_removed_resolver_and_retained_helper() {
        let schema = SchemaIndex::default();
        let mut ctx = MergeContext::new(&schema);
        let prev = service(
            "/graphql",
            vec![resolver("book", "Book"), helper("format"), resolver("author", "Author")],
        );
        let mut next = service("/graphql", vec![resolver("book", "Book")]);
        next.attach_point = None;

        let merged = merge_service(&mut ctx, &prev, &next).unwrap();
        let identities: Vec<_> = merged.members.iter().map(Member::identity).collect();
        assert_eq!(identities, vec!["book", "format"]);
        assert_eq!(merged.attach_point, prev.attach_point);

        let warnings = ctx.into_warnings();
        assert_eq!(warnings, vec![Warning::resolver_removed("/graphql", "author")]);
    }

    #[test]
    fn test_object_shape_removed_method_is_member_removed() {
        let schema = SchemaIndex::default();
        let mut ctx = MergeContext::new(&schema);
        let prev = ObjectShape {
            qualifiers: vec![],
            members: vec![Member::TypeRef(TypeRef::new("Node")), resolver("title", "string")],
        };
        let next = ObjectShape::default();

        let merged = merge_object_shape(&mut ctx, "Book", &prev, &next).unwrap();
        assert!(merged.members.is_empty());

        let kinds: Vec<_> = ctx.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::MemberRemoved, WarningKind::MemberRemoved]);
        assert_eq!(ctx.warnings()[0].member, "Node");
    }

    #[test]
    fn test_class_fields_pass_through() {
        let schema = SchemaIndex::default();
        let mut ctx = MergeContext::new(&schema);
        let cache = Member::Field(Field::new("cache", TypeExpr::named("map<Book>")));
        let prev = ClassDecl::new("Book", vec![cache.clone(), resolver("title", "string")]);
        let next = ClassDecl::new(
            "Book",
            vec![
                resolver("title", "string"),
                Member::Field(Field::new("extra", TypeExpr::named("int"))),
            ],
        );

        let merged = merge_class(&mut ctx, &prev, &next).unwrap();
        let identities: Vec<_> = merged.members.iter().map(Member::identity).collect();
        assert_eq!(identities, vec!["cache", "title", "extra"]);
        assert_eq!(merged.members[0], cache);
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_field_in_service_is_unsupported() {
        let schema = SchemaIndex::default();
        let mut ctx = MergeContext::new(&schema);
        let prev = service(
            "/graphql",
            vec![Member::Field(Field::new("counter", TypeExpr::named("int")))],
        );
        let next = service("/graphql", vec![]);

        let err = merge_service(&mut ctx, &prev, &next).unwrap_err();
        assert!(err.is_unsupported_shape());
        assert!(err.to_string().contains("counter"));
    }

    #[test]
    fn test_anonymous_service_container() {
        let schema = SchemaIndex::default();
        let mut ctx = MergeContext::new(&schema);
        let prev = ServiceDecl {
            members: vec![resolver("book", "Book")],
            ..ServiceDecl::default()
        };
        let next = ServiceDecl::default();

        merge_service(&mut ctx, &prev, &next).unwrap();
        assert_eq!(ctx.warnings()[0].container, ANONYMOUS_SERVICE);
    }

    #[test]
    fn test_member_lists_equal_ignores_bodies() {
        let prev = vec![resolver("book", "Book")];
        let next = vec![Member::Function(
            FunctionDecl::resource("get", "book").returning(TypeExpr::named("Book")),
        )];
        assert!(member_lists_equal(&prev, &next));
        assert!(!member_lists_equal(&prev, &[]));
    }
}
