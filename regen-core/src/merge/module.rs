//! Top-level orchestration: merging whole modules.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};
use crate::merge::enums::{enums_equal, merge_enum};
use crate::merge::function::{functions_equal, merge_function, MODULE_CONTAINER};
use crate::merge::matcher::{match_members, MemberKey, MemberPolicy, Removal};
use crate::merge::object::{
    check_members, classes_equal, merge_class, merge_object_shape, merge_service,
    object_shapes_equal, services_equal, MemberScope, ANONYMOUS_SERVICE,
};
use crate::merge::record::{merge_record, records_equal};
use crate::merge::union::{merge_union, unions_equal};
use crate::merge::{MergeContext, MergeOutcome};
use crate::schema::SchemaQuery;
use crate::types::{Declaration, Import, Metadata, Module, NodeKind, TypeDefinition, TypeShape};

/// Merge a previous module with its regenerated counterpart.
///
/// Declarations are paired by kind and name. Matched pairs go through their
/// kind's comparator; declarations only in `next` are appended; declarations
/// only in `prev` are dropped without a warning.
///
/// # Errors
///
/// Returns [`MergeError::UnsupportedShape`] when either tree holds a node the
/// merge has no rule for (a field inside a service or object type), or when a
/// matched pair has no merge rule, e.g. a record regenerated as a union.
pub fn merge_modules(prev: &Module, next: &Module, schema: &dyn SchemaQuery) -> Result<MergeOutcome> {
    let span = tracing::debug_span!(
        "merge_modules",
        prev = prev.declarations.len(),
        next = next.declarations.len()
    );
    let _enter = span.enter();

    check_module(prev)?;
    check_module(next)?;

    let mut ctx = MergeContext::new(schema);
    let imports = match_members(&ImportPolicy, &mut ctx, &prev.imports, &next.imports)?;
    let declarations =
        match_members(&DeclarationPolicy, &mut ctx, &prev.declarations, &next.declarations)?;

    tracing::debug!(
        changed = declarations.changed.len(),
        dropped = declarations.removed.len(),
        added = declarations.added.len(),
        warnings = ctx.warnings().len(),
        "merged module"
    );

    Ok(MergeOutcome {
        module: Module {
            imports: imports.merged,
            declarations: declarations.merged,
        },
        warnings: ctx.into_warnings(),
    })
}

/// A previous/next pair for one generated file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePair {
    pub path: String,
    pub prev: Module,
    pub next: Module,
}

/// Merge many file pairs in parallel.
///
/// Each pair gets its own [`MergeContext`], so results are identical to
/// merging sequentially. Results are returned in input order.
///
/// # Arguments
///
/// * `pairs` - File pairs to merge
/// * `schema` - Schema facts shared by every merge
/// * `num_threads` - Optional number of threads (defaults to number of CPUs)
pub fn merge_module_pairs(
    pairs: &[ModulePair],
    schema: &(dyn SchemaQuery + Sync),
    num_threads: Option<usize>,
) -> Vec<Result<MergeOutcome>> {
    let pool = match num_threads {
        Some(n) if n > 0 => rayon::ThreadPoolBuilder::new().num_threads(n).build().ok(),
        _ => None,
    };

    let merge_fn = |pair: &ModulePair| -> Result<MergeOutcome> {
        let outcome = merge_modules(&pair.prev, &pair.next, schema);
        if let Err(err) = &outcome {
            tracing::warn!(path = %pair.path, error = %err, "merge failed");
        }
        outcome
    };

    match pool {
        Some(pool) => pool.install(|| pairs.par_iter().map(merge_fn).collect()),
        None => pairs.par_iter().map(merge_fn).collect(),
    }
}

/// Reject nodes with no merge rule anywhere in a tree, changed or not.
pub fn check_module(module: &Module) -> Result<()> {
    for declaration in &module.declarations {
        match declaration {
            Declaration::Service(service) => check_members(
                MemberScope::Service,
                service.name.as_deref().unwrap_or(ANONYMOUS_SERVICE),
                &service.members,
            )?,
            Declaration::TypeDef(type_def) => match &type_def.shape {
                TypeShape::Object(shape) | TypeShape::DistinctObject(shape) => {
                    check_members(MemberScope::ObjectShape, &type_def.name, &shape.members)?
                }
                TypeShape::Record(_) | TypeShape::Union(_) => {}
            },
            Declaration::Class(_) | Declaration::Enum(_) | Declaration::Function(_) => {}
        }
    }
    Ok(())
}

/// Whether a matched declaration pair needs no merge.
pub fn declarations_equal(prev: &Declaration, next: &Declaration) -> bool {
    match prev {
        Declaration::Service(p) => {
            matches!(next, Declaration::Service(n) if services_equal(p, n))
        }
        Declaration::Class(p) => matches!(next, Declaration::Class(n) if classes_equal(p, n)),
        Declaration::TypeDef(p) => {
            matches!(next, Declaration::TypeDef(n) if type_definitions_equal(p, n))
        }
        Declaration::Enum(p) => matches!(next, Declaration::Enum(n) if enums_equal(p, n)),
        Declaration::Function(p) => {
            matches!(next, Declaration::Function(n) if functions_equal(p, n))
        }
    }
}

fn type_definitions_equal(prev: &TypeDefinition, next: &TypeDefinition) -> bool {
    let shapes_equal = match &prev.shape {
        TypeShape::Object(p) => {
            matches!(&next.shape, TypeShape::Object(n) if object_shapes_equal(p, n))
        }
        TypeShape::DistinctObject(p) => {
            matches!(&next.shape, TypeShape::DistinctObject(n) if object_shapes_equal(p, n))
        }
        TypeShape::Record(p) => matches!(&next.shape, TypeShape::Record(n) if records_equal(p, n)),
        TypeShape::Union(p) => matches!(&next.shape, TypeShape::Union(n) if unions_equal(p, n)),
    };
    shapes_equal
        && Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()) == prev.metadata
}

/// Merge a matched type definition pair, dispatching on shape.
pub fn merge_type_definition(
    ctx: &mut MergeContext<'_>,
    prev: &TypeDefinition,
    next: &TypeDefinition,
) -> Result<TypeDefinition> {
    let owner = prev.name.as_str();
    let mismatch = || {
        MergeError::unsupported_shape(
            owner,
            NodeKind::TypeDef,
            format!("cannot merge {} into {}", prev.shape.as_str(), next.shape.as_str()),
        )
    };

    let shape = match &prev.shape {
        TypeShape::Object(p) | TypeShape::DistinctObject(p) => match &next.shape {
            TypeShape::Object(n) => TypeShape::Object(merge_object_shape(ctx, owner, p, n)?),
            TypeShape::DistinctObject(n) => {
                TypeShape::DistinctObject(merge_object_shape(ctx, owner, p, n)?)
            }
            TypeShape::Record(_) | TypeShape::Union(_) => return Err(mismatch()),
        },
        TypeShape::Record(p) => match &next.shape {
            TypeShape::Record(n) => TypeShape::Record(merge_record(ctx, owner, p, n)?),
            _ => return Err(mismatch()),
        },
        TypeShape::Union(p) => match &next.shape {
            TypeShape::Union(n) => TypeShape::Union(merge_union(ctx, owner, p, n)?),
            _ => return Err(mismatch()),
        },
    };

    Ok(TypeDefinition {
        name: prev.name.clone(),
        qualifiers: prev.qualifiers.clone(),
        shape,
        metadata: Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()),
    })
}

struct DeclarationPolicy;

impl MemberPolicy for DeclarationPolicy {
    type Node = Declaration;

    fn identity(&self, node: &Declaration) -> MemberKey {
        MemberKey::new(node.kind(), node.name().unwrap_or_default())
    }

    fn equal(&self, prev: &Declaration, next: &Declaration) -> bool {
        declarations_equal(prev, next)
    }

    fn merge(
        &self,
        ctx: &mut MergeContext<'_>,
        prev: &Declaration,
        next: &Declaration,
    ) -> Result<Declaration> {
        tracing::debug!(
            kind = %prev.kind(),
            name = prev.name().unwrap_or_default(),
            "merging declaration"
        );
        // Keys include the kind, so a mismatched pair means a broken policy.
        let mismatch = || {
            MergeError::unsupported_shape(
                prev.name().unwrap_or_default(),
                prev.kind(),
                format!("cannot merge {} into {}", prev.kind(), next.kind()),
            )
        };

        match prev {
            Declaration::Service(p) => match next {
                Declaration::Service(n) => Ok(Declaration::Service(merge_service(ctx, p, n)?)),
                _ => Err(mismatch()),
            },
            Declaration::Class(p) => match next {
                Declaration::Class(n) => Ok(Declaration::Class(merge_class(ctx, p, n)?)),
                _ => Err(mismatch()),
            },
            Declaration::TypeDef(p) => match next {
                Declaration::TypeDef(n) => {
                    Ok(Declaration::TypeDef(merge_type_definition(ctx, p, n)?))
                }
                _ => Err(mismatch()),
            },
            Declaration::Enum(p) => match next {
                Declaration::Enum(n) => Ok(Declaration::Enum(merge_enum(ctx, p, n)?)),
                _ => Err(mismatch()),
            },
            Declaration::Function(p) => match next {
                Declaration::Function(n) => Ok(Declaration::Function(merge_function(
                    ctx,
                    MODULE_CONTAINER,
                    p,
                    n,
                )?)),
                _ => Err(mismatch()),
            },
        }
    }

    fn removed(&self, _ctx: &mut MergeContext<'_>, prev: &Declaration) -> Removal {
        tracing::debug!(
            kind = %prev.kind(),
            name = prev.name().unwrap_or_default(),
            "dropping declaration missing from next"
        );
        Removal::Drop
    }

    fn added(&self, _ctx: &mut MergeContext<'_>, next: &Declaration) {
        tracing::debug!(
            kind = %next.kind(),
            name = next.name().unwrap_or_default(),
            "adding declaration"
        );
    }
}

/// Imports are kept from prev; prefixes are developer-chosen.
struct ImportPolicy;

impl MemberPolicy for ImportPolicy {
    type Node = Import;

    fn identity(&self, node: &Import) -> MemberKey {
        MemberKey::new(NodeKind::Import, node.qualified_name())
    }

    fn equal(&self, _prev: &Import, _next: &Import) -> bool {
        true
    }

    fn merge(&self, _ctx: &mut MergeContext<'_>, prev: &Import, _next: &Import) -> Result<Import> {
        Ok(prev.clone())
    }

    fn removed(&self, _ctx: &mut MergeContext<'_>, _prev: &Import) -> Removal {
        Removal::Retain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaIndex;
    use crate::types::{
        EnumDecl, Field, FunctionDecl, Member, ObjectShape, Parameter, ServiceDecl, TypeExpr,
    };
    use crate::warning::{Warning, WarningKind};

    fn named(name: &str) -> TypeExpr {
        TypeExpr::named(name)
    }

    fn sample_module() -> Module {
        let service = ServiceDecl {
            name: Some("/graphql".to_string()),
            attach_point: Some("on new graphql:Listener(9090)".to_string()),
            members: vec![
                Member::Function(
                    FunctionDecl::resource("get", "book")
                        .with_parameter(Parameter::new("id", named("int")))
                        .returning(named("Book").optional())
                        .with_body("{ return lookup(id); }"),
                ),
                Member::Function(
                    FunctionDecl::remote("addBook")
                        .with_parameter(Parameter::new("input", named("BookInput")))
                        .returning(named("Book"))
                        .with_body("{ return save(input); }"),
                ),
            ],
            ..ServiceDecl::default()
        };

        let mut module = Module::new(vec![
            Declaration::Service(service),
            Declaration::TypeDef(TypeDefinition::record(
                "BookInput",
                vec![Field::new("title", named("string"))],
            )),
            Declaration::TypeDef(TypeDefinition::union("SearchResult", &["Book", "Author"])),
            Declaration::Enum(EnumDecl::new("Genre", &["FICTION", "POETRY"])),
        ]);
        module.imports.push(Import::new(Some("ballerina"), "graphql"));
        module
    }

    #[test]
    fn test_merge_identical_modules() {
        let module = sample_module();
        let outcome = merge_modules(&module, &module, &SchemaIndex::default()).unwrap();
        assert_eq!(outcome.module, module);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_prev_only_declaration_dropped_silently() {
        let prev = sample_module();
        let mut next = prev.clone();
        next.declarations.pop();

        let outcome = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap();
        assert_eq!(outcome.module.declarations.len(), 3);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_added_declaration_appended() {
        let prev = sample_module();
        let mut next = prev.clone();
        next.declarations.insert(
            0,
            Declaration::Enum(EnumDecl::new("Status", &["ACTIVE"])),
        );

        let outcome = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap();
        let last = outcome.module.declarations.last().and_then(Declaration::name);
        assert_eq!(last, Some("Status"));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_warnings_follow_traversal_order() {
        let prev = sample_module();
        let mut next = prev.clone();
        if let Declaration::Service(service) = &mut next.declarations[0] {
            service.members.remove(1);
        }
        if let Declaration::Enum(genre) = &mut next.declarations[3] {
            genre.members.pop();
        }

        let outcome = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap();
        let kinds: Vec<_> = outcome.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::ResolverRemoved, WarningKind::EnumMemberRemoved]
        );
    }

    #[test]
    fn test_object_to_distinct_object() {
        let prev = Module::new(vec![Declaration::TypeDef(TypeDefinition::object(
            "Node",
            vec![Member::Function(
                FunctionDecl::resource("get", "id").returning(named("string")),
            )],
        ))]);
        let distinct = TypeDefinition::new(
            "Node",
            TypeShape::DistinctObject(ObjectShape {
                qualifiers: vec![],
                members: vec![Member::Function(
                    FunctionDecl::resource("get", "id").returning(named("int")),
                )],
            }),
        );
        let next = Module::new(vec![Declaration::TypeDef(distinct)]);

        let outcome = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap();
        match &outcome.module.declarations[0] {
            Declaration::TypeDef(def) => {
                assert!(matches!(def.shape, TypeShape::DistinctObject(_)))
            }
            other => panic!("unexpected declaration: {:?}", other),
        }
        assert_eq!(
            outcome.warnings,
            vec![Warning::return_type_changed("Node", "id", "string", "int")]
        );
    }

    #[test]
    fn test_shape_mismatch_is_unsupported() {
        let prev = Module::new(vec![Declaration::TypeDef(TypeDefinition::record(
            "Result",
            vec![],
        ))]);
        let next = Module::new(vec![Declaration::TypeDef(TypeDefinition::union(
            "Result",
            &["Book"],
        ))]);

        let err = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap_err();
        assert!(err.is_unsupported_shape());
        assert!(err.to_string().contains("cannot merge record into union"));
    }

    fn service_with_field() -> Module {
        Module::new(vec![Declaration::Service(ServiceDecl {
            name: Some("/graphql".to_string()),
            members: vec![
                Member::Field(Field::new("counter", named("int"))),
                Member::Function(FunctionDecl::resource("get", "name").returning(named("string"))),
            ],
            ..ServiceDecl::default()
        })])
    }

    #[test]
    fn test_field_in_service_rejected_when_unchanged() {
        let module = service_with_field();
        let err = merge_modules(&module, &module, &SchemaIndex::default()).unwrap_err();
        assert!(err.is_unsupported_shape());
        assert!(err.to_string().contains("field 'counter' is not allowed in a service"));
    }

    #[test]
    fn test_field_in_service_rejected_regardless_of_other_changes() {
        let prev = service_with_field();
        let mut next = prev.clone();
        if let Declaration::Service(service) = &mut next.declarations[0] {
            if let Member::Function(name) = &mut service.members[1] {
                name.return_type = Some(named("string").optional());
            }
        }

        let unchanged = merge_modules(&prev, &prev, &SchemaIndex::default()).unwrap_err();
        let changed = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap_err();
        assert_eq!(unchanged.to_string(), changed.to_string());
    }

    #[test]
    fn test_field_in_object_type_rejected_when_unchanged() {
        let module = Module::new(vec![Declaration::TypeDef(TypeDefinition::object(
            "Node",
            vec![Member::Field(Field::new("id", named("string")))],
        ))]);
        let err = merge_modules(&module, &module, &SchemaIndex::default()).unwrap_err();
        assert!(err.is_unsupported_shape());
        assert!(err.to_string().contains("'Node'"));
    }

    #[test]
    fn test_object_to_record_is_unsupported() {
        let prev = Module::new(vec![Declaration::TypeDef(TypeDefinition::object(
            "Node",
            vec![],
        ))]);
        let next = Module::new(vec![Declaration::TypeDef(TypeDefinition::record(
            "Node",
            vec![],
        ))]);

        let err = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap_err();
        assert!(err.to_string().contains("cannot merge object into record"));
    }

    #[test]
    fn test_declarations_of_different_kinds_are_unequal() {
        let function = Declaration::Function(FunctionDecl::new("Genre"));
        let genre = Declaration::Enum(EnumDecl::new("Genre", &["A"]));
        assert!(!declarations_equal(&function, &genre));
        assert!(declarations_equal(&genre, &genre));
    }

    #[test]
    fn test_imports_keep_prev_and_append() {
        let mut prev = Module::default();
        let mut aliased = Import::new(Some("ballerina"), "graphql");
        aliased.prefix = Some("gql".to_string());
        prev.imports.push(aliased.clone());
        prev.imports.push(Import::new(None, "utils"));

        let mut next = Module::default();
        next.imports.push(Import::new(Some("ballerina"), "graphql"));
        next.imports.push(Import::new(Some("ballerina"), "log"));

        let outcome = merge_modules(&prev, &next, &SchemaIndex::default()).unwrap();
        let names: Vec<_> = outcome.module.imports.iter().map(Import::qualified_name).collect();
        assert_eq!(names, vec!["ballerina/graphql", "utils", "ballerina/log"]);
        assert_eq!(outcome.module.imports[0], aliased);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_module_pairs_keep_order() {
        let prev = sample_module();
        let mut next = prev.clone();
        if let Declaration::Enum(genre) = &mut next.declarations[3] {
            genre.members.clear();
        }
        let pairs = vec![
            ModulePair {
                path: "a.bal".to_string(),
                prev: prev.clone(),
                next: prev.clone(),
            },
            ModulePair {
                path: "b.bal".to_string(),
                prev,
                next,
            },
        ];

        let schema = SchemaIndex::default();
        let results = merge_module_pairs(&pairs, &schema, Some(2));
        assert_eq!(results.len(), 2);
        assert!(results[0].as_ref().unwrap().warnings.is_empty());
        assert_eq!(results[1].as_ref().unwrap().warnings.len(), 2);
    }
}
