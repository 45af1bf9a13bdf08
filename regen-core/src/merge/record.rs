//! Record and input type merge.

use crate::error::Result;
use crate::merge::matcher::{match_members, MemberKey, MemberPolicy, Removal};
use crate::merge::variable::{self, compare_variables};
use crate::merge::MergeContext;
use crate::types::{Field, Metadata, NodeKind, RecordShape};
use crate::warning::Warning;

/// Field lists equal; delimiters are incidental.
pub fn records_equal(prev: &RecordShape, next: &RecordShape) -> bool {
    prev.fields.len() == next.fields.len()
        && prev
            .fields
            .iter()
            .zip(&next.fields)
            .all(|(p, n)| variable::equal(p, n) && metadata_kept(p, n))
}

fn metadata_kept(prev: &Field, next: &Field) -> bool {
    Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()) == prev.metadata
}

/// Merge the record shape of type definition `owner`.
///
/// A required field added to an input type is reported; the same addition to
/// an output record is not.
pub fn merge_record(
    ctx: &mut MergeContext<'_>,
    owner: &str,
    prev: &RecordShape,
    next: &RecordShape,
) -> Result<RecordShape> {
    if prev.delimiters != next.delimiters {
        tracing::debug!(
            owner,
            prev = %prev.delimiters.open,
            next = %next.delimiters.open,
            "ignoring delimiter difference"
        );
    }

    let policy = FieldPolicy {
        owner,
        input: ctx.schema().is_input_type(owner),
    };
    let outcome = match_members(&policy, ctx, &prev.fields, &next.fields)?;

    Ok(RecordShape {
        delimiters: next.delimiters.clone(),
        fields: outcome.merged,
    })
}

struct FieldPolicy<'o> {
    owner: &'o str,
    input: bool,
}

impl MemberPolicy for FieldPolicy<'_> {
    type Node = Field;

    fn identity(&self, node: &Field) -> MemberKey {
        MemberKey::new(NodeKind::Field, node.name.as_str())
    }

    fn equal(&self, prev: &Field, next: &Field) -> bool {
        variable::equal(prev, next) && metadata_kept(prev, next)
    }

    fn merge(&self, ctx: &mut MergeContext<'_>, prev: &Field, next: &Field) -> Result<Field> {
        if let Some(cmp) = compare_variables(prev, next) {
            if cmp.type_changed() {
                ctx.warn(Warning::field_type_changed(
                    self.owner,
                    cmp.name.as_str(),
                    cmp.types.prev.as_str(),
                    cmp.types.next.as_str(),
                ));
            }
            if let (true, Some(old_default)) = (cmp.default_removed, cmp.prev_default.as_deref()) {
                ctx.warn(Warning::field_default_removed(
                    self.owner,
                    cmp.name.as_str(),
                    old_default,
                ));
            }
        }

        Ok(Field {
            name: next.name.clone(),
            type_expr: next.type_expr.clone(),
            default_value: next.default_value.clone(),
            readonly: prev.readonly,
            metadata: Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()),
        })
    }

    fn removed(&self, ctx: &mut MergeContext<'_>, prev: &Field) -> Removal {
        ctx.warn(Warning::member_removed(self.owner, prev.name.as_str()));
        Removal::Drop
    }

    fn added(&self, ctx: &mut MergeContext<'_>, next: &Field) {
        if self.input && next.default_value.is_none() {
            ctx.warn(Warning::field_added_no_default(
                self.owner,
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
    use crate::types::{Delimiters, TypeExpr};
    use crate::warning::WarningKind;

    fn record(fields: Vec<Field>) -> RecordShape {
        RecordShape {
            delimiters: Delimiters::exclusive(),
            fields,
        }
    }

    fn field(name: &str, ty: &str) -> Field {
        Field::new(name, TypeExpr::named(ty))
    }

    #[test]
    fn test_field_changes_in_order() {
        let schema = SchemaIndex::default();
        let mut ctx = MergeContext::new(&schema);
        let prev = record(vec![
            field("id", "int").readonly(),
            field("age", "int").with_default("0"),
            field("nickname", "string"),
        ]);
        let next = record(vec![field("id", "string"), field("age", "int")]);

        let merged = merge_record(&mut ctx, "Person", &prev, &next).unwrap();
        assert_eq!(merged.fields.len(), 2);
        assert!(merged.fields[0].readonly);
        assert_eq!(merged.fields[0].type_expr, TypeExpr::named("string"));

        let warnings = ctx.into_warnings();
        assert_eq!(
            warnings,
            vec![
                Warning::field_type_changed("Person", "id", "int", "string"),
                Warning::field_default_removed("Person", "age", "0"),
                Warning::member_removed("Person", "nickname"),
            ]
        );
    }

    #[test]
    fn test_required_field_added_to_input_type() {
        let schema = SchemaIndex::new().with_input_type("NewUser");
        let prev = record(vec![field("name", "string")]);
        let next = record(vec![
            field("name", "string"),
            field("email", "string"),
            field("age", "int").with_default("0"),
        ]);

        let mut ctx = MergeContext::new(&schema);
        merge_record(&mut ctx, "NewUser", &prev, &next).unwrap();
        let warnings = ctx.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::FieldAddedNoDefault);
        assert_eq!(warnings[0].value(0), Some("string"));

        let mut ctx = MergeContext::new(&schema);
        merge_record(&mut ctx, "User", &prev, &next).unwrap();
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_delimiters_are_incidental() {
        let prev = record(vec![field("id", "int")]);
        let next = RecordShape {
            delimiters: Delimiters::braces(),
            fields: vec![field("id", "int")],
        };
        assert!(records_equal(&prev, &next));
        assert!(!records_equal(&prev, &record(vec![field("id", "string")])));
    }
}
