//! Enum merge.

use crate::error::Result;
use crate::merge::matcher::{match_members, MemberKey, MemberPolicy, Removal};
use crate::merge::MergeContext;
use crate::types::{EnumDecl, EnumMember, Metadata, NodeKind};
use crate::warning::Warning;

/// Same members in the same order; delimiters are incidental.
pub fn enums_equal(prev: &EnumDecl, next: &EnumDecl) -> bool {
    prev.members == next.members
        && Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()) == prev.metadata
}

/// Merge a matched enum pair. Matched members take the generated form.
pub fn merge_enum(
    ctx: &mut MergeContext<'_>,
    prev: &EnumDecl,
    next: &EnumDecl,
) -> Result<EnumDecl> {
    let policy = EnumMemberPolicy { owner: &prev.name };
    let outcome = match_members(&policy, ctx, &prev.members, &next.members)?;

    Ok(EnumDecl {
        name: prev.name.clone(),
        qualifiers: prev.qualifiers.clone(),
        delimiters: next.delimiters.clone(),
        members: outcome.merged,
        metadata: Metadata::overlay(prev.metadata.as_ref(), next.metadata.as_ref()),
    })
}

struct EnumMemberPolicy<'o> {
    owner: &'o str,
}

impl MemberPolicy for EnumMemberPolicy<'_> {
    type Node = EnumMember;

    fn identity(&self, node: &EnumMember) -> MemberKey {
        MemberKey::new(NodeKind::EnumMember, node.name.as_str())
    }

    fn equal(&self, prev: &EnumMember, next: &EnumMember) -> bool {
        prev == next
    }

    fn merge(
        &self,
        _ctx: &mut MergeContext<'_>,
        _prev: &EnumMember,
        next: &EnumMember,
    ) -> Result<EnumMember> {
        Ok(next.clone())
    }

    fn removed(&self, ctx: &mut MergeContext<'_>, prev: &EnumMember) -> Removal {
        ctx.warn(Warning::enum_member_removed(self.owner, prev.name.as_str()));
        Removal::Drop
    }
}
