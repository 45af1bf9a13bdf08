//! Union merge.
//!
//! Union members carry nothing a developer would customize, so the merged
//! member list is the generated one as a whole. The previous list is only
//! consulted to report removed members.

use crate::error::Result;
use crate::merge::matcher::{match_members, MemberKey, MemberPolicy, Removal};
use crate::merge::MergeContext;
use crate::types::{NodeKind, UnionShape};
use crate::warning::Warning;

pub fn unions_equal(prev: &UnionShape, next: &UnionShape) -> bool {
    prev.members == next.members
}

pub fn merge_union(
    ctx: &mut MergeContext<'_>,
    owner: &str,
    prev: &UnionShape,
    next: &UnionShape,
) -> Result<UnionShape> {
    let policy = UnionMemberPolicy { owner };
    let outcome = match_members(&policy, ctx, &prev.members, &next.members)?;
    if !outcome.added.is_empty() {
        tracing::debug!(owner, added = outcome.added.len(), "union members added");
    }
    Ok(next.clone())
}

struct UnionMemberPolicy<'o> {
    owner: &'o str,
}

impl MemberPolicy for UnionMemberPolicy<'_> {
    type Node = String;

    fn identity(&self, node: &String) -> MemberKey {
        MemberKey::new(NodeKind::UnionMember, node.as_str())
    }

    fn equal(&self, _prev: &String, _next: &String) -> bool {
        true
    }

    fn merge(&self, _ctx: &mut MergeContext<'_>, _prev: &String, next: &String) -> Result<String> {
        Ok(next.clone())
    }

    fn removed(&self, ctx: &mut MergeContext<'_>, prev: &String) -> Removal {
        ctx.warn(Warning::union_member_removed(self.owner, prev.as_str()));
        Removal::Drop
    }
}
