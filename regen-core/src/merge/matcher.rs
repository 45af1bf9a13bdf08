//! Generic pairing of sibling lists.
//!
//! Every comparator that walks a list of children (parameters, fields, enum
//! members, service members, top-level declarations) goes through
//! [`match_members`]. The kind-specific parts live behind [`MemberPolicy`].
//!
//! Pairing is first-match-wins: each previous element takes the first
//! unclaimed next element with the same identity key. This is deterministic
//! but not an optimal bipartite matching; with unique sibling identities the
//! two coincide.

use std::fmt;

use crate::error::Result;
use crate::merge::MergeContext;
use crate::types::NodeKind;

/// Identity of a sibling: its node kind and name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberKey {
    pub kind: NodeKind,
    pub name: String,
}

impl MemberKey {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// What to do with a previous element that has no counterpart in next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// Keep it verbatim (developer-authored helpers).
    Retain,
    /// Drop it from the merged list.
    Drop,
}

/// Kind-specific behavior plugged into the matcher.
pub trait MemberPolicy {
    type Node: Clone;

    /// Key used to pair elements across trees.
    fn identity(&self, node: &Self::Node) -> MemberKey;

    /// Whether a matched pair is unchanged for merge purposes.
    fn equal(&self, prev: &Self::Node, next: &Self::Node) -> bool;

    /// Merge a matched but unequal pair.
    fn merge(
        &self,
        ctx: &mut MergeContext<'_>,
        prev: &Self::Node,
        next: &Self::Node,
    ) -> Result<Self::Node>;

    /// Decide the fate of an unmatched previous element, emitting any warning.
    fn removed(&self, ctx: &mut MergeContext<'_>, prev: &Self::Node) -> Removal;

    /// Called for every unmatched next element before it is appended.
    fn added(&self, _ctx: &mut MergeContext<'_>, _next: &Self::Node) {}
}

/// Result of matching two sibling lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOutcome<N> {
    /// Merged list: prev order first, then additions in next order
    pub merged: Vec<N>,
    /// Previous elements dropped from the merged list
    pub removed: Vec<MemberKey>,
    /// Previous elements without a counterpart that were kept
    pub retained: Vec<MemberKey>,
    /// Next elements without a counterpart, appended
    pub added: Vec<MemberKey>,
    /// `(prev_index, next_index)` of matched pairs that needed a merge
    pub changed: Vec<(usize, usize)>,
}

impl<N> MatchOutcome<N> {
    /// True when nothing was removed, added, or changed.
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty()
            && self.retained.is_empty()
            && self.added.is_empty()
            && self.changed.is_empty()
    }
}

/// Pair `prev` against `next` and build the merged list.
pub fn match_members<P: MemberPolicy>(
    policy: &P,
    ctx: &mut MergeContext<'_>,
    prev: &[P::Node],
    next: &[P::Node],
) -> Result<MatchOutcome<P::Node>> {
    let prev_keys: Vec<MemberKey> = prev.iter().map(|node| policy.identity(node)).collect();
    let next_keys: Vec<MemberKey> = next.iter().map(|node| policy.identity(node)).collect();
    let mut claimed = vec![false; next.len()];

    let mut outcome = MatchOutcome {
        merged: Vec::with_capacity(prev.len().max(next.len())),
        removed: Vec::new(),
        retained: Vec::new(),
        added: Vec::new(),
        changed: Vec::new(),
    };

    for (prev_index, prev_node) in prev.iter().enumerate() {
        let key = &prev_keys[prev_index];
        let found = next_keys
            .iter()
            .enumerate()
            .find(|(next_index, next_key)| !claimed[*next_index] && *next_key == key)
            .map(|(next_index, _)| next_index);

        match found {
            Some(next_index) => {
                claimed[next_index] = true;
                let next_node = &next[next_index];
                if policy.equal(prev_node, next_node) {
                    tracing::trace!(kind = %key.kind, name = %key.name, "unchanged");
                    outcome.merged.push(prev_node.clone());
                } else {
                    tracing::trace!(kind = %key.kind, name = %key.name, "merging");
                    outcome.merged.push(policy.merge(ctx, prev_node, next_node)?);
                    outcome.changed.push((prev_index, next_index));
                }
            }
            None => match policy.removed(ctx, prev_node) {
                Removal::Retain => {
                    tracing::debug!(kind = %key.kind, name = %key.name, "retaining unmatched member");
                    outcome.merged.push(prev_node.clone());
                    outcome.retained.push(key.clone());
                }
                Removal::Drop => {
                    tracing::trace!(kind = %key.kind, name = %key.name, "dropping removed member");
                    outcome.removed.push(key.clone());
                }
            },
        }
    }

    for (next_index, next_node) in next.iter().enumerate() {
        if claimed[next_index] {
            continue;
        }
        policy.added(ctx, next_node);
        outcome.merged.push(next_node.clone());
        outcome.added.push(next_keys[next_index].clone());
    }

    Ok(outcome)
}
