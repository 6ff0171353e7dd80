//! Canonical child ordering by index tag
//!
//! `propagate_tag` lets composite nodes inherit the best index any child
//! uses; `sort_by_tag` then orders every child list so that indexed
//! predicates come first, grouped by index, compound-index prefix first.

use std::cmp::Ordering;

use super::ast::{MatchKind, PredicateNode};
use super::indexability::Indexability;
use super::tags::IndexAssignment;

/// Stamps each node that cannot use an index on its own field with the
/// smallest index ordinal found among its children. Bottom-up.
pub fn propagate_tag<I>(tree: &mut PredicateNode, oracle: &I)
where
    I: Indexability + ?Sized,
{
    if oracle.can_use_index_on_own_field(tree) {
        return;
    }

    let mut best = IndexAssignment::NO_INDEX;
    for child in tree.children_mut() {
        propagate_tag(child, oracle);
        if let Some(assignment) = child.assignment {
            best = best.min(assignment.index);
        }
    }
    if best != IndexAssignment::NO_INDEX {
        tree.assignment = Some(IndexAssignment::index_only(best));
    }
}

/// Total order over tagged nodes.
///
/// 1. smaller index ordinal (untagged last)
/// 2. geo-near first
/// 3. text first
/// 4. smaller compound-index slot
/// 5. field path, lexicographically
/// 6. predicate kind
pub fn compare(lhs: &PredicateNode, rhs: &PredicateNode) -> Ordering {
    let (lhs_index, lhs_slot) = IndexAssignment::sort_key(lhs.assignment.as_ref());
    let (rhs_index, rhs_slot) = IndexAssignment::sort_key(rhs.assignment.as_ref());

    lhs_index
        .cmp(&rhs_index)
        .then_with(|| kind_first(MatchKind::GeoNear, lhs, rhs))
        .then_with(|| kind_first(MatchKind::Text, lhs, rhs))
        .then_with(|| lhs_slot.cmp(&rhs_slot))
        .then_with(|| lhs.path().cmp(rhs.path()))
        .then_with(|| lhs.kind().cmp(&rhs.kind()))
}

fn kind_first(kind: MatchKind, lhs: &PredicateNode, rhs: &PredicateNode) -> Ordering {
    match (lhs.kind() == kind, rhs.kind() == kind) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Sorts every child list in the tree with `compare`, children first.
/// The sort is stable, so equal nodes keep their relative order.
pub fn sort_by_tag(tree: &mut PredicateNode) {
    for child in tree.children_mut() {
        sort_by_tag(child);
    }
    tree.children_mut().sort_by(compare);
}
