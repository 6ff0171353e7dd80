//! Resolution of relocation directives
//!
//! Walks the tree top-down. For every AND with an indexed OR child, each
//! sibling carrying relocation directives is copied into the OR's branches;
//! siblings that end up implied by every branch are removed.
//!
//! Clauses of an object `$elemMatch` are relocated but never removed: they
//! must be evaluated together against the same array element.

use super::ast::{MatchKind, Predicate, PredicateNode};
use super::relocate::relocate;
use super::tags::RelocationDirective;

/// What happened to one set of relocation directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRecord {
    /// Kind of the relocated predicate
    pub kind: MatchKind,
    /// Field path of the relocated predicate
    pub path: String,
    /// Directives consumed; one copy is attached per directive
    pub directives: usize,
    /// Every branch of the indexed OR received a copy
    pub covered: bool,
    /// The original predicate was removed from its AND
    pub removed: bool,
}

/// Totals for one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Directive sets processed
    pub relocations: u64,
    /// Copies grafted into OR branches
    pub clones_attached: u64,
    /// Predicates removed because the OR implies them
    pub subsumed: u64,
    /// Directive sets that left at least one branch uncovered
    pub partial: u64,
}

impl ResolveStats {
    /// Adds one processed directive set to the totals
    pub fn record(&mut self, record: &RelocationRecord) {
        self.relocations += 1;
        self.clones_attached += record.directives as u64;
        if record.removed {
            self.subsumed += 1;
        }
        if !record.covered {
            self.partial += 1;
        }
    }
}

/// Resolves every relocation directive in `tree`.
///
/// Running it on a tree with no directives left is a no-op.
pub fn resolve(tree: &mut PredicateNode) -> ResolveStats {
    let mut stats = ResolveStats::default();
    resolve_with(tree, &mut |record: RelocationRecord| stats.record(&record));
    stats
}

/// As `resolve`, reporting each processed directive set to `observer`.
pub fn resolve_with<F>(tree: &mut PredicateNode, observer: &mut F)
where
    F: FnMut(RelocationRecord),
{
    match &mut tree.expr {
        Predicate::And(children) => {
            resolve_conjunction(children, observer);
            for child in children.iter_mut() {
                resolve_with(child, observer);
            }
        }
        Predicate::Or(children) => {
            for child in children.iter_mut() {
                resolve_with(child, observer);
            }
        }
        _ => {}
    }
}

fn resolve_conjunction<F>(children: &mut Vec<PredicateNode>, observer: &mut F)
where
    F: FnMut(RelocationRecord),
{
    let Some(or_position) = children.iter().position(PredicateNode::is_indexed_or) else {
        return;
    };

    let mut redundant = vec![false; children.len()];
    {
        let (before, rest) = children.split_at_mut(or_position);
        let Some((indexed_or, after)) = rest.split_first_mut() else {
            return;
        };
        let siblings = before.iter_mut().enumerate().chain(
            after
                .iter_mut()
                .enumerate()
                .map(|(i, child)| (or_position + 1 + i, child)),
        );

        for (position, child) in siblings.rev() {
            if child.has_directives() {
                let directives = child.take_directives();
                redundant[position] =
                    relocate_recorded(child, indexed_or, directives, true, observer);
            } else if has_pending_under_not(child) {
                let directives = child.children_mut()[0].take_directives();
                redundant[position] =
                    relocate_recorded(child, indexed_or, directives, true, observer);
            } else if matches!(child.expr, Predicate::ElemMatchObject { .. }) {
                let mut pending = Vec::new();
                collect_elem_match_pending(child, &mut pending);
                for descendant in pending {
                    let directives = descendant.take_directives();
                    relocate_recorded(descendant, indexed_or, directives, false, observer);
                }
            }
        }
    }

    let mut position = 0;
    children.retain(|_| {
        let keep = !redundant[position];
        position += 1;
        keep
    });
}

/// Relocates `predicate` and reports the outcome. Returns true when the
/// original should be removed.
fn relocate_recorded<F>(
    predicate: &PredicateNode,
    indexed_or: &mut PredicateNode,
    directives: Vec<RelocationDirective>,
    removable: bool,
    observer: &mut F,
) -> bool
where
    F: FnMut(RelocationRecord),
{
    let count = directives.len();
    let covered = relocate(predicate, indexed_or, directives);
    let removed = covered && removable;
    observer(RelocationRecord {
        kind: predicate.kind(),
        path: predicate.path().to_string(),
        directives: count,
        covered,
        removed,
    });
    removed
}

fn has_pending_under_not(node: &PredicateNode) -> bool {
    matches!(&node.expr, Predicate::Not(inner) if inner.has_directives())
}

/// Collects the nodes under an object `$elemMatch` that carry directives,
/// looking through nested ANDs and object `$elemMatch`es only.
fn collect_elem_match_pending<'a>(
    node: &'a mut PredicateNode,
    out: &mut Vec<&'a mut PredicateNode>,
) {
    if node.has_directives() {
        out.push(node);
        return;
    }
    if matches!(
        node.expr,
        Predicate::And(_) | Predicate::ElemMatchObject { .. }
    ) {
        for child in node.children_mut() {
            collect_elem_match_pending(child, out);
        }
    }
}
