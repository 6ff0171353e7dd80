//! Relocation primitives
//!
//! `attach` grafts a tagged copy of a predicate into one branch of an
//! indexed OR; `relocate` routes a predicate through nested ORs along the
//! paths of its relocation directives.

use super::ast::{Predicate, PredicateNode};
use super::errors::{contract_violation, ContractViolation};
use super::tags::{IndexAssignment, RelocationDirective};

/// Grafts a copy of `predicate`, stamped with `assignment`, into `destination`.
///
/// `destination` is the child slot of the OR being rewritten. If it already
/// holds an AND the copy becomes an extra conjunct; otherwise the slot is
/// replaced by `AND[destination, copy]`. `predicate` itself is not modified.
pub fn attach(
    predicate: &PredicateNode,
    destination: &mut PredicateNode,
    assignment: IndexAssignment,
) {
    let mut copy = predicate.clone();
    match &mut copy.expr {
        Predicate::Not(child) => {
            child.assignment = Some(assignment);
            copy.assignment = Some(IndexAssignment::index_only(assignment.index));
        }
        _ => copy.assignment = Some(assignment),
    }

    if let Predicate::And(conjuncts) = &mut destination.expr {
        conjuncts.push(copy);
        return;
    }

    let original = std::mem::replace(destination, PredicateNode::and(Vec::new()));
    *destination = PredicateNode::and(vec![original, copy])
        .with_assignment(IndexAssignment::index_only(assignment.index));
}

/// Pushes `predicate` into the branches of `target` named by `directives`.
///
/// Returns true when every branch of the indexed OR received a copy, i.e.
/// the predicate is now implied by the OR and may be dropped from its
/// original position.
///
/// Panics (after logging) if a directive cannot be routed or `target` is not
/// an AND/OR of the expected shape.
pub fn relocate(
    predicate: &PredicateNode,
    target: &mut PredicateNode,
    directives: Vec<RelocationDirective>,
) -> bool {
    let kind = target.kind();
    match &mut target.expr {
        Predicate::Or(branches) => relocate_into_branches(predicate, branches, directives),
        Predicate::And(conjuncts) => {
            let indexed_or = match conjuncts.iter_mut().find(|c| c.is_indexed_or()) {
                Some(or) => or,
                None => contract_violation(ContractViolation::missing_indexed_or()),
            };
            relocate(predicate, indexed_or, directives)
        }
        _ => contract_violation(ContractViolation::invalid_target(kind.as_str())),
    }
}

fn relocate_into_branches(
    predicate: &PredicateNode,
    branches: &mut [PredicateNode],
    mut directives: Vec<RelocationDirective>,
) -> bool {
    let mut covered = true;
    for (position, branch) in branches.iter_mut().enumerate() {
        let routed = take_routed(&mut directives, position);

        if routed.is_empty() {
            covered = false;
        } else if routed.len() == 1 && arrives_at(branch, &routed[0]) {
            attach(predicate, branch, routed[0].assignment);
        } else {
            let branch_covered = relocate(predicate, branch, routed);
            covered = covered && branch_covered;
        }
    }

    if !directives.is_empty() {
        contract_violation(ContractViolation::unconsumed_directives(
            directives.len(),
            branches.len(),
        ));
    }
    covered
}

/// A directive is delivered once its route is empty. A NOT is transparent
/// for one hop, so `[0]` into a NOT branch also delivers.
fn arrives_at(branch: &PredicateNode, directive: &RelocationDirective) -> bool {
    directive.is_arrived() || (branch.is_not() && directive.path == [0])
}

/// Removes the directives whose next hop is `position` and returns them
/// with that hop consumed.
fn take_routed(
    directives: &mut Vec<RelocationDirective>,
    position: usize,
) -> Vec<RelocationDirective> {
    if directives.iter().any(RelocationDirective::is_arrived) {
        contract_violation(ContractViolation::empty_directive_path());
    }

    let (routed, rest): (Vec<_>, Vec<_>) = std::mem::take(directives)
        .into_iter()
        .partition(|d| d.next_hop() == Some(position));
    *directives = rest;
    routed.into_iter().map(RelocationDirective::advance).collect()
}
