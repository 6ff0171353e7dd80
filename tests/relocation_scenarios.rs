//! Relocation Scenario Tests
//!
//! Tests for directive resolution:
//! - A predicate routed into every OR branch is removed from its AND
//! - A partially routed predicate stays where it was
//! - Clauses of an object $elemMatch are relocated but never removed
//! - Resolution consumes every directive and is idempotent

use aerodb_tagging::planner::{
    attach, resolve, IndexAssignment, MatchKind, PredicateNode, RelocationDirective, TreeExplain,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn tag(index: usize, slot: usize) -> IndexAssignment {
    IndexAssignment::new(index, slot)
}

fn to_branch(branch: usize, index: usize) -> RelocationDirective {
    RelocationDirective::new(vec![branch], tag(index, 0))
}

fn p() -> PredicateNode {
    PredicateNode::eq("p", json!("north")).with_assignment(tag(3, 0))
}

fn q() -> PredicateNode {
    PredicateNode::eq("q", json!("south")).with_assignment(tag(3, 0))
}

fn x() -> PredicateNode {
    PredicateNode::gt("x", json!(10))
}

fn indexed_or() -> PredicateNode {
    PredicateNode::or(vec![p(), q()]).with_assignment(tag(3, 0))
}

/// Expected clone of `x` once grafted with `assignment`
fn x_clone(assignment: IndexAssignment) -> PredicateNode {
    x().with_assignment(assignment)
}

// =============================================================================
// Scenario A: full coverage
// =============================================================================

/// Every branch receives a tagged clone and the original is dropped.
#[test]
fn test_full_coverage_removes_original() {
    let mut tree = PredicateNode::and(vec![
        x().with_directive(to_branch(0, 3)).with_directive(to_branch(1, 3)),
        indexed_or(),
    ]);

    let stats = resolve(&mut tree);

    let expected = PredicateNode::and(vec![PredicateNode::or(vec![
        PredicateNode::and(vec![p(), x_clone(tag(3, 0))]).with_assignment(tag(3, 0)),
        PredicateNode::and(vec![q(), x_clone(tag(3, 0))]).with_assignment(tag(3, 0)),
    ])
    .with_assignment(tag(3, 0))]);

    assert_eq!(tree, expected);
    assert_eq!(stats.subsumed, 1);
    assert_eq!(stats.clones_attached, 2);
}

/// The clone keeps the directive's compound-index slot.
#[test]
fn test_clone_carries_directive_slot() {
    let mut tree = PredicateNode::and(vec![
        x().with_directive(RelocationDirective::new(vec![0], tag(3, 1)))
            .with_directive(RelocationDirective::new(vec![1], tag(3, 1))),
        indexed_or(),
    ]);

    resolve(&mut tree);

    for branch in tree.children()[0].children() {
        assert_eq!(branch.assignment, Some(tag(3, 0)));
        assert_eq!(branch.children()[1].assignment, Some(tag(3, 1)));
    }
}

// =============================================================================
// Scenario B: partial coverage
// =============================================================================

/// Only branch 0 is covered: the original stays and branch 1 is untouched.
#[test]
fn test_partial_coverage_keeps_original() {
    let mut tree = PredicateNode::and(vec![x().with_directive(to_branch(0, 3)), indexed_or()]);

    let stats = resolve(&mut tree);

    let expected = PredicateNode::and(vec![
        x(),
        PredicateNode::or(vec![
            PredicateNode::and(vec![p(), x_clone(tag(3, 0))]).with_assignment(tag(3, 0)),
            q(),
        ])
        .with_assignment(tag(3, 0)),
    ]);

    assert_eq!(tree, expected);
    assert_eq!(stats.subsumed, 0);
    assert_eq!(stats.partial, 1);
}

/// A branch that is already an AND gains the clone as an extra conjunct.
#[test]
fn test_existing_and_branch_is_extended() {
    let branch = PredicateNode::and(vec![p(), PredicateNode::exists("r", true)])
        .with_assignment(tag(3, 0));
    let mut tree = PredicateNode::and(vec![
        x().with_directive(to_branch(0, 3)),
        PredicateNode::or(vec![branch, q()]).with_assignment(tag(3, 0)),
    ]);

    resolve(&mut tree);

    let branch = &tree.children()[1].children()[0];
    assert_eq!(branch.children().len(), 3);
    assert_eq!(branch.children()[2], x_clone(tag(3, 0)));
}

// =============================================================================
// Scenario C: object $elemMatch
// =============================================================================

fn elem_match(y_directives: &[usize]) -> PredicateNode {
    let mut y = PredicateNode::eq("y", json!(1));
    for &branch in y_directives {
        y = y.with_directive(to_branch(branch, 3));
    }
    PredicateNode::elem_match_object("items", vec![y, PredicateNode::lt("z", json!(5))])
}

/// Fully covered clause: relocated, but the $elemMatch survives intact.
#[test]
fn test_elem_match_never_removed_when_covered() {
    let mut tree = PredicateNode::and(vec![elem_match(&[0, 1]), indexed_or()]);

    let stats = resolve(&mut tree);

    assert_eq!(tree.children().len(), 2);
    let em = &tree.children()[0];
    assert_eq!(em.kind(), MatchKind::ElemMatchObject);
    assert_eq!(em.children().len(), 2);
    assert!(!em.children()[0].has_directives());
    assert_eq!(stats.subsumed, 0);

    for branch in tree.children()[1].children() {
        let copy = &branch.children()[1];
        assert_eq!(copy.path(), "y");
        assert_eq!(copy.assignment, Some(tag(3, 0)));
    }
}

/// Partially covered clause: the $elemMatch also survives.
#[test]
fn test_elem_match_never_removed_when_partial() {
    let mut tree = PredicateNode::and(vec![indexed_or(), elem_match(&[1])]);

    resolve(&mut tree);

    assert_eq!(tree.children().len(), 2);
    assert_eq!(tree.children()[1].kind(), MatchKind::ElemMatchObject);
    let or = &tree.children()[0];
    assert_eq!(or.children()[0], p());
    assert!(or.children()[1].is_and());
}

// =============================================================================
// Nested ORs and NOT
// =============================================================================

/// A two-hop directive reaches the inner OR through an AND branch.
#[test]
fn test_two_hop_directive_reaches_inner_or() {
    let inner_or = PredicateNode::or(vec![
        PredicateNode::eq("a", json!(1)).with_assignment(tag(4, 0)),
        PredicateNode::eq("b", json!(1)).with_assignment(tag(4, 0)),
    ])
    .with_assignment(tag(4, 0));
    let branch = PredicateNode::and(vec![p(), inner_or]).with_assignment(tag(3, 0));
    let mut tree = PredicateNode::and(vec![
        x().with_directive(RelocationDirective::new(vec![0, 1], tag(4, 0))),
        PredicateNode::or(vec![branch, q()]).with_assignment(tag(3, 0)),
    ]);

    resolve(&mut tree);

    let inner = &tree.children()[1].children()[0].children()[1];
    assert!(inner.is_indexed_or());
    assert_eq!(inner.children()[1].children()[1], x_clone(tag(4, 0)));
    assert!(!inner.children()[0].is_and());
    // branch 1 of the outer OR received nothing, so x stays
    assert_eq!(tree.children()[0], x());
}

/// A NOT whose child holds the directives moves as a whole.
#[test]
fn test_not_relocated_as_unit() {
    let mut tree = PredicateNode::and(vec![
        PredicateNode::not(x().with_directive(to_branch(0, 3)).with_directive(to_branch(1, 3))),
        indexed_or(),
    ]);

    resolve(&mut tree);

    assert_eq!(tree.children().len(), 1);
    let copy = &tree.children()[0].children()[0].children()[1];
    assert!(copy.is_not());
    assert_eq!(copy.children()[0], x_clone(tag(3, 0)));
}

// =============================================================================
// Whole-pass properties
// =============================================================================

/// No directive survives resolution, and a second run changes nothing.
#[test]
fn test_resolution_consumes_directives_and_is_idempotent() {
    let mut tree = PredicateNode::and(vec![
        x().with_directive(to_branch(1, 3)),
        PredicateNode::regex("name", "^ab")
            .with_directive(to_branch(0, 3))
            .with_directive(to_branch(1, 3)),
        indexed_or(),
        elem_match(&[0]),
    ]);

    resolve(&mut tree);
    assert_eq!(tree.pending_directive_count(), 0);

    let once = TreeExplain::from_tree(&tree);
    let stats = resolve(&mut tree);
    assert_eq!(TreeExplain::from_tree(&tree), once);
    assert_eq!(stats.relocations, 0);
}

/// attach never modifies the predicate it copies.
#[test]
fn test_attach_leaves_source_untouched() {
    let source = x().with_directive(to_branch(0, 3));
    let before = source.clone();
    let mut slot = p();

    attach(&source, &mut slot, tag(3, 0));

    assert_eq!(source, before);
    assert!(slot.is_and());
}

/// Trees decoded from JSON resolve like hand-built ones.
#[test]
fn test_resolve_tree_from_json() {
    let input = json!({
        "expr": {"and": [
            {"expr": {"leaf": {"path": "x", "op": {"gt": 10}}},
             "directives": [
                {"path": [0], "assignment": {"index": 3}},
                {"path": [1], "assignment": {"index": 3}}
             ]},
            {"expr": {"or": [
                {"expr": {"leaf": {"path": "p", "op": {"eq": "north"}}},
                 "assignment": {"index": 3}},
                {"expr": {"leaf": {"path": "q", "op": {"eq": "south"}}},
                 "assignment": {"index": 3}}
            ]}, "assignment": {"index": 3, "slot": 0}}
        ]}
    });
    let mut from_json = PredicateNode::from_json(&input.to_string()).unwrap();
    let mut built = PredicateNode::and(vec![
        x().with_directive(to_branch(0, 3)).with_directive(to_branch(1, 3)),
        indexed_or(),
    ]);

    resolve(&mut from_json);
    resolve(&mut built);

    assert_eq!(from_json, built);
}

/// A NOT routed into only one branch stays in its AND.
#[test]
fn test_partially_covered_not_stays() {
    let mut tree = PredicateNode::and(vec![
        PredicateNode::not(x().with_directive(to_branch(1, 3))),
        indexed_or(),
    ]);

    let stats = resolve(&mut tree);

    assert_eq!(tree.children().len(), 2);
    assert_eq!(tree.children()[0], PredicateNode::not(x()));
    assert_eq!(stats.partial, 1);
    let or = &tree.children()[1];
    assert_eq!(or.children()[0], p());
    assert!(or.children()[1].children()[1].is_not());
}

/// A clause inside an AND nested in an object $elemMatch is relocated,
/// and nothing under the $elemMatch is deleted.
#[test]
fn test_elem_match_inner_and_clause_relocated() {
    let y = PredicateNode::eq("y", json!(1))
        .with_directive(to_branch(0, 3))
        .with_directive(to_branch(1, 3));
    let em = PredicateNode::elem_match_object(
        "items",
        vec![PredicateNode::and(vec![y, PredicateNode::lt("z", json!(5))])],
    );
    let mut tree = PredicateNode::and(vec![em, indexed_or()]);

    let stats = resolve(&mut tree);

    assert_eq!(stats.relocations, 1);
    assert_eq!(stats.subsumed, 0);
    let em = &tree.children()[0];
    assert_eq!(em.children()[0].children().len(), 2);
    assert_eq!(tree.pending_directive_count(), 0);
    for branch in tree.children()[1].children() {
        assert_eq!(branch.children()[1].path(), "y");
    }
}
