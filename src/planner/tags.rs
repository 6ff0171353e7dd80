//! Index tags carried by predicate nodes
//!
//! Two kinds of metadata hang off a node:
//! - `IndexAssignment`: the index (and compound-index slot) the node will be
//!   served by once planning completes.
//! - `RelocationDirective`: a transient instruction to copy the node into a
//!   branch of a nested indexed disjunction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Final index placement of a predicate node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexAssignment {
    /// Ordinal of the index in the planner's index list
    pub index: usize,
    /// Position of the predicate's field within a compound index
    #[serde(default)]
    pub slot: usize,
}

impl IndexAssignment {
    /// Sentinel ordinal for "no index". Sorts after every real ordinal.
    pub const NO_INDEX: usize = usize::MAX;

    /// Assignment to `slot` of index `index`
    pub fn new(index: usize, slot: usize) -> Self {
        Self { index, slot }
    }

    /// Assignment naming only the index, slot 0.
    ///
    /// Used for composite nodes (AND wrappers, NOT) that inherit an index
    /// from a child rather than occupying a slot themselves.
    pub fn index_only(index: usize) -> Self {
        Self { index, slot: 0 }
    }

    /// Ordering key of an optional assignment; absent sorts as the sentinel.
    pub fn sort_key(assignment: Option<&Self>) -> (usize, usize) {
        match assignment {
            Some(a) => (a.index, a.slot),
            None => (Self::NO_INDEX, Self::NO_INDEX),
        }
    }
}

impl fmt::Display for IndexAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selected Index #{} pos {}", self.index, self.slot)
    }
}

/// Instruction to push a copy of a predicate through nested OR nodes.
///
/// Each element of `path` selects the child of the current OR to descend
/// into. An empty path means the copy is attached at the node reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelocationDirective {
    pub path: Vec<usize>,
    pub assignment: IndexAssignment,
}

impl RelocationDirective {
    /// Directive following `path` and attaching with `assignment`
    pub fn new(path: impl Into<Vec<usize>>, assignment: IndexAssignment) -> Self {
        Self {
            path: path.into(),
            assignment,
        }
    }

    /// First hop of the route, if any remains.
    pub fn next_hop(&self) -> Option<usize> {
        self.path.first().copied()
    }

    /// Drops the first hop of the route.
    pub(crate) fn advance(mut self) -> Self {
        if !self.path.is_empty() {
            self.path.remove(0);
        }
        self
    }

    /// True once the route has been fully walked.
    pub fn is_arrived(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for RelocationDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hops: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(
            f,
            "Move to [{}] -> #{} pos {}",
            hops.join(","),
            self.assignment.index,
            self.assignment.slot
        )
    }
}
