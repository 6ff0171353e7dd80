//! Explain output for tagged predicate trees
//!
//! One line per node, four spaces of indentation per level, followed by
//! the node's index assignment and any pending relocation directives.
//! Output is deterministic so it can be compared in tests and logs.

use std::fmt;

use super::ast::{Predicate, PredicateNode};

/// Rendered view of a predicate tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeExplain {
    /// Rendered lines, outermost node first
    pub lines: Vec<String>,
}

impl TreeExplain {
    /// Renders `tree` and all its descendants
    pub fn from_tree(tree: &PredicateNode) -> Self {
        let mut lines = Vec::new();
        Self::render(tree, 0, &mut lines);
        Self { lines }
    }

    fn render(node: &PredicateNode, depth: usize, lines: &mut Vec<String>) {
        let mut line = "    ".repeat(depth);
        line.push_str(node.kind().as_str());

        match &node.expr {
            Predicate::Leaf(leaf) => {
                if !leaf.path.is_empty() {
                    line.push(' ');
                    line.push_str(&leaf.path);
                }
                let operand = leaf.op.operand();
                if !operand.is_empty() {
                    line.push(' ');
                    line.push_str(&operand);
                }
            }
            Predicate::ElemMatchObject { path, .. } | Predicate::ElemMatchValue { path, .. } => {
                line.push(' ');
                line.push_str(path);
            }
            Predicate::And(_) | Predicate::Or(_) | Predicate::Not(_) => {}
        }

        if let Some(assignment) = &node.assignment {
            line.push_str(&format!(" || {}", assignment));
        }
        for directive in &node.directives {
            line.push_str(&format!(" || {}", directive));
        }
        lines.push(line);

        for child in node.children() {
            Self::render(child, depth + 1, lines);
        }
    }
}

impl fmt::Display for TreeExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
