//! Predicate tree consumed by the tagging passes
//!
//! A filter is represented as a tree of `PredicateNode`s. Logical nodes
//! (AND, OR, NOT, object and value sub-matches) own their children; leaves
//! test a single field. Every node may carry a final `IndexAssignment` and a
//! transient list of `RelocationDirective`s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::LoadResult;
use super::tags::{IndexAssignment, RelocationDirective};

/// Kind of a predicate node.
///
/// Declaration order is significant: it is the last tie-break of the
/// canonical child ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    And,
    Or,
    ElemMatchObject,
    ElemMatchValue,
    Size,
    Lte,
    Lt,
    Eq,
    Gt,
    Gte,
    Regex,
    Mod,
    Exists,
    In,
    BitsAllSet,
    BitsAllClear,
    BitsAnySet,
    BitsAnyClear,
    Not,
    Type,
    Geo,
    Where,
    AlwaysFalse,
    AlwaysTrue,
    GeoNear,
    Text,
}

impl MatchKind {
    /// Operator name used in explain output
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::And => "$and",
            MatchKind::Or => "$or",
            MatchKind::ElemMatchObject => "$elemMatch (obj)",
            MatchKind::ElemMatchValue => "$elemMatch (value)",
            MatchKind::Size => "$size",
            MatchKind::Lte => "$lte",
            MatchKind::Lt => "$lt",
            MatchKind::Eq => "$eq",
            MatchKind::Gt => "$gt",
            MatchKind::Gte => "$gte",
            MatchKind::Regex => "$regex",
            MatchKind::Mod => "$mod",
            MatchKind::Exists => "$exists",
            MatchKind::In => "$in",
            MatchKind::BitsAllSet => "$bitsAllSet",
            MatchKind::BitsAllClear => "$bitsAllClear",
            MatchKind::BitsAnySet => "$bitsAnySet",
            MatchKind::BitsAnyClear => "$bitsAnyClear",
            MatchKind::Not => "$not",
            MatchKind::Type => "$type",
            MatchKind::Geo => "$geoWithin",
            MatchKind::Where => "$where",
            MatchKind::AlwaysFalse => "$alwaysFalse",
            MatchKind::AlwaysTrue => "$alwaysTrue",
            MatchKind::GeoNear => "$near",
            MatchKind::Text => "$text",
        }
    }
}

/// Condition tested by a leaf predicate. Opaque to the tagging passes
/// apart from its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafOp {
    Eq(Value),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    In(Vec<Value>),
    Exists(bool),
    Regex {
        pattern: String,
        #[serde(default)]
        flags: String,
    },
    Mod {
        divisor: i64,
        remainder: i64,
    },
    Type(String),
    Size(u64),
    BitsAllSet(u64),
    BitsAllClear(u64),
    BitsAnySet(u64),
    BitsAnyClear(u64),
    Geo(Value),
    GeoNear(Value),
    Text {
        search: String,
        #[serde(default)]
        language: Option<String>,
    },
    Where(String),
    AlwaysTrue,
    AlwaysFalse,
}

impl LeafOp {
    /// Kind of the leaf carrying this condition
    pub fn kind(&self) -> MatchKind {
        match self {
            LeafOp::Eq(_) => MatchKind::Eq,
            LeafOp::Lt(_) => MatchKind::Lt,
            LeafOp::Lte(_) => MatchKind::Lte,
            LeafOp::Gt(_) => MatchKind::Gt,
            LeafOp::Gte(_) => MatchKind::Gte,
            LeafOp::In(_) => MatchKind::In,
            LeafOp::Exists(_) => MatchKind::Exists,
            LeafOp::Regex { .. } => MatchKind::Regex,
            LeafOp::Mod { .. } => MatchKind::Mod,
            LeafOp::Type(_) => MatchKind::Type,
            LeafOp::Size(_) => MatchKind::Size,
            LeafOp::BitsAllSet(_) => MatchKind::BitsAllSet,
            LeafOp::BitsAllClear(_) => MatchKind::BitsAllClear,
            LeafOp::BitsAnySet(_) => MatchKind::BitsAnySet,
            LeafOp::BitsAnyClear(_) => MatchKind::BitsAnyClear,
            LeafOp::Geo(_) => MatchKind::Geo,
            LeafOp::GeoNear(_) => MatchKind::GeoNear,
            LeafOp::Text { .. } => MatchKind::Text,
            LeafOp::Where(_) => MatchKind::Where,
            LeafOp::AlwaysTrue => MatchKind::AlwaysTrue,
            LeafOp::AlwaysFalse => MatchKind::AlwaysFalse,
        }
    }

    /// Operand rendering for explain output
    pub fn operand(&self) -> String {
        match self {
            LeafOp::Eq(v)
            | LeafOp::Lt(v)
            | LeafOp::Lte(v)
            | LeafOp::Gt(v)
            | LeafOp::Gte(v)
            | LeafOp::Geo(v)
            | LeafOp::GeoNear(v) => v.to_string(),
            LeafOp::In(values) => Value::Array(values.clone()).to_string(),
            LeafOp::Exists(b) => b.to_string(),
            LeafOp::Regex { pattern, flags } => format!("/{}/{}", pattern, flags),
            LeafOp::Mod { divisor, remainder } => format!("[{}, {}]", divisor, remainder),
            LeafOp::Type(t) => t.clone(),
            LeafOp::Size(n) => n.to_string(),
            LeafOp::BitsAllSet(m)
            | LeafOp::BitsAllClear(m)
            | LeafOp::BitsAnySet(m)
            | LeafOp::BitsAnyClear(m) => format!("{:#x}", m),
            LeafOp::Text { search, .. } => format!("{:?}", search),
            LeafOp::Where(code) => code.clone(),
            LeafOp::AlwaysTrue | LeafOp::AlwaysFalse => String::new(),
        }
    }
}

/// A leaf predicate: one field tested against one condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafPredicate {
    /// Dotted field path
    pub path: String,
    pub op: LeafOp,
}

/// Shape of a predicate node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    And(Vec<PredicateNode>),
    Or(Vec<PredicateNode>),
    Not(Box<PredicateNode>),
    /// Every clause must hold against the same element of the array at `path`.
    ElemMatchObject {
        path: String,
        children: Vec<PredicateNode>,
    },
    /// Every clause must hold against the same scalar element at `path`.
    ElemMatchValue {
        path: String,
        children: Vec<PredicateNode>,
    },
    Leaf(LeafPredicate),
}

/// A node of the predicate tree together with its tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateNode {
    pub expr: Predicate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<IndexAssignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<RelocationDirective>,
}

impl PredicateNode {
    /// Creates an untagged node
    pub fn new(expr: Predicate) -> Self {
        Self {
            expr,
            assignment: None,
            directives: Vec::new(),
        }
    }

    /// Conjunction of `children`
    pub fn and(children: Vec<PredicateNode>) -> Self {
        Self::new(Predicate::And(children))
    }

    /// Disjunction of `children`
    pub fn or(children: Vec<PredicateNode>) -> Self {
        Self::new(Predicate::Or(children))
    }

    /// Negation of `child`
    pub fn not(child: PredicateNode) -> Self {
        Self::new(Predicate::Not(Box::new(child)))
    }

    /// Object `$elemMatch` on the array at `path`
    pub fn elem_match_object(path: impl Into<String>, children: Vec<PredicateNode>) -> Self {
        Self::new(Predicate::ElemMatchObject {
            path: path.into(),
            children,
        })
    }

    /// Value `$elemMatch` on the array at `path`
    pub fn elem_match_value(path: impl Into<String>, children: Vec<PredicateNode>) -> Self {
        Self::new(Predicate::ElemMatchValue {
            path: path.into(),
            children,
        })
    }

    /// Leaf testing `path` with `op`
    pub fn leaf(path: impl Into<String>, op: LeafOp) -> Self {
        Self::new(Predicate::Leaf(LeafPredicate {
            path: path.into(),
            op,
        }))
    }

    /// Equality leaf: `path == value`
    pub fn eq(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(path, LeafOp::Eq(value))
    }

    /// Range leaf: `path < value`
    pub fn lt(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(path, LeafOp::Lt(value))
    }

    /// Range leaf: `path > value`
    pub fn gt(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(path, LeafOp::Gt(value))
    }

    /// Range leaf: `path >= value`
    pub fn gte(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(path, LeafOp::Gte(value))
    }

    /// Presence leaf: `$exists`
    pub fn exists(path: impl Into<String>, exists: bool) -> Self {
        Self::leaf(path, LeafOp::Exists(exists))
    }

    /// Pattern leaf with no flags
    pub fn regex(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::leaf(
            path,
            LeafOp::Regex {
                pattern: pattern.into(),
                flags: String::new(),
            },
        )
    }

    /// Proximity leaf: `$near` around `point`
    pub fn geo_near(path: impl Into<String>, point: Value) -> Self {
        Self::leaf(path, LeafOp::GeoNear(point))
    }

    /// Text search leaf. Text predicates carry no field path of their own.
    pub fn text(search: impl Into<String>) -> Self {
        Self::leaf(
            "",
            LeafOp::Text {
                search: search.into(),
                language: None,
            },
        )
    }

    /// Builder: stamps a final index assignment
    pub fn with_assignment(mut self, assignment: IndexAssignment) -> Self {
        self.assignment = Some(assignment);
        self
    }

    /// Builder: appends a relocation directive
    pub fn with_directive(mut self, directive: RelocationDirective) -> Self {
        self.directives.push(directive);
        self
    }

    /// Decodes a tree from its JSON representation
    pub fn from_json(input: &str) -> LoadResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Kind of this node
    pub fn kind(&self) -> MatchKind {
        match &self.expr {
            Predicate::And(_) => MatchKind::And,
            Predicate::Or(_) => MatchKind::Or,
            Predicate::Not(_) => MatchKind::Not,
            Predicate::ElemMatchObject { .. } => MatchKind::ElemMatchObject,
            Predicate::ElemMatchValue { .. } => MatchKind::ElemMatchValue,
            Predicate::Leaf(leaf) => leaf.op.kind(),
        }
    }

    /// Field path tested by this node. Empty for AND, OR and NOT.
    pub fn path(&self) -> &str {
        match &self.expr {
            Predicate::ElemMatchObject { path, .. } | Predicate::ElemMatchValue { path, .. } => {
                path
            }
            Predicate::Leaf(leaf) => &leaf.path,
            Predicate::And(_) | Predicate::Or(_) | Predicate::Not(_) => "",
        }
    }

    /// Direct children. A NOT has exactly one; a leaf has none.
    pub fn children(&self) -> &[PredicateNode] {
        match &self.expr {
            Predicate::And(children)
            | Predicate::Or(children)
            | Predicate::ElemMatchObject { children, .. }
            | Predicate::ElemMatchValue { children, .. } => children,
            Predicate::Not(child) => std::slice::from_ref(child.as_ref()),
            Predicate::Leaf(_) => &[],
        }
    }

    /// Mutable view of the direct children
    pub fn children_mut(&mut self) -> &mut [PredicateNode] {
        match &mut self.expr {
            Predicate::And(children)
            | Predicate::Or(children)
            | Predicate::ElemMatchObject { children, .. }
            | Predicate::ElemMatchValue { children, .. } => children,
            Predicate::Not(child) => std::slice::from_mut(child.as_mut()),
            Predicate::Leaf(_) => &mut [],
        }
    }

    /// True for an AND node
    pub fn is_and(&self) -> bool {
        matches!(self.expr, Predicate::And(_))
    }

    /// True for an OR node
    pub fn is_or(&self) -> bool {
        matches!(self.expr, Predicate::Or(_))
    }

    /// True for a NOT node
    pub fn is_not(&self) -> bool {
        matches!(self.expr, Predicate::Not(_))
    }

    /// An OR the enumerator has already assigned an index to; the only
    /// valid destination for relocated predicates.
    pub fn is_indexed_or(&self) -> bool {
        self.is_or() && self.assignment.is_some()
    }

    /// True if this node itself carries relocation directives
    pub fn has_directives(&self) -> bool {
        !self.directives.is_empty()
    }

    /// Removes and returns this node's relocation directives
    pub fn take_directives(&mut self) -> Vec<RelocationDirective> {
        std::mem::take(&mut self.directives)
    }

    /// Number of directives still attached anywhere in this subtree
    pub fn pending_directive_count(&self) -> usize {
        self.directives.len()
            + self
                .children()
                .iter()
                .map(PredicateNode::pending_directive_count)
                .sum::<usize>()
    }

    /// Number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(PredicateNode::node_count)
            .sum::<usize>()
    }
}
