//! Which predicates an index on their own field can answer

use super::ast::{MatchKind, Predicate, PredicateNode};

/// Oracle consulted by tag propagation.
pub trait Indexability {
    /// True if `node` can be answered by an index on its own field path.
    fn can_use_index_on_own_field(&self, node: &PredicateNode) -> bool;
}

/// Standard indexability rules for document indexes.
///
/// Leaf comparisons, `$regex`, `$mod`, `$exists`, `$in`, `$type`, bit tests
/// and geo predicates are indexable on their own field. A value `$elemMatch`
/// is indexable when each clause is, or is a NOT of something other than
/// `$regex`/`$mod`. Nothing with an empty path is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIndexability;

impl DefaultIndexability {
    fn is_own_field_kind(kind: MatchKind) -> bool {
        matches!(
            kind,
            MatchKind::Lte
                | MatchKind::Lt
                | MatchKind::Eq
                | MatchKind::Gt
                | MatchKind::Gte
                | MatchKind::Regex
                | MatchKind::Mod
                | MatchKind::Exists
                | MatchKind::In
                | MatchKind::Type
                | MatchKind::BitsAllSet
                | MatchKind::BitsAllClear
                | MatchKind::BitsAnySet
                | MatchKind::BitsAnyClear
                | MatchKind::Geo
                | MatchKind::GeoNear
        )
    }

    fn elem_match_value_is_indexable(children: &[PredicateNode]) -> bool {
        children.iter().all(|child| match &child.expr {
            Predicate::Not(inner) => !matches!(inner.kind(), MatchKind::Regex | MatchKind::Mod),
            _ => Self::is_own_field_kind(child.kind()),
        })
    }
}

impl Indexability for DefaultIndexability {
    fn can_use_index_on_own_field(&self, node: &PredicateNode) -> bool {
        if node.path().is_empty() {
            return false;
        }
        match &node.expr {
            Predicate::ElemMatchValue { children, .. } => {
                Self::elem_match_value_is_indexable(children)
            }
            _ => Self::is_own_field_kind(node.kind()),
        }
    }
}
