//! Index tagging passes for the query planner
//!
//! After the index enumerator has chosen a plan, the predicate tree carries
//! two kinds of tags:
//!
//! - an `IndexAssignment` on every predicate an index will serve
//! - `RelocationDirective`s on predicates outside an indexed OR whose
//!   copies belong inside its branches
//!
//! `resolve` performs the relocations and drops predicates the OR then
//! implies. `propagate_tag` and `sort_by_tag` bring the tree into the
//! canonical order plan building relies on. `TagPass` runs all of it with
//! logging and counters.
//!
//! # Ordering (strict)
//!
//! 1. Index ordinal, untagged last
//! 2. Geo-near, then text
//! 3. Compound-index slot
//! 4. Field path
//! 5. Predicate kind

mod ast;
mod canonical;
mod config;
mod errors;
mod explain;
mod indexability;
mod pass;
mod relocate;
mod resolve;
mod tags;

pub use ast::{LeafOp, LeafPredicate, MatchKind, Predicate, PredicateNode};
pub use canonical::{compare, propagate_tag, sort_by_tag};
pub use config::TagPassConfig;
pub use errors::{
    contract_violation, ContractViolation, ContractViolationCode, LoadError, LoadResult,
};
pub use explain::TreeExplain;
pub use indexability::{DefaultIndexability, Indexability};
pub use pass::{PassReport, TagPass};
pub use relocate::{attach, relocate};
pub use resolve::{resolve, resolve_with, RelocationRecord, ResolveStats};
pub use tags::{IndexAssignment, RelocationDirective};
