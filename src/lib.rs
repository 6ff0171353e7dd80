//! aerodb-tagging - index tag resolution and canonical ordering for
//! aerodb's query planner

pub mod observability;
pub mod planner;
