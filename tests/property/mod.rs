//! Property-based tests for parameter partitioning and query substitution

mod partition;
mod substitution;
