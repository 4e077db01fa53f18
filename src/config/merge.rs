//! Merge policy for layered configuration sources.

pub(crate) mod merge_policy;
