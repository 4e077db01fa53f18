//! Property-based tests for splitting parameters into report and query sets

use proptest::prelude::*;
use reportkit::params::{is_query_parameter, ParameterSet};
use std::collections::BTreeMap;

/// Every parameter lands in exactly one of the two sets
#[test]
fn test_partition_is_total_and_disjoint() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::btree_map("(sql_|SQL_|Sql_)?[A-Za-z]{1,6}", any::<i64>(), 0..12),
            |entries: BTreeMap<String, i64>| {
                let set: ParameterSet = entries.clone().into_iter().collect();
                let (report, query) = set.partition();

                assert_eq!(report.len() + query.len(), entries.len());
                for key in report.keys() {
                    assert!(!is_query_parameter(key));
                    assert!(entries.contains_key(key));
                }
                for param in &query {
                    assert!(is_query_parameter(&param.key));
                    assert!(!report.contains_key(&param.key));
                    assert_eq!(param.name, param.key[4..]);
                }

                Ok(())
            },
        )
        .unwrap();
}

/// Query parameters come out sorted by key
#[test]
fn test_query_parameters_are_ordered() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(("SQL_[A-Z]{1,6}", "[a-z0-9]{0,8}"), 0..10),
            |pairs: Vec<(String, String)>| {
                let set: ParameterSet = pairs.into_iter().collect();
                let keys: Vec<String> = set.query_parameters().into_iter().map(|p| p.key).collect();

                let mut sorted = keys.clone();
                sorted.sort();
                assert_eq!(keys, sorted);

                Ok(())
            },
        )
        .unwrap();
}
