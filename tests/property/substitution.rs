//! Property-based tests for query text substitution

use proptest::prelude::*;
use reportkit::params::ParameterSet;
use reportkit::query::substitute_parameters;

/// Text without any token delimiter is never changed
#[test]
fn test_text_without_tokens_is_unchanged() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[^@]{0,64}", "[A-Z]{1,6}", "[a-z0-9]{0,8}"),
            |(sql, name, value)| {
                let params = ParameterSet::new()
                    .with(format!("SQL_{}", name), value)
                    .query_parameters();
                assert_eq!(substitute_parameters(&sql, &params), sql);

                Ok(())
            },
        )
        .unwrap();
}

/// Both token spellings are replaced by the value and nothing else moves
#[test]
fn test_tokens_are_replaced_by_value() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[a-z =']{0,20}", "[a-z =']{0,20}", "[A-Z]{1,6}", "[a-z0-9-]{0,10}"),
            |(prefix, suffix, name, value)| {
                let key = format!("SQL_{}", name);
                let params = ParameterSet::new().with(key.clone(), value.clone()).query_parameters();

                let stripped = format!("{}@{}@{}", prefix, name, suffix);
                assert_eq!(
                    substitute_parameters(&stripped, &params),
                    format!("{}{}{}", prefix, value, suffix)
                );

                let full = format!("{}@{}@{}", prefix, key, suffix);
                assert_eq!(
                    substitute_parameters(&full, &params),
                    format!("{}{}{}", prefix, value, suffix)
                );

                Ok(())
            },
        )
        .unwrap();
}
