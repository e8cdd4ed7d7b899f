//! Integration and property tests for chartgen
//!
//! Golden tree dumps, end-to-end scenarios and generated C text live here so
//! the library crates stay free of test-only dependencies.

#![cfg(test)]

pub mod golden;
pub mod integration;
pub mod property_tests;

/// Common test utilities and fixtures
pub mod common {
    use chartgen_core::{Expression, Statechart, StatechartBuilder};

    /// Setup tracing for tests
    pub fn setup_tracing() {
        use tracing_subscriber::{EnvFilter, fmt};

        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Builds with the default configuration, logging along the way.
    pub fn build(expressions: Vec<Expression>) -> Statechart {
        setup_tracing();
        StatechartBuilder::new()
            .build(&expressions)
            .expect("diagram should transform")
    }

    /// `[*] -> State1`, `State1 -> [*]`
    pub fn simple_state() -> Vec<Expression> {
        vec![
            Expression::transition("[*]", "State1"),
            Expression::transition("State1", "[*]"),
        ]
    }

    /// Two sibling composites with transitions into each other's region.
    pub fn cross_composite() -> Vec<Expression> {
        vec![
            Expression::composite("B", vec![Expression::state("Z")]),
            Expression::composite(
                "A",
                vec![Expression::state("Y"), Expression::transition("X", "Z")],
            ),
            Expression::transition("Z", "Y"),
        ]
    }

    /// Three regions, each `[*] -> a` plus a second state `b`.
    pub fn parallel_three() -> Vec<Expression> {
        let region = |a: &str, b: &str| {
            vec![Expression::transition("[*]", a), Expression::state(b)]
        };
        vec![Expression::parallel(
            "P",
            vec![
                region("a0", "b0"),
                region("a1", "b1"),
                region("a2", "b2"),
            ],
        )]
    }
}
