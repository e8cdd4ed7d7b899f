//! Property-based tests for statechart construction and generation

use chartgen_codegen::CGeneratorContext;
use chartgen_core::{Expression, NodeType, StatechartBuilder};
use proptest::prelude::*;

// Property test strategies
fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Idle", "Busy", "Done", "Error", "Wait"]).prop_map(str::to_owned)
}

prop_compose! {
    fn arb_transitions()(pairs in prop::collection::vec((arb_name(), arb_name()), 1..30))
        -> Vec<Expression>
    {
        pairs
            .into_iter()
            .map(|(src, dest)| Expression::transition(src, dest))
            .collect()
    }
}

prop_compose! {
    fn arb_parallel()(sizes in prop::collection::vec(1usize..4, 1..6)) -> Vec<Vec<Expression>> {
        sizes
            .into_iter()
            .enumerate()
            .map(|(region, count)| {
                (0..count)
                    .map(|i| Expression::state(format!("r{region}_s{i}")))
                    .collect()
            })
            .collect()
    }
}

proptest! {
    #[test]
    fn each_name_yields_exactly_one_state(expressions in arb_transitions()) {
        let chart = StatechartBuilder::new().build(&expressions).unwrap();
        let mut names: Vec<&str> = chart
            .states(chart.root())
            .into_iter()
            .filter_map(|s| chart.name(s))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), total);
        prop_assert_eq!(
            chart.contents_of_type(chart.root(), NodeType::Transition).len(),
            expressions.len()
        );
    }

    #[test]
    fn parallel_regions_are_numbered_in_order(blocks in arb_parallel()) {
        let expected = blocks.len();
        let chart = StatechartBuilder::new()
            .build(&[Expression::parallel("P", blocks)])
            .unwrap();
        let parallel = chart.find("P").unwrap();
        let regions = chart.regions(parallel);
        prop_assert_eq!(regions.len(), expected);
        for (number, region) in regions.into_iter().enumerate() {
            let name = number.to_string();
            prop_assert_eq!(chart.name(region), Some(name.as_str()));
            prop_assert!(!chart.children(region).is_empty());
        }
    }

    #[test]
    fn dump_and_generation_are_deterministic(expressions in arb_transitions()) {
        let first = StatechartBuilder::new().build(&expressions).unwrap();
        let second = StatechartBuilder::new().build(&expressions).unwrap();
        prop_assert_eq!(first.to_string(), second.to_string());

        let a = CGeneratorContext::new(&first, "p");
        let b = CGeneratorContext::new(&second, "p");
        prop_assert_eq!(a.header_text(), b.header_text());
        prop_assert_eq!(a.source_text("p.h"), b.source_text("p.h"));
    }

    #[test]
    fn enum_has_one_member_per_state_plus_sentinel(expressions in arb_transitions()) {
        let chart = StatechartBuilder::new().build(&expressions).unwrap();
        let ctx = CGeneratorContext::new(&chart, "p");
        let states = chart.contents_of_type(chart.root(), NodeType::AnyState).len();
        prop_assert_eq!(ctx.state_enum().members.len(), states + 1);
        prop_assert_eq!(ctx.state_enum().members[0].as_str(), "P_NO_STATE");
    }
}
