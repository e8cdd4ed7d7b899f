//! End-to-end scenarios through the public API.

use chartgen::prelude::*;
use chartgen_codegen::CGeneratorContext;
use chartgen_core::{BuildError, HistoryRef, ModelError, NodeKind, StateKind};

use crate::common::*;

#[test]
fn scenario_initial_state_final() {
    let chart = build(simple_state());
    let root = chart.root();

    assert_eq!(chart.states(root).len(), 3);
    assert_eq!(chart.contents_of_type(root, NodeType::Transition).len(), 2);

    let initial = chart.initial_state(root).unwrap();
    let final_state = chart.final_state(root).unwrap();
    let &[to_state1] = chart.transitions(initial).as_slice() else {
        panic!("initial state should have exactly one transition");
    };
    let state1 = chart.destination(to_state1).unwrap();
    assert_eq!(chart.name(state1), Some("State1"));

    let siblings = chart.siblings(state1);
    assert!(siblings.contains(&initial));
    assert!(siblings.contains(&final_state));

    let &[to_final] = chart.transitions(state1).as_slice() else {
        panic!("State1 should have exactly one transition");
    };
    assert_eq!(chart.destination(to_final), Some(final_state));
    assert_eq!(chart.source(to_final), Some(state1));
}

#[test]
fn scenario_cross_composite_references() {
    let chart = build(cross_composite());
    let transitions = chart.contents_of_type(chart.root(), NodeType::Transition);
    assert_eq!(transitions.len(), 2);

    for transition in transitions {
        let source = chart.source(transition).unwrap();
        let destination = chart.destination(transition).unwrap();
        let owner = |s| chart.parent_of_type(s, NodeType::AnyState);
        assert_ne!(owner(source), owner(destination));
    }
    let x = chart.find("A.0.X").unwrap();
    let z = chart.find("B.0.Z").unwrap();
    assert_eq!(chart.destination(chart.transitions(x)[0]), Some(z));
    let y = chart.find("A.0.Y").unwrap();
    assert_eq!(chart.destination(chart.transitions(z)[0]), Some(y));
    assert_eq!(chart.regions(chart.find("B").unwrap()).len(), 1);
}

#[test]
fn scenario_parallel_regions() {
    let chart = build(parallel_three());
    let parallel = chart.find("P").unwrap();
    let regions = chart.regions(parallel);
    assert_eq!(regions.len(), 3);

    for (number, region) in regions.into_iter().enumerate() {
        assert_eq!(chart.kind(region), &NodeKind::Region { number });
        assert_eq!(chart.name(region), Some(number.to_string().as_str()));
        assert_eq!(chart.states(region).len(), 3);
        assert!(chart.initial_state(region).is_some());
        assert_eq!(
            chart.contents_of_type(region, NodeType::Transition).len(),
            1
        );
    }
}

#[test]
fn scenario_generated_enum_and_dispatch() {
    let chart = build(simple_state());
    let ctx = CGeneratorContext::new(&chart, "s");
    assert_eq!(ctx.state_enum().members.len(), 4);
    assert_eq!(ctx.run_cycle().body.len(), 1);
    assert_eq!(ctx.source_text("s.h").matches("case ").count(), 3);
}

#[test]
fn lexical_scope_keeps_nested_names_local() {
    setup_tracing();
    let diagram = Diagram::new(vec![
        Expression::composite("A", vec![Expression::transition("[*]", "Idle")]),
        Expression::composite("B", vec![Expression::transition("[*]", "Idle")]),
    ]);
    let lexical = diagram
        .transform_with(BuilderConfig {
            symbol_scope: SymbolScope::Lexical,
        })
        .unwrap();
    assert!(lexical.find("A.0.Idle").is_some());
    assert!(lexical.find("B.0.Idle").is_some());

    let global = diagram.transform().unwrap();
    assert!(global.find("A.0.Idle").is_some());
    assert!(global.find("B.0.Idle").is_none());
}

#[test]
fn lookup_or_create_is_idempotent() {
    let chart = build(vec![
        Expression::transition("A", "B"),
        Expression::transition("B", "A"),
        Expression::transition("A", "A"),
        Expression::description("B", "waiting"),
    ]);
    let root = chart.root();
    assert_eq!(chart.states(root).len(), 2);
    let a = chart.find("A").unwrap();
    assert_eq!(chart.transitions(a).len(), 2);
    assert_eq!(chart.label(chart.find("B").unwrap()), Some("waiting"));
}

#[test]
fn initial_and_final_creation_is_idempotent() {
    let mut chart = Statechart::new();
    let root = chart.root();
    let first = chart.create_initial_state(root).unwrap();
    assert_eq!(chart.create_initial_state(root).unwrap(), first);
    let last = chart.create_final_state(root).unwrap();
    assert_eq!(chart.create_final_state(root).unwrap(), last);
    assert_eq!(chart.children(root).len(), 2);

    let state = chart.create_state(StateKind::Simple, "S");
    chart.add_child(root, state).unwrap();
    assert_eq!(
        chart.create_initial_state(state),
        Err(ModelError::NotAContainer(state))
    );
}

#[test]
fn resolution_errors_abort_the_build() {
    setup_tracing();
    let unknown_tag = Diagram::new(vec![Expression::pseudostate("x", "<<sdlreceive>>")]);
    let err = unknown_tag.transform().unwrap_err();
    assert!(err.is_resolution());

    let ambiguous = Diagram::new(vec![
        Expression::parallel(
            "P",
            vec![vec![Expression::state("a")], vec![Expression::state("b")]],
        ),
        Expression::transition("X", HistoryRef::shallow(Some("P"))),
    ]);
    assert_eq!(
        ambiguous.transform().unwrap_err(),
        BuildError::AmbiguousHistory {
            state: "P".into(),
            regions: 2,
        }
    );
}

#[test]
fn unsupported_expressions_do_not_stop_the_build() {
    let chart = build(vec![
        Expression::directive("skinparam", "monochrome true"),
        Expression::Unsupported {
            kind: "NoteExpression".into(),
        },
        Expression::transition("[*]", "Ready"),
    ]);
    assert!(chart.find("Ready").is_some());
}

#[test]
fn diagram_from_json_compiles() -> anyhow::Result<()> {
    setup_tracing();
    let json = r#"{
        "expressions": [
            {"Transition": {"source": "Marker", "destination": {"Named": "Idle"}, "label": null}},
            {"Transition": {"source": {"Named": "Idle"}, "destination": "Marker", "label": "done"}}
        ]
    }"#;
    let diagram = Diagram::from_json(json)?;
    let dir = tempfile::tempdir()?;
    let files = chartgen::compile(&diagram, &OutputConfig::new(dir.path(), "json"))?;

    let header = std::fs::read_to_string(files.header_path)?;
    assert!(header.contains("JSON_IDLE"));
    assert!(header.contains(" *         Transition -> FinalState:"));
    Ok(())
}

#[test]
fn compile_with_custom_prefix() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let generator = CGenerator::with_options(CGeneratorOptions {
        prefix: Some("fsm".into()),
    });
    let files = chartgen::compile_with(
        &Diagram::new(simple_state()),
        BuilderConfig::default(),
        &generator,
        &OutputConfig::new(dir.path(), "door"),
    )?;
    let source = std::fs::read_to_string(&files.source_path)?;
    assert!(source.starts_with("#include \"door.h\""));
    assert!(source.contains("void fsm_run_cycle(struct fsm_context *ctx) {"));
    Ok(())
}
