//! Tree dumps compared against fixed golden text.

use chartgen_core::{Endpoint, Expression, HistoryRef};

use crate::common::*;

fn labeled(src: &str, dest: impl Into<Endpoint>, label: &str) -> Expression {
    Expression::labeled_transition(src, dest, label)
}

fn annotated(name: &str, tag: &str) -> Endpoint {
    Endpoint::Annotated {
        name: name.into(),
        type_tag: tag.into(),
    }
}

#[test]
fn simple_state_dump() {
    let chart = build(simple_state());
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    InitialState:
        Transition -> State1
    State State1:
        Transition -> FinalState
    FinalState"
    );
}

#[test]
fn state_description() {
    let chart = build(vec![
        Expression::transition("[*]", "State1"),
        Expression::transition("State1", "[*]"),
        Expression::transition("State1", "State2"),
        Expression::transition("State2", "[*]"),
        Expression::description("State1", "this is a string"),
        Expression::description("State1", "this is another string"),
    ]);
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    InitialState:
        Transition -> State1
    State State1:
        Label:
            this is a string
            this is another string
        Transition -> FinalState
        Transition -> State2
    State State2:
        Transition -> FinalState
    FinalState"
    );
}

#[test]
fn composite_states_reference_each_other() {
    let chart = build(cross_composite());
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    State A:
        Region 0:
            State X:
                Transition -> B.0.Z
            State Y
    State B:
        Region 0:
            State Z:
                Transition -> A.0.Y"
    );
}

#[test]
fn nested_composites_with_labels() {
    let chart = build(vec![
        Expression::transition("[*]", "NotShooting"),
        Expression::composite(
            "NotShooting",
            vec![
                Expression::transition("[*]", "Idle"),
                labeled("Idle", "Configuring", "EvConfig"),
            ],
        ),
        Expression::composite(
            "Configuring",
            vec![
                Expression::transition("[*]", "NewValueSelection"),
                labeled("NewValueSelection", "NewValuePreview", "EvNewValue"),
                labeled("NewValuePreview", "NewValueSelection", "EvNewValueRejected"),
                labeled("NewValuePreview", "NewValueSelection", "EvNewValueSaved"),
                Expression::composite(
                    "NewValuePreview",
                    vec![Expression::transition("State1", "State2")],
                ),
            ],
        ),
        labeled("Configuring", "Idle", "EvConfig"),
    ]);
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    InitialState:
        Transition -> NotShooting
    State Configuring:
        Transition -> NotShooting.0.Idle:
            Label:
                EvConfig
        Region 0:
            InitialState:
                Transition -> Configuring.0.NewValueSelection
            State NewValuePreview:
                Transition -> Configuring.0.NewValueSelection:
                    Label:
                        EvNewValueRejected
                Transition -> Configuring.0.NewValueSelection:
                    Label:
                        EvNewValueSaved
                Region 0:
                    State State1:
                        Transition -> Configuring.0.NewValuePreview.0.State2
                    State State2
            State NewValueSelection:
                Transition -> Configuring.0.NewValuePreview:
                    Label:
                        EvNewValue
    State NotShooting:
        Region 0:
            InitialState:
                Transition -> NotShooting.0.Idle
            State Idle:
                Transition -> Configuring:
                    Label:
                        EvConfig"
    );
}

#[test]
fn entry_and_exit_points() {
    let chart = build(vec![
        Expression::composite(
            "Somp",
            vec![
                Expression::pseudostate("entry1", "<<entryPoint>>"),
                Expression::pseudostate("entry2", "<<inputPin>>"),
                Expression::state("sin"),
                Expression::transition("entry1", "sin"),
                Expression::transition("entry2", "sin"),
                Expression::transition("sin", "sin2"),
                Expression::transition("sin2", annotated("exitA", "<<exitPoint>>")),
            ],
        ),
        Expression::transition("[*]", "entry1"),
        Expression::transition("exitA", "Foo"),
        Expression::transition("Foo1", "entry2"),
    ]);
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    InitialState:
        Transition -> Somp.0.entry1
    State Foo
    State Foo1:
        Transition -> Somp.0.entry2
    State Somp:
        Region 0:
            EntryPoint entry1:
                Transition -> Somp.0.sin
            EntryPoint entry2:
                Transition -> Somp.0.sin
            ExitPoint exitA:
                Transition -> Foo
            State sin:
                Transition -> Somp.0.sin2
            State sin2:
                Transition -> Somp.0.exitA"
    );
}

#[test]
fn pseudostates() {
    let chart = build(vec![
        Expression::pseudostate("choice1", "<<choice>>"),
        Expression::pseudostate("fork1", "<<fork>>"),
        Expression::pseudostate("join2", "<<join>>"),
        Expression::pseudostate("end3", "<<end>>"),
        labeled("[*]", "choice1", "from start\nto choice"),
        labeled("choice1", "fork1", "from choice\nto fork"),
        labeled("choice1", "join2", "from choice\nto join"),
        labeled("choice1", "end3", "from choice\nto end"),
        labeled("fork1", "State1", "from fork\nto state"),
        labeled("fork1", "State2", "from fork\nto state"),
        labeled("State1", "end3", "from state\nto end"),
        labeled("State2", "join2", "from state\nto join"),
        labeled("join2", "end3", "from join\nto end"),
    ]);
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    InitialState:
        Transition -> choice1:
            Label:
                from start
                to choice
    Choice choice1:
        Transition -> fork1:
            Label:
                from choice
                to fork
        Transition -> join2:
            Label:
                from choice
                to join
        Transition -> FinalState:
            Label:
                from choice
                to end
    Fork fork1:
        Transition -> State1:
            Label:
                from fork
                to state
        Transition -> State2:
            Label:
                from fork
                to state
    Fork join2:
        Transition -> FinalState:
            Label:
                from join
                to end
    State State1:
        Transition -> FinalState:
            Label:
                from state
                to end
    State State2:
        Transition -> join2:
            Label:
                from state
                to join
    FinalState"
    );
}

#[test]
fn choice_declared_after_use() {
    let chart = build(vec![
        Expression::transition("Idle", "ReqId"),
        Expression::transition("ReqId", "c"),
        labeled("c", "MinorId", "[Id <= 10]"),
        labeled("c", "MajorId", "[Id > 10]"),
        Expression::pseudostate("c", "<<choice>>"),
    ]);
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    Choice c:
        Transition -> MinorId:
            Label:
                [Id <= 10]
        Transition -> MajorId:
            Label:
                [Id > 10]
    State Idle:
        Transition -> ReqId
    State MajorId
    State MinorId
    State ReqId:
        Transition -> c"
    );
}

#[test]
fn fork_join() {
    let chart = build(vec![
        Expression::pseudostate("fork_state", "<<fork>>"),
        Expression::transition("[*]", "fork_state"),
        Expression::transition("fork_state", "State2"),
        Expression::transition("fork_state", "State3"),
        Expression::pseudostate("join_state", "<<join>>"),
        Expression::transition("State2", "join_state"),
        Expression::transition("State3", "join_state"),
        Expression::transition("join_state", "State4"),
        Expression::transition("State4", "[*]"),
    ]);
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    InitialState:
        Transition -> fork_state
    Fork fork_state:
        Transition -> State2
        Transition -> State3
    Fork join_state:
        Transition -> State4
    State State2:
        Transition -> join_state
    State State3:
        Transition -> join_state
    State State4:
        Transition -> FinalState
    FinalState"
    );
}

#[test]
fn history_lives_in_the_owner_region() {
    let chart = build(vec![
        Expression::composite(
            "Active",
            vec![
                Expression::transition("[*]", "Running"),
                Expression::transition("Running", "Paused"),
            ],
        ),
        Expression::transition("Active", "Off"),
        Expression::transition("Off", HistoryRef::deep(Some("Active"))),
    ]);
    assert_eq!(
        chart.to_string(),
        "\
Statechart:
    State Active:
        Transition -> Off
        Region 0:
            InitialState:
                Transition -> Active.0.Running
            DeepHistory
            State Paused
            State Running:
                Transition -> Active.0.Paused
    State Off:
        Transition -> Active.0.DeepHistory"
    );
}

#[test]
fn dump_is_stable_across_builds() {
    let first = build(cross_composite()).to_string();
    let second = build(cross_composite()).to_string();
    assert_eq!(first, second);
}
