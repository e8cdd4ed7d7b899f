//! Transformation of a flat expression list into a hierarchical statechart.
//!
//! The builder walks expressions in source order with one cursor, the
//! *active container*, and a symbol table from plain names to states. Names
//! may be used before they are declared: the first use creates a plain state
//! where it appears, and a later composite, parallel or pseudostate
//! declaration promotes that node in place so no name ever yields two nodes.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, error};

use crate::error::BuildError;
use crate::expr::{
    Diagram, Endpoint, Expression, HistoryRef, StateAlias, StateDeclaration, StateDescription,
    StateType, TransitionExpr,
};
use crate::model::{NodeId, NodeType, StateKind, Statechart};
use crate::pseudostate::PseudostateType;

/// How state names are looked up while building.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SymbolScope {
    /// One flat table for the whole diagram. A name declared inside two
    /// different composites binds to the first node; the second declaration
    /// is a no-op.
    #[default]
    Global,
    /// Declarations bind in the active container. References search the
    /// active container, then the enclosing containers outwards, and create
    /// the state in the active container when nothing matches. A later
    /// declaration in an enclosing container takes over such states.
    Lexical,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderConfig {
    pub symbol_scope: SymbolScope,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum EndpointRole {
    Source,
    Destination,
}

type SymbolKey = (Option<NodeId>, String);

#[derive(Debug, Default)]
struct SymbolTable {
    scope: SymbolScope,
    entries: HashMap<SymbolKey, NodeId>,
    /// States created by a reference and not declared since.
    pending: BTreeSet<NodeId>,
}

impl SymbolTable {
    fn new(scope: SymbolScope) -> Self {
        Self {
            scope,
            entries: HashMap::new(),
            pending: BTreeSet::new(),
        }
    }

    fn key(&self, container: NodeId, name: &str) -> SymbolKey {
        match self.scope {
            SymbolScope::Global => (None, name.to_owned()),
            SymbolScope::Lexical => (Some(container), name.to_owned()),
        }
    }

    /// Binding visible to a declaration made in `container`.
    fn declared(&self, container: NodeId, name: &str) -> Option<NodeId> {
        self.entries.get(&self.key(container, name)).copied()
    }

    /// Binding visible to a reference made in `container`.
    fn resolve(&self, chart: &Statechart, container: NodeId, name: &str) -> Option<NodeId> {
        match self.scope {
            SymbolScope::Global => self.declared(container, name),
            SymbolScope::Lexical => {
                let mut current = Some(container);
                while let Some(scope) = current {
                    if let Some(id) = self.declared(scope, name) {
                        return Some(id);
                    }
                    current = chart.parent_of_type(scope, NodeType::Container);
                }
                None
            }
        }
    }

    fn bind(&mut self, container: NodeId, name: &str, id: NodeId) {
        let key = self.key(container, name);
        self.entries.insert(key, id);
    }

    fn forget(&mut self, id: NodeId) {
        self.entries.retain(|_, bound| *bound != id);
        self.pending.remove(&id);
    }

    fn mark_pending(&mut self, id: NodeId) {
        self.pending.insert(id);
    }

    fn settle(&mut self, id: NodeId) {
        self.pending.remove(&id);
    }

    /// Undeclared states called `name` somewhere below `container`, oldest
    /// first.
    fn pending_below(&self, chart: &Statechart, container: NodeId, name: &str) -> Vec<NodeId> {
        self.pending
            .iter()
            .copied()
            .filter(|id| !chart.is_discarded(*id) && chart.name(*id) == Some(name))
            .filter(|id| {
                std::iter::successors(chart.parent_of_type(*id, NodeType::Container), |c| {
                    chart.parent_of_type(*c, NodeType::Container)
                })
                .any(|c| c == container)
            })
            .collect()
    }
}

/// Single-use builder: [`StatechartBuilder::build`] consumes it.
#[derive(Debug)]
pub struct StatechartBuilder {
    statechart: Statechart,
    active: NodeId,
    symbols: SymbolTable,
}

impl Default for StatechartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatechartBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: BuilderConfig) -> Self {
        let statechart = Statechart::new();
        let active = statechart.root();
        Self {
            statechart,
            active,
            symbols: SymbolTable::new(config.symbol_scope),
        }
    }

    /// Consumes every expression, prunes empty regions and hands back the
    /// finished statechart.
    ///
    /// # Errors
    /// The first fatal [`BuildError`]; the partially built tree is dropped.
    pub fn build(mut self, expressions: &[Expression]) -> Result<Statechart, BuildError> {
        self.consume_all(expressions)?;
        self.prune_empty_regions()?;
        debug!(
            nodes = self.statechart.node_count(),
            "statechart transformation finished"
        );
        Ok(self.statechart)
    }

    /// # Errors
    /// See [`StatechartBuilder::build`].
    pub fn consume_diagram(self, diagram: &Diagram) -> Result<Statechart, BuildError> {
        self.build(&diagram.expressions)
    }

    fn consume_all(&mut self, expressions: &[Expression]) -> Result<(), BuildError> {
        expressions.iter().try_for_each(|e| self.consume(e))
    }

    /// Runs `expressions` with `container` as the active container and
    /// restores the previous one afterwards.
    fn consume_in(
        &mut self,
        container: NodeId,
        expressions: &[Expression],
    ) -> Result<(), BuildError> {
        let previous = std::mem::replace(&mut self.active, container);
        let result = self.consume_all(expressions);
        self.active = previous;
        result
    }

    fn consume(&mut self, expression: &Expression) -> Result<(), BuildError> {
        debug!(kind = expression.kind_name(), "consuming expression");
        let result = match expression {
            Expression::Transition(transition) => self.consume_transition(transition),
            Expression::StateDeclaration(declaration) => self.consume_declaration(declaration),
            Expression::StateDescription(description) => self.consume_description(description),
            Expression::StateAlias(alias) => self.consume_alias(alias),
            Expression::Directive(directive) => {
                debug!(keyword = %directive.keyword, "ignoring cosmetic directive");
                Ok(())
            }
            Expression::Unsupported { kind } => {
                error!(kind = %kind, "no consumer for expression, skipping it");
                Ok(())
            }
        };
        result.inspect_err(|err| {
            error!(kind = expression.kind_name(), error = %err, "failed to consume expression");
        })
    }

    fn consume_transition(&mut self, transition: &TransitionExpr) -> Result<(), BuildError> {
        let source = self.resolve_endpoint(&transition.source, EndpointRole::Source)?;
        let destination =
            self.resolve_endpoint(&transition.destination, EndpointRole::Destination)?;
        let edge = self.statechart.add_transition(source, destination)?;
        if let Some(label) = &transition.label {
            self.statechart.append_label_line(edge, label)?;
        }
        Ok(())
    }

    fn consume_description(&mut self, description: &StateDescription) -> Result<(), BuildError> {
        let state = self.lookup_or_create(&description.state)?;
        self.statechart
            .append_label_line(state, &description.description)?;
        Ok(())
    }

    fn consume_alias(&mut self, alias: &StateAlias) -> Result<(), BuildError> {
        self.ensure_declared(&alias.short_name)?;
        debug!(short = %alias.short_name, long = %alias.long_name, "registered state alias");
        Ok(())
    }

    fn consume_declaration(&mut self, declaration: &StateDeclaration) -> Result<(), BuildError> {
        let name = declaration.name.as_str();
        match &declaration.state_type {
            None => {
                self.ensure_declared(name)?;
            }
            Some(StateType::Composite(expressions)) => {
                let state = self.declare_composite(name)?;
                let region = self.statechart.add_region(state)?;
                self.consume_in(region, expressions)?;
            }
            Some(StateType::Parallel(blocks)) => {
                let state = self.declare_composite(name)?;
                for block in blocks {
                    let region = self.statechart.add_region(state)?;
                    self.consume_in(region, block)?;
                }
            }
            Some(StateType::PseudoState(tag)) => {
                self.materialize_pseudostate(name, tag)?;
            }
        }
        Ok(())
    }

    fn resolve_endpoint(
        &mut self,
        endpoint: &Endpoint,
        role: EndpointRole,
    ) -> Result<NodeId, BuildError> {
        match endpoint {
            Endpoint::Marker => Ok(match role {
                EndpointRole::Source => self.statechart.create_initial_state(self.active)?,
                EndpointRole::Destination => self.statechart.create_final_state(self.active)?,
            }),
            Endpoint::Named(name) => self.lookup_or_create(name),
            Endpoint::Annotated { name, type_tag } => self.materialize_pseudostate(name, type_tag),
            Endpoint::History(history) => self.resolve_history(history),
        }
    }

    fn create_in_active(&mut self, kind: StateKind, name: &str) -> Result<NodeId, BuildError> {
        let state = self.statechart.create_state(kind, name);
        self.statechart.add_child(self.active, state)?;
        self.symbols.bind(self.active, name, state);
        debug!(fqn = %self.statechart.fully_qualified_name(state), kind = kind.kind_name(), "created state");
        Ok(state)
    }

    fn lookup_or_create(&mut self, name: &str) -> Result<NodeId, BuildError> {
        match self.symbols.resolve(&self.statechart, self.active, name) {
            Some(state) => Ok(state),
            None => {
                let state = self.create_in_active(StateKind::Simple, name)?;
                self.symbols.mark_pending(state);
                Ok(state)
            }
        }
    }

    fn ensure_declared(&mut self, name: &str) -> Result<NodeId, BuildError> {
        match self.claim(name)? {
            Some(state) => Ok(state),
            None => self.create_in_active(StateKind::Simple, name),
        }
    }

    /// The state a declaration of `name` in the active container stands for.
    ///
    /// Under lexical scope a reference made further in, before anything
    /// enclosing declared the name, belongs to this declaration. Such states
    /// are moved up into the active container and merged into one.
    fn claim(&mut self, name: &str) -> Result<Option<NodeId>, BuildError> {
        if let Some(state) = self.symbols.declared(self.active, name) {
            self.symbols.settle(state);
            return Ok(Some(state));
        }
        if self.symbols.scope != SymbolScope::Lexical {
            return Ok(None);
        }
        let pending = self
            .symbols
            .pending_below(&self.statechart, self.active, name);
        let Some((&adopted, rest)) = pending.split_first() else {
            return Ok(None);
        };
        for &other in rest {
            self.promote_into(other, adopted)?;
        }
        debug!(
            from = %self.statechart.fully_qualified_name(adopted),
            "adopting nested forward reference"
        );
        self.statechart.detach(adopted)?;
        self.statechart.add_child(self.active, adopted)?;
        self.symbols.forget(adopted);
        self.symbols.bind(self.active, name, adopted);
        Ok(Some(adopted))
    }

    /// InitialState, FinalState and history states are shared per container,
    /// so a name bound to one of them is only ever rebound, never promoted.
    fn is_shared_pseudostate(&self, state: NodeId) -> bool {
        self.statechart
            .state_kind(state)
            .and_then(StateKind::fixed_name)
            .is_some()
    }

    /// Moves children and incoming transitions of `old` onto `new` and drops
    /// `old`.
    fn promote_into(&mut self, old: NodeId, new: NodeId) -> Result<(), BuildError> {
        debug!(
            from = %self.statechart.fully_qualified_name(old),
            to = %self.statechart.fully_qualified_name(new),
            "promoting forward reference"
        );
        self.statechart.move_children(old, new)?;
        self.statechart.retarget(old, new);
        self.statechart.discard(old)?;
        self.symbols.forget(old);
        Ok(())
    }

    /// Finds or creates the state that a composite or parallel declaration
    /// refers to, re-parenting a forward reference under the active container.
    fn declare_composite(&mut self, name: &str) -> Result<NodeId, BuildError> {
        let Some(existing) = self.claim(name)? else {
            return self.create_in_active(StateKind::Simple, name);
        };
        if self.statechart.state_kind(existing) != Some(StateKind::Simple) {
            let state = self.statechart.create_state(StateKind::Simple, name);
            self.statechart.add_child(self.active, state)?;
            if self.is_shared_pseudostate(existing) {
                debug!(name, "rebinding name held by a shared pseudostate");
            } else {
                self.promote_into(existing, state)?;
            }
            self.symbols.bind(self.active, name, state);
            return Ok(state);
        }
        if self.statechart.parent(existing) != Some(self.active) {
            debug!(name, "moving forward-referenced state to its declaration");
            self.statechart.detach(existing)?;
            self.statechart.add_child(self.active, existing)?;
            self.symbols.forget(existing);
            self.symbols.bind(self.active, name, existing);
        }
        Ok(existing)
    }

    fn materialize_pseudostate(&mut self, name: &str, tag: &str) -> Result<NodeId, BuildError> {
        let pseudostate: PseudostateType = tag.parse()?;
        let existing = self.claim(name)?;
        let target = match pseudostate {
            PseudostateType::End => self.statechart.create_final_state(self.active)?,
            other => {
                let kind = other.state_kind();
                match existing {
                    Some(state) if self.statechart.state_kind(state) == Some(kind) => {
                        return Ok(state);
                    }
                    _ => {
                        let state = self.statechart.create_state(kind, name);
                        self.statechart.add_child(self.active, state)?;
                        state
                    }
                }
            }
        };
        if let Some(old) =
            existing.filter(|old| *old != target && !self.is_shared_pseudostate(*old))
        {
            self.promote_into(old, target)?;
        }
        self.symbols.bind(self.active, name, target);
        Ok(target)
    }

    fn resolve_history(&mut self, history: &HistoryRef) -> Result<NodeId, BuildError> {
        let container = match &history.owner {
            None => self.active,
            Some(owner) => {
                let state = self
                    .symbols
                    .resolve(&self.statechart, self.active, owner)
                    .ok_or_else(|| BuildError::UnknownHistoryOwner(owner.clone()))?;
                match self.statechart.regions(state).as_slice() {
                    [] => return Err(BuildError::HistoryWithoutRegion(owner.clone())),
                    [region] => *region,
                    regions => {
                        return Err(BuildError::AmbiguousHistory {
                            state: owner.clone(),
                            regions: regions.len(),
                        });
                    }
                }
            }
        };
        Ok(self
            .statechart
            .create_history_state(container, history.deep)?)
    }

    fn prune_empty_regions(&mut self) -> Result<(), BuildError> {
        let root = self.statechart.root();
        for region in self.statechart.contents_of_type(root, NodeType::Region) {
            if self.statechart.children(region).is_empty() {
                debug!(region = %self.statechart.fully_qualified_name(region), "pruning empty region");
                self.statechart.discard(region)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::NodeKind;

    fn build(expressions: Vec<Expression>) -> Statechart {
        StatechartBuilder::new().build(&expressions).unwrap()
    }

    #[test]
    fn undeclared_names_resolve_to_one_state() {
        let chart = build(vec![
            Expression::transition("A", "B"),
            Expression::transition("B", "A"),
            Expression::transition("A", "A"),
        ]);
        let root = chart.root();
        assert_eq!(chart.states(root).len(), 2);
        let a = chart.find("A").unwrap();
        assert_eq!(chart.transitions(a).len(), 2);
    }

    #[test]
    fn marker_creates_initial_as_source_and_final_as_destination() {
        let chart = build(vec![
            Expression::transition("[*]", "A"),
            Expression::transition("A", "[*]"),
        ]);
        let root = chart.root();
        let initial = chart.initial_state(root).unwrap();
        let final_state = chart.final_state(root).unwrap();
        let a = chart.find("A").unwrap();
        assert_eq!(chart.destination(chart.transitions(initial)[0]), Some(a));
        assert_eq!(chart.destination(chart.transitions(a)[0]), Some(final_state));
    }

    #[test]
    fn forward_reference_moves_into_composite_declaration() {
        let chart = build(vec![
            Expression::composite(
                "Outer",
                vec![Expression::transition("Inner", "Target")],
            ),
            Expression::composite("Target", vec![Expression::state("Leaf")]),
        ]);
        let target = chart.find("Target").unwrap();
        assert_eq!(chart.parent(target), Some(chart.root()));
        assert_eq!(chart.regions(target).len(), 1);

        let inner = chart.find("Outer.0.Inner").unwrap();
        assert_eq!(chart.destination(chart.transitions(inner)[0]), Some(target));
        assert!(chart.find("Outer.0.Target").is_none());
    }

    #[test]
    fn pseudostate_declaration_takes_over_plain_state() {
        let chart = build(vec![
            Expression::transition("[*]", "c"),
            Expression::labeled_transition("c", "A", "[x > 1]"),
            Expression::pseudostate("c", "<<choice>>"),
        ]);
        let c = chart.find("c").unwrap();
        assert_eq!(chart.state_kind(c), Some(StateKind::Choice));
        assert_eq!(chart.transitions(c).len(), 1);

        let initial = chart.initial_state(chart.root()).unwrap();
        assert_eq!(chart.destination(chart.transitions(initial)[0]), Some(c));
        assert_eq!(
            chart
                .contents_of_type(chart.root(), NodeType::AnyState)
                .iter()
                .filter(|s| chart.name(**s) == Some("c"))
                .count(),
            1
        );
    }

    #[test]
    fn end_binds_name_to_final_state() {
        let chart = build(vec![
            Expression::transition("A", "stop"),
            Expression::pseudostate("stop", "<<end>>"),
            Expression::transition("B", "stop"),
        ]);
        let root = chart.root();
        let final_state = chart.final_state(root).unwrap();
        for name in ["A", "B"] {
            let state = chart.find(name).unwrap();
            assert_eq!(chart.destination(chart.transitions(state)[0]), Some(final_state));
        }
        assert!(chart.find("stop").is_none());
    }

    #[test]
    fn end_name_redeclared_as_composite_keeps_final_state() {
        let chart = build(vec![
            Expression::transition("A", "[*]"),
            Expression::pseudostate("stop", "<<end>>"),
            Expression::composite("stop", vec![Expression::state("S")]),
        ]);
        let root = chart.root();
        let final_state = chart.final_state(root).unwrap();
        assert!(!chart.is_discarded(final_state));
        assert_eq!(chart.state_kind(final_state), Some(StateKind::Final));

        let a = chart.find("A").unwrap();
        assert_eq!(chart.destination(chart.transitions(a)[0]), Some(final_state));

        let stop = chart.find("stop").unwrap();
        assert_eq!(chart.state_kind(stop), Some(StateKind::Simple));
        assert_eq!(chart.parent(stop), Some(root));
        assert_eq!(chart.regions(stop).len(), 1);
        assert!(chart.find("stop.0.S").is_some());
    }

    #[test]
    fn end_name_redeclared_as_choice_keeps_final_state() {
        let chart = build(vec![
            Expression::transition("A", "[*]"),
            Expression::pseudostate("stop", "<<end>>"),
            Expression::pseudostate("stop", "<<choice>>"),
            Expression::transition("B", "stop"),
        ]);
        let final_state = chart.final_state(chart.root()).unwrap();
        assert!(!chart.is_discarded(final_state));
        let a = chart.find("A").unwrap();
        assert_eq!(chart.destination(chart.transitions(a)[0]), Some(final_state));

        let stop = chart.find("stop").unwrap();
        assert_eq!(chart.state_kind(stop), Some(StateKind::Choice));
        let b = chart.find("B").unwrap();
        assert_eq!(chart.destination(chart.transitions(b)[0]), Some(stop));
    }

    #[test]
    fn inline_annotation_creates_pseudostate_in_active_container() {
        let chart = build(vec![Expression::composite(
            "Somp",
            vec![Expression::Transition(TransitionExpr {
                source: Endpoint::Annotated {
                    name: "entry1".into(),
                    type_tag: "<<entryPoint>>".into(),
                },
                destination: "sin".into(),
                label: None,
            })],
        )]);
        let entry = chart.find("Somp.0.entry1").unwrap();
        assert_eq!(chart.state_kind(entry), Some(StateKind::EntryPoint));
    }

    #[test]
    fn unknown_pseudostate_aborts_the_build() {
        let err = StatechartBuilder::new()
            .build(&[Expression::pseudostate("x", "<<bogus>>")])
            .unwrap_err();
        assert_eq!(err, BuildError::UnknownPseudostate("<<bogus>>".into()));
    }

    #[test]
    fn parallel_regions_are_numbered_in_declaration_order() {
        let chart = build(vec![Expression::parallel(
            "P",
            vec![
                vec![Expression::state("a")],
                vec![Expression::state("b")],
            ],
        )]);
        let p = chart.find("P").unwrap();
        let names: Vec<_> = chart
            .regions(p)
            .into_iter()
            .map(|r| chart.name(r).unwrap().to_owned())
            .collect();
        assert_eq!(names, ["0", "1"]);
        assert!(chart.find("P.1.b").is_some());
    }

    #[test]
    fn empty_regions_are_pruned() {
        let chart = build(vec![
            Expression::state("Shared"),
            Expression::composite("Empty", vec![Expression::state("Shared")]),
        ]);
        let empty = chart.find("Empty").unwrap();
        assert!(chart.is_leaf(empty));
        assert!(chart.contents_of_type(chart.root(), NodeType::Region).is_empty());
    }

    #[test]
    fn history_resolves_to_single_region() {
        let chart = build(vec![
            Expression::composite("A", vec![Expression::state("X")]),
            Expression::transition("B", HistoryRef::deep(Some("A"))),
            Expression::composite("C", vec![Expression::transition("Y", HistoryRef::shallow(None))]),
        ]);
        let deep = chart.find("A.0.DeepHistory").unwrap();
        assert_eq!(
            chart.kind(deep),
            &NodeKind::State(StateKind::History { deep: true })
        );
        assert!(chart.find("C.0.History").is_some());
    }

    #[test]
    fn history_into_parallel_state_is_ambiguous() {
        let err = StatechartBuilder::new()
            .build(&[
                Expression::parallel(
                    "P",
                    vec![vec![Expression::state("a")], vec![Expression::state("b")]],
                ),
                Expression::transition("X", HistoryRef::shallow(Some("P"))),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::AmbiguousHistory {
                state: "P".into(),
                regions: 2
            }
        );
        assert!(!err.is_resolution());
    }

    #[test]
    fn history_of_unknown_or_flat_state_is_rejected() {
        let unknown = StatechartBuilder::new()
            .build(&[Expression::transition("X", HistoryRef::shallow(Some("Nope")))])
            .unwrap_err();
        assert_eq!(unknown, BuildError::UnknownHistoryOwner("Nope".into()));

        let flat = StatechartBuilder::new()
            .build(&[
                Expression::state("Flat"),
                Expression::transition("X", HistoryRef::shallow(Some("Flat"))),
            ])
            .unwrap_err();
        assert_eq!(flat, BuildError::HistoryWithoutRegion("Flat".into()));
    }

    #[test]
    fn self_nesting_declaration_is_a_structural_error() {
        let err = StatechartBuilder::new()
            .build(&[Expression::composite(
                "A",
                vec![Expression::composite("A", vec![Expression::state("B")])],
            )])
            .unwrap_err();
        assert!(matches!(err, BuildError::Model(ModelError::WouldCycle(_))));
    }

    #[test]
    fn cosmetic_and_unsupported_expressions_are_skipped() {
        let chart = build(vec![
            Expression::directive("scale", "600 width"),
            Expression::Unsupported {
                kind: "NoteExpression".into(),
            },
            Expression::state("A"),
        ]);
        assert_eq!(chart.states(chart.root()).len(), 1);
    }

    #[test]
    fn descriptions_and_aliases() {
        let chart = build(vec![
            Expression::alias("L", "Long display name"),
            Expression::description("L", "first"),
            Expression::description("L", "second"),
        ]);
        let l = chart.find("L").unwrap();
        assert_eq!(chart.label(l), Some("first\nsecond"));
    }

    #[test]
    fn global_scope_shares_names_across_composites() {
        let chart = build(vec![
            Expression::composite("A", vec![Expression::state("Idle")]),
            Expression::composite("B", vec![Expression::transition("Idle", "Busy")]),
        ]);
        let idle = chart.find("A.0.Idle").unwrap();
        assert_eq!(chart.transitions(idle).len(), 1);
        assert!(chart.find("B.0.Idle").is_none());
        assert!(chart.find("B.0.Busy").is_some());
    }

    #[test]
    fn lexical_scope_keeps_same_names_apart() {
        let config = BuilderConfig {
            symbol_scope: SymbolScope::Lexical,
        };
        let chart = StatechartBuilder::with_config(config)
            .build(&[
                Expression::state("Top"),
                Expression::composite("A", vec![Expression::state("Idle")]),
                Expression::composite(
                    "B",
                    vec![
                        Expression::state("Idle"),
                        Expression::transition("Idle", "Top"),
                    ],
                ),
            ])
            .unwrap();
        let a_idle = chart.find("A.0.Idle").unwrap();
        let b_idle = chart.find("B.0.Idle").unwrap();
        assert_ne!(a_idle, b_idle);
        assert!(chart.transitions(a_idle).is_empty());

        let top = chart.find("Top").unwrap();
        assert_eq!(chart.destination(chart.transitions(b_idle)[0]), Some(top));
    }

    #[test]
    fn parallel_declaration_moves_nested_forward_reference() {
        let chart = build(vec![
            Expression::composite("Outer", vec![Expression::transition("X", "P")]),
            Expression::parallel(
                "P",
                vec![vec![Expression::state("a")], vec![Expression::state("b")]],
            ),
        ]);
        let root = chart.root();
        let p = chart.find("P").unwrap();
        assert_eq!(chart.parent(p), Some(root));
        assert_eq!(chart.regions(p).len(), 2);
        assert!(chart.find("P.0.a").is_some());
        assert!(chart.find("P.1.b").is_some());
        assert!(chart.find("Outer.0.P").is_none());

        let x = chart.find("Outer.0.X").unwrap();
        assert_eq!(chart.destination(chart.transitions(x)[0]), Some(p));
        assert_eq!(
            chart
                .contents_of_type(root, NodeType::AnyState)
                .iter()
                .filter(|s| chart.name(**s) == Some("P"))
                .count(),
            1
        );
    }

    #[test]
    fn lexical_declaration_adopts_nested_forward_references() {
        let config = BuilderConfig {
            symbol_scope: SymbolScope::Lexical,
        };
        let chart = StatechartBuilder::with_config(config)
            .build(&[
                Expression::composite("A", vec![Expression::transition("X", "Top")]),
                Expression::composite("B", vec![Expression::transition("Y", "Top")]),
                Expression::composite("Top", vec![Expression::state("T1")]),
            ])
            .unwrap();
        let root = chart.root();
        let top = chart.find("Top").unwrap();
        assert_eq!(chart.parent(top), Some(root));
        assert_eq!(chart.regions(top).len(), 1);
        assert!(chart.find("Top.0.T1").is_some());
        assert!(chart.find("A.0.Top").is_none());
        assert!(chart.find("B.0.Top").is_none());

        for source in ["A.0.X", "B.0.Y"] {
            let state = chart.find(source).unwrap();
            assert_eq!(chart.destination(chart.transitions(state)[0]), Some(top));
        }
        assert_eq!(
            chart
                .contents_of_type(root, NodeType::AnyState)
                .iter()
                .filter(|s| chart.name(**s) == Some("Top"))
                .count(),
            1
        );
    }

    #[test]
    fn lexical_declaration_in_a_sibling_does_not_adopt() {
        let config = BuilderConfig {
            symbol_scope: SymbolScope::Lexical,
        };
        let chart = StatechartBuilder::with_config(config)
            .build(&[
                Expression::composite("A", vec![Expression::transition("X", "Top")]),
                Expression::composite("B", vec![Expression::state("Top")]),
            ])
            .unwrap();
        let nested = chart.find("A.0.Top").unwrap();
        let sibling = chart.find("B.0.Top").unwrap();
        assert_ne!(nested, sibling);
        let x = chart.find("A.0.X").unwrap();
        assert_eq!(chart.destination(chart.transitions(x)[0]), Some(nested));
    }
}
