//! Indented tree dump of a statechart.
//!
//! The dump doubles as a golden format in tests, so child order is total and
//! independent of creation order except among transitions.

use core::fmt;

use super::{NodeId, NodeKind, StateKind, Statechart};

const INDENT: &str = "    ";

/// Display group of a node kind: labels, transitions, regions, initial
/// states, other states, final states.
fn group(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Label { .. } => 0,
        NodeKind::Transition { .. } => 1,
        NodeKind::Region { .. } => 2,
        NodeKind::State(StateKind::Initial) => 3,
        NodeKind::State(StateKind::Final) => 5,
        NodeKind::State(_) => 4,
        NodeKind::Statechart => 6,
    }
}

impl Statechart {
    fn header(&self, id: NodeId) -> String {
        let kind = self.kind(id);
        match kind {
            NodeKind::Statechart | NodeKind::Label { .. } => kind.kind_name().to_owned(),
            NodeKind::Transition { .. } => match self.destination(id) {
                Some(target) => format!("Transition -> {}", self.fully_qualified_name(target)),
                None => "Transition -> <discarded>".to_owned(),
            },
            NodeKind::State(state) if state.fixed_name().is_some() => {
                self.name(id).unwrap_or_default().to_owned()
            }
            _ => format!("{} {}", kind.kind_name(), self.name(id).unwrap_or_default()),
        }
    }

    fn display_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = self.children(id).to_vec();
        // Stable: transitions share a key and keep insertion order.
        children.sort_by_cached_key(|child| {
            let kind = self.kind(*child);
            let fqn = if self.name(*child).is_some() {
                self.fully_qualified_name(*child)
            } else {
                String::new()
            };
            (group(kind), kind.kind_name(), fqn)
        });
        children
    }

    /// Renders the subtree rooted at `id`.
    #[must_use]
    pub fn dump(&self, id: NodeId) -> String {
        let mut out = self.header(id);
        let lines: Vec<String> = match self.kind(id) {
            NodeKind::Label { text } => text.lines().map(str::to_owned).collect(),
            _ => self
                .display_order(id)
                .into_iter()
                .map(|child| self.dump(child))
                .collect(),
        };
        if !lines.is_empty() {
            out.push_str(":\n");
            for block in &lines {
                for line in block.lines() {
                    out.push_str(INDENT);
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        out.trim_end().to_owned()
    }
}

impl fmt::Display for Statechart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump(self.root()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_statechart_prints_header_only() {
        assert_eq!(Statechart::new().to_string(), "Statechart");
    }

    #[test]
    fn children_are_grouped_then_sorted_by_kind_and_name() {
        let mut chart = Statechart::new();
        let root = chart.root();
        let final_state = chart.create_final_state(root).unwrap();
        let zeta = chart.create_state(StateKind::Simple, "Zeta");
        chart.add_child(root, zeta).unwrap();
        let choice = chart.create_state(StateKind::Choice, "pick");
        chart.add_child(root, choice).unwrap();
        let alpha = chart.create_state(StateKind::Simple, "Alpha");
        chart.add_child(root, alpha).unwrap();
        let initial = chart.create_initial_state(root).unwrap();

        chart.add_transition(initial, choice).unwrap();
        chart.add_transition(choice, zeta).unwrap();
        chart.add_transition(choice, alpha).unwrap();
        let last = chart.add_transition(zeta, final_state).unwrap();
        chart.append_label_line(last, "done").unwrap();
        chart.append_label_line(zeta, "busy").unwrap();

        let expected = "\
Statechart:
    InitialState:
        Transition -> pick
    Choice pick:
        Transition -> Zeta
        Transition -> Alpha
    State Alpha
    State Zeta:
        Label:
            busy
        Transition -> FinalState:
            Label:
                done
    FinalState";
        assert_eq!(chart.to_string(), expected);
    }
}
