//! Arena-backed statechart tree.
//!
//! Every entity (states, regions, transitions, labels) lives in one `Vec` and
//! is addressed by a stable [`NodeId`]. Parent links are a plain field per
//! node, so re-parenting during forward-reference promotion never invalidates
//! a handle. Transition destinations are handles too and do not own anything.

mod display;

use core::fmt;

use crate::error::ModelError;

/// Stable handle of a node inside one [`Statechart`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Flavour of a state node. Everything except `Simple` is a pseudostate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StateKind {
    Simple,
    Initial,
    Final,
    Choice,
    /// Fork and join; they differ only in edge direction.
    Fork,
    EntryPoint,
    ExitPoint,
    History { deep: bool },
}

impl StateKind {
    #[must_use]
    pub fn kind_name(self) -> &'static str {
        match self {
            StateKind::Simple => "State",
            StateKind::Initial => "InitialState",
            StateKind::Final => "FinalState",
            StateKind::Choice => "Choice",
            StateKind::Fork => "Fork",
            StateKind::EntryPoint => "EntryPoint",
            StateKind::ExitPoint => "ExitPoint",
            StateKind::History { .. } => "HistoryState",
        }
    }

    #[must_use]
    pub fn is_pseudostate(self) -> bool {
        self != StateKind::Simple
    }

    /// Pseudostates that exist at most once per container and carry a fixed
    /// name instead of a user-chosen one.
    #[must_use]
    pub fn fixed_name(self) -> Option<&'static str> {
        match self {
            StateKind::Initial => Some("InitialState"),
            StateKind::Final => Some("FinalState"),
            StateKind::History { deep: false } => Some("History"),
            StateKind::History { deep: true } => Some("DeepHistory"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root container.
    Statechart,
    Region { number: usize },
    State(StateKind),
    Transition { destination: Option<NodeId> },
    Label { text: String },
}

impl NodeKind {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Statechart => "Statechart",
            NodeKind::Region { .. } => "Region",
            NodeKind::State(kind) => kind.kind_name(),
            NodeKind::Transition { .. } => "Transition",
            NodeKind::Label { .. } => "Label",
        }
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Statechart | NodeKind::Region { .. })
    }

    #[must_use]
    pub fn is_state(&self) -> bool {
        matches!(self, NodeKind::State(_))
    }
}

/// Type filter for the `*_of_type` queries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// Any state, pseudostates included.
    AnyState,
    State(StateKind),
    Region,
    Transition,
    Label,
    /// The root or a region.
    Container,
}

impl NodeType {
    #[must_use]
    pub fn matches(self, kind: &NodeKind) -> bool {
        match (self, kind) {
            (NodeType::AnyState, NodeKind::State(_)) => true,
            (NodeType::State(wanted), NodeKind::State(actual)) => wanted == *actual,
            (NodeType::Region, NodeKind::Region { .. }) => true,
            (NodeType::Transition, NodeKind::Transition { .. }) => true,
            (NodeType::Label, NodeKind::Label { .. }) => true,
            (NodeType::Container, kind) => kind.is_container(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    discarded: bool,
}

impl Node {
    fn new(kind: NodeKind, name: Option<String>) -> Self {
        Self {
            kind,
            name,
            parent: None,
            children: Vec::new(),
            discarded: false,
        }
    }
}

/// The root of a hierarchical state machine and the arena owning all its
/// nodes.
///
/// Methods taking a [`NodeId`] panic when handed a handle that was minted by a
/// different statechart.
#[derive(Debug, Clone)]
pub struct Statechart {
    nodes: Vec<Node>,
}

impl Default for Statechart {
    fn default() -> Self {
        Self::new()
    }
}

impl Statechart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Statechart, None)],
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, kind: NodeKind, name: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, name));
        id
    }

    // --- accessors ---

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// `Some` for states (plain and pseudo) only.
    #[must_use]
    pub fn state_kind(&self, id: NodeId) -> Option<StateKind> {
        match self.node(id).kind {
            NodeKind::State(kind) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).name.as_deref()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// A node that was replaced during promotion or pruned after the build.
    #[must_use]
    pub fn is_discarded(&self, id: NodeId) -> bool {
        self.node(id).discarded
    }

    /// Number of nodes ever allocated, discarded ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- node creation ---

    /// Allocates a detached state. Pseudostates with a fixed name ignore `name`.
    pub fn create_state(&mut self, kind: StateKind, name: &str) -> NodeId {
        let name = kind.fixed_name().unwrap_or(name).to_owned();
        self.push(NodeKind::State(kind), Some(name))
    }

    /// Attaches a new region to `state`, numbered after the regions it already
    /// owns.
    ///
    /// # Errors
    /// [`ModelError::NotAState`] when `state` is not a state.
    pub fn add_region(&mut self, state: NodeId) -> Result<NodeId, ModelError> {
        if !self.kind(state).is_state() {
            return Err(ModelError::NotAState(state));
        }
        let number = self.regions(state).len();
        let region = self.push(NodeKind::Region { number }, Some(number.to_string()));
        self.add_child(state, region)?;
        Ok(region)
    }

    /// Creates a transition owned by `source` and pointing at `destination`.
    ///
    /// # Errors
    /// [`ModelError::NotAState`] when either end is not a state.
    pub fn add_transition(
        &mut self,
        source: NodeId,
        destination: NodeId,
    ) -> Result<NodeId, ModelError> {
        for end in [source, destination] {
            if !self.kind(end).is_state() {
                return Err(ModelError::NotAState(end));
            }
        }
        let transition = self.push(
            NodeKind::Transition {
                destination: Some(destination),
            },
            None,
        );
        self.add_child(source, transition)?;
        Ok(transition)
    }

    // --- tree integrity ---

    /// # Errors
    /// Fails on self/descendant attachment, duplicate children and children
    /// that still have another parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ModelError> {
        if parent == child || self.is_ancestor(child, parent) {
            return Err(ModelError::WouldCycle(child));
        }
        if self.node(parent).children.contains(&child) {
            return Err(ModelError::DuplicateChild { parent, child });
        }
        if let Some(current) = self.node(child).parent {
            return Err(ModelError::AlreadyParented {
                child,
                parent: current,
            });
        }
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    /// # Errors
    /// [`ModelError::NotAChild`] when `child` is not attached to `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ModelError> {
        let children = &mut self.node_mut(parent).children;
        let Some(position) = children.iter().position(|c| *c == child) else {
            return Err(ModelError::NotAChild { parent, child });
        };
        children.remove(position);
        self.node_mut(child).parent = None;
        Ok(())
    }

    /// Detaches `id` from its parent, if any.
    ///
    /// # Errors
    /// Only on a corrupted parent link.
    pub fn detach(&mut self, id: NodeId) -> Result<(), ModelError> {
        match self.parent(id) {
            Some(parent) => self.remove_child(parent, id),
            None => Ok(()),
        }
    }

    /// Detaches `id` and marks it dead. Transitions still pointing at it
    /// report no destination afterwards.
    ///
    /// # Errors
    /// Only on a corrupted parent link.
    pub fn discard(&mut self, id: NodeId) -> Result<(), ModelError> {
        self.detach(id)?;
        self.node_mut(id).discarded = true;
        Ok(())
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = self.parent(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Moves every child of `from` below `to`, keeping their order. Labels are
    /// merged line by line when `to` already carries one.
    ///
    /// # Errors
    /// Propagates attachment failures.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), ModelError> {
        for child in self.children(from).to_vec() {
            self.remove_child(from, child)?;
            if let NodeKind::Label { text } = self.kind(child).clone() {
                if self.label(to).is_some() {
                    for line in text.lines() {
                        self.append_label_line(to, line)?;
                    }
                    self.node_mut(child).discarded = true;
                    continue;
                }
            }
            self.add_child(to, child)?;
        }
        Ok(())
    }

    /// Points every transition that targets `from` at `to` instead.
    pub fn retarget(&mut self, from: NodeId, to: NodeId) {
        for node in &mut self.nodes {
            if let NodeKind::Transition { destination } = &mut node.kind {
                if *destination == Some(from) {
                    *destination = Some(to);
                }
            }
        }
    }

    // --- queries ---

    #[must_use]
    pub fn children_of_type(&self, id: NodeId, ty: NodeType) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| ty.matches(self.kind(*c)))
            .collect()
    }

    /// All descendants in pre-order.
    #[must_use]
    pub fn contents(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_contents(id, &mut out);
        out
    }

    fn collect_contents(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(id) {
            out.push(*child);
            self.collect_contents(*child, out);
        }
    }

    #[must_use]
    pub fn contents_of_type(&self, id: NodeId, ty: NodeType) -> Vec<NodeId> {
        self.contents(id)
            .into_iter()
            .filter(|c| ty.matches(self.kind(*c)))
            .collect()
    }

    /// Nearest ancestor matching `ty`.
    #[must_use]
    pub fn parent_of_type(&self, id: NodeId, ty: NodeType) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if ty.matches(self.kind(ancestor)) {
                return Some(ancestor);
            }
            current = self.parent(ancestor);
        }
        None
    }

    #[must_use]
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) => self
                .children(parent)
                .iter()
                .copied()
                .filter(|c| *c != id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Dot-joined names from the root down to `id`. Regions contribute their
    /// number; the root and unnamed nodes contribute nothing.
    #[must_use]
    pub fn fully_qualified_name(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            match self.name(node) {
                Some(name) => parts.push(name),
                None => break,
            }
            current = self.parent(node);
        }
        parts.reverse();
        parts.join(".")
    }

    /// Resolves a fully-qualified name back to a reachable node.
    #[must_use]
    pub fn find(&self, fqn: &str) -> Option<NodeId> {
        self.contents(self.root())
            .into_iter()
            .find(|id| self.name(*id).is_some() && self.fully_qualified_name(*id) == fqn)
    }

    // --- containers ---

    fn ensure_container(&self, id: NodeId) -> Result<(), ModelError> {
        if self.kind(id).is_container() {
            Ok(())
        } else {
            Err(ModelError::NotAContainer(id))
        }
    }

    fn create_unique(&mut self, container: NodeId, kind: StateKind) -> Result<NodeId, ModelError> {
        self.ensure_container(container)?;
        if let Some(existing) = self.children_of_type(container, NodeType::State(kind)).first() {
            return Ok(*existing);
        }
        let state = self.create_state(kind, "");
        self.add_child(container, state)?;
        Ok(state)
    }

    /// Returns the container's initial pseudostate, creating it on first use.
    ///
    /// # Errors
    /// [`ModelError::NotAContainer`] unless `container` is the root or a region.
    pub fn create_initial_state(&mut self, container: NodeId) -> Result<NodeId, ModelError> {
        self.create_unique(container, StateKind::Initial)
    }

    /// Returns the container's final pseudostate, creating it on first use.
    ///
    /// # Errors
    /// [`ModelError::NotAContainer`] unless `container` is the root or a region.
    pub fn create_final_state(&mut self, container: NodeId) -> Result<NodeId, ModelError> {
        self.create_unique(container, StateKind::Final)
    }

    /// # Errors
    /// [`ModelError::NotAContainer`] unless `container` is the root or a region.
    pub fn create_history_state(
        &mut self,
        container: NodeId,
        deep: bool,
    ) -> Result<NodeId, ModelError> {
        self.create_unique(container, StateKind::History { deep })
    }

    #[must_use]
    pub fn initial_state(&self, container: NodeId) -> Option<NodeId> {
        self.children_of_type(container, NodeType::State(StateKind::Initial))
            .first()
            .copied()
    }

    #[must_use]
    pub fn final_state(&self, container: NodeId) -> Option<NodeId> {
        self.children_of_type(container, NodeType::State(StateKind::Final))
            .first()
            .copied()
    }

    // --- states, transitions, labels ---

    #[must_use]
    pub fn states(&self, container: NodeId) -> Vec<NodeId> {
        self.children_of_type(container, NodeType::AnyState)
    }

    #[must_use]
    pub fn regions(&self, state: NodeId) -> Vec<NodeId> {
        self.children_of_type(state, NodeType::Region)
    }

    /// Outgoing transitions of `state`, in creation order.
    #[must_use]
    pub fn transitions(&self, state: NodeId) -> Vec<NodeId> {
        self.children_of_type(state, NodeType::Transition)
    }

    /// A state without regions.
    #[must_use]
    pub fn is_leaf(&self, state: NodeId) -> bool {
        self.regions(state).is_empty()
    }

    /// Destination of a transition; `None` once the target has been discarded.
    #[must_use]
    pub fn destination(&self, transition: NodeId) -> Option<NodeId> {
        match self.kind(transition) {
            NodeKind::Transition {
                destination: Some(target),
            } if !self.is_discarded(*target) => Some(*target),
            _ => None,
        }
    }

    /// Source of a transition, i.e. its owner.
    #[must_use]
    pub fn source(&self, transition: NodeId) -> Option<NodeId> {
        match self.kind(transition) {
            NodeKind::Transition { .. } => self.parent(transition),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.children_of_type(id, NodeType::Label)
            .first()
            .and_then(|label| match self.kind(*label) {
                NodeKind::Label { text } => Some(text.as_str()),
                _ => None,
            })
    }

    /// Appends a line to the label of `id`, creating the label on first use.
    ///
    /// # Errors
    /// Propagates attachment failures for a freshly created label.
    pub fn append_label_line(&mut self, id: NodeId, line: &str) -> Result<(), ModelError> {
        if let Some(label) = self.children_of_type(id, NodeType::Label).first().copied() {
            if let NodeKind::Label { text } = &mut self.node_mut(label).kind {
                text.push('\n');
                text.push_str(line);
            }
            return Ok(());
        }
        let label = self.push(
            NodeKind::Label {
                text: line.to_owned(),
            },
            None,
        );
        self.add_child(id, label)
    }
}
