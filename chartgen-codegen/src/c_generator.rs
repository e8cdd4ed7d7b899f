//! Lowering of a [`Statechart`] into a flat, enum-dispatched C program.
//!
//! Every state (pseudostates included) gets an enumerator plus a pair of
//! `static` functions. `evaluate` documents the state's outgoing transitions
//! and then calls the parent's `evaluate`, so evaluating a leaf walks the
//! whole ancestor chain bottom-up. `entry` calls the parent's `entry`; only
//! the leaf-to-root dependency is encoded, callers wanting a strict
//! root-first order have to invoke the ancestors themselves.

use std::collections::{HashMap, HashSet};

use chartgen_core::{NodeId, NodeType, Statechart};
use tracing::{debug, warn};

use crate::c_ast::{CComment, CDecl, CEnum, CFunction, CStatement, CStruct, CSwitch};

const CTX: &str = "ctx";

/// Knobs for a single generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CGeneratorOptions {
    /// Identifier prefix. `None` falls back to the artifact base name;
    /// `Some("")` produces unprefixed identifiers.
    pub prefix: Option<String>,
}

/// Replaces everything that is not valid in a C identifier with `_`.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `prefix_name`, or just `name` for an empty prefix.
#[must_use]
pub fn prefixed(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}_{name}")
    }
}

/// Generation-time wrapper around one model state.
#[derive(Debug, Clone)]
pub struct StateHandler {
    pub state: NodeId,
    /// Index of the nearest ancestor state's handler.
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub enumerator: String,
    pub evaluate: CFunction,
    pub entry: CFunction,
}

/// Everything generated for one statechart, ready to be printed.
#[derive(Debug)]
pub struct CGeneratorContext<'a> {
    statechart: &'a Statechart,
    handlers: Vec<StateHandler>,
    state_enum: CEnum,
    context_struct: CStruct,
    run_cycle: CFunction,
}

impl<'a> CGeneratorContext<'a> {
    #[must_use]
    pub fn new(statechart: &'a Statechart, prefix: &str) -> Self {
        let state_enum = CEnum::new(prefixed(prefix, "states"));
        let mut context_struct = CStruct::new(prefixed(prefix, "context"));
        context_struct
            .members
            .push(CDecl::new(state_enum.ty(), "active_state"));
        let ctx_param = CDecl::new(context_struct.ty(), CTX).pointer();

        let mut context = Self {
            statechart,
            handlers: Vec::new(),
            state_enum,
            context_struct,
            run_cycle: CFunction::new(prefixed(prefix, "run_cycle"))
                .with_param(ctx_param.clone()),
        };
        context.create_handlers(prefix, &ctx_param);
        context.synthesize_bodies();
        context.make_state_enum(prefix);
        context.make_run_cycle();
        context
    }

    /// First pass: one handler per state in pre-order, linked to the
    /// handler of the nearest ancestor state.
    fn create_handlers(&mut self, prefix: &str, ctx_param: &CDecl) {
        let chart = self.statechart;
        let mut index: HashMap<NodeId, usize> = HashMap::new();
        for state in chart.contents_of_type(chart.root(), NodeType::AnyState) {
            let fqn = chart.fully_qualified_name(state);
            debug!(fqn = %fqn, "creating handler for state");
            let escaped = sanitize(&fqn);
            let function = |kind: &str| {
                CFunction::new(prefixed(prefix, &format!("{kind}_{escaped}")))
                    .with_param(ctx_param.clone())
                    .make_static()
            };
            let parent = chart
                .parent_of_type(state, NodeType::AnyState)
                .and_then(|p| index.get(&p).copied());
            let handler = StateHandler {
                state,
                parent,
                children: Vec::new(),
                enumerator: sanitize(&prefixed(prefix, &fqn)).to_uppercase(),
                evaluate: function("eval"),
                entry: function("entry"),
            };
            let id = self.handlers.len();
            if let Some(parent) = parent {
                self.handlers[parent].children.push(id);
            }
            index.insert(state, id);
            self.handlers.push(handler);
        }
    }

    /// Second pass: bodies may call into any other handler by name.
    fn synthesize_bodies(&mut self) {
        let chart = self.statechart;
        for id in 0..self.handlers.len() {
            let state = self.handlers[id].state;
            let mut evaluate: Vec<CStatement> = chart
                .transitions(state)
                .into_iter()
                .map(|t| CStatement::Comment(CComment::new(chart.dump(t))))
                .collect();
            let mut entry = Vec::new();
            if let Some(parent) = self.handlers[id].parent {
                let parent = &self.handlers[parent];
                evaluate.push(CStatement::Blank);
                evaluate.push(CStatement::line(format!("{};", parent.evaluate.call(&[CTX]))));
                entry.push(CStatement::line(format!("{};", parent.entry.call(&[CTX]))));
            }
            let handler = &mut self.handlers[id];
            handler.evaluate.body = evaluate;
            handler.entry.body = entry;
        }
    }

    fn make_state_enum(&mut self, prefix: &str) {
        debug!(name = %self.state_enum.name, "creating state enum");
        let no_state = sanitize(&prefixed(prefix, "no_state")).to_uppercase();
        let mut seen = HashSet::new();
        let all = std::iter::once(&no_state).chain(self.handlers.iter().map(|h| &h.enumerator));
        for enumerator in all {
            if !seen.insert(enumerator.as_str()) {
                warn!(enumerator = %enumerator, "state names collide after sanitizing");
            }
        }
        self.state_enum.members.push(no_state);
        self.state_enum
            .members
            .extend(self.handlers.iter().map(|h| h.enumerator.clone()));
    }

    /// One case per leaf state; composite states are only reached through
    /// the evaluate chain.
    fn make_run_cycle(&mut self) {
        debug!(name = %self.run_cycle.name, "creating run cycle function");
        let chart = self.statechart;
        let mut switch = CSwitch::new(format!("{CTX}->active_state"));
        for handler in self.handlers.iter().filter(|h| chart.is_leaf(h.state)) {
            switch.case(
                handler.enumerator.clone(),
                vec![
                    CStatement::line(format!("// State {}", chart.fully_qualified_name(handler.state))),
                    CStatement::line(format!("{};", handler.evaluate.call(&[CTX]))),
                    CStatement::line("break;"),
                ],
            );
        }
        self.run_cycle.body.push(CStatement::Switch(switch));
    }

    #[must_use]
    pub fn statechart(&self) -> &'a Statechart {
        self.statechart
    }

    /// Handlers in state-construction (pre-order) order.
    #[must_use]
    pub fn handlers(&self) -> &[StateHandler] {
        &self.handlers
    }

    #[must_use]
    pub fn handler(&self, state: NodeId) -> Option<&StateHandler> {
        self.handlers.iter().find(|h| h.state == state)
    }

    #[must_use]
    pub fn state_enum(&self) -> &CEnum {
        &self.state_enum
    }

    #[must_use]
    pub fn context_struct(&self) -> &CStruct {
        &self.context_struct
    }

    #[must_use]
    pub fn run_cycle(&self) -> &CFunction {
        &self.run_cycle
    }

    #[must_use]
    pub fn file_comment(&self) -> CComment {
        CComment::new(self.statechart)
    }

    /// Declarations: tree comment, state enum, context struct and the
    /// run-cycle prototype.
    #[must_use]
    pub fn header_text(&self) -> String {
        let mut out = String::new();
        emit(&mut out, self.file_comment(), 2);
        emit(&mut out, &self.state_enum, 1);
        emit(&mut out, &self.context_struct, 1);
        emit(&mut out, self.run_cycle.declare(), 1);
        out
    }

    /// Definitions: include of the header, entry and evaluate per state,
    /// then the run-cycle body.
    #[must_use]
    pub fn source_text(&self, header_file_name: &str) -> String {
        let mut out = String::new();
        emit(&mut out, format!("#include \"{header_file_name}\""), 2);
        for handler in &self.handlers {
            emit(&mut out, &handler.entry, 1);
            emit(&mut out, &handler.evaluate, 1);
        }
        emit(&mut out, &self.run_cycle, 1);
        out
    }
}

/// Appends `content` trimmed, followed by `newlines` empty lines.
fn emit(out: &mut String, content: impl std::fmt::Display, newlines: usize) {
    out.push_str(content.to_string().trim());
    out.push_str(&"\n".repeat(newlines + 1));
}
