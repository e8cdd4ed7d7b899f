//! Expression nodes produced by a diagram front end.
//!
//! A front end (grammar, parser) is not part of this crate; it hands over an
//! ordered list of [`Expression`]s. With the `serde` feature the list can
//! also be exchanged as JSON.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::builder::{BuilderConfig, StatechartBuilder};
use crate::error::BuildError;
use crate::model::Statechart;

/// Literal used by diagrams for the start/end marker.
pub const MARKER: &str = "[*]";

/// One statement of a state diagram.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Transition(TransitionExpr),
    StateDeclaration(StateDeclaration),
    StateDescription(StateDescription),
    StateAlias(StateAlias),
    /// Cosmetic directive (`scale`, `skinparam`, colours, ...).
    Directive(Directive),
    /// A statement kind the front end knows but this layer has no consumer for.
    Unsupported { kind: String },
}

impl Expression {
    /// Stable tag used in log output.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Expression::Transition(_) => "TransitionExpression",
            Expression::StateDeclaration(_) => "StateDeclarationExpression",
            Expression::StateDescription(_) => "StateDescriptionExpression",
            Expression::StateAlias(_) => "StateAliasExpression",
            Expression::Directive(_) => "DirectiveExpression",
            Expression::Unsupported { kind } => kind,
        }
    }

    pub fn transition(source: impl Into<Endpoint>, destination: impl Into<Endpoint>) -> Self {
        Expression::Transition(TransitionExpr {
            source: source.into(),
            destination: destination.into(),
            label: None,
        })
    }

    pub fn labeled_transition(
        source: impl Into<Endpoint>,
        destination: impl Into<Endpoint>,
        label: impl Into<String>,
    ) -> Self {
        Expression::Transition(TransitionExpr {
            source: source.into(),
            destination: destination.into(),
            label: Some(label.into()),
        })
    }

    pub fn state(name: impl Into<String>) -> Self {
        Expression::StateDeclaration(StateDeclaration {
            name: name.into(),
            state_type: None,
        })
    }

    pub fn composite(name: impl Into<String>, expressions: Vec<Expression>) -> Self {
        Expression::StateDeclaration(StateDeclaration {
            name: name.into(),
            state_type: Some(StateType::Composite(expressions)),
        })
    }

    pub fn parallel(name: impl Into<String>, regions: Vec<Vec<Expression>>) -> Self {
        Expression::StateDeclaration(StateDeclaration {
            name: name.into(),
            state_type: Some(StateType::Parallel(regions)),
        })
    }

    pub fn pseudostate(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Expression::StateDeclaration(StateDeclaration {
            name: name.into(),
            state_type: Some(StateType::PseudoState(type_tag.into())),
        })
    }

    pub fn description(state: impl Into<String>, description: impl Into<String>) -> Self {
        Expression::StateDescription(StateDescription {
            state: state.into(),
            description: description.into(),
        })
    }

    pub fn alias(short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        Expression::StateAlias(StateAlias {
            short_name: short_name.into(),
            long_name: long_name.into(),
        })
    }

    pub fn directive(keyword: impl Into<String>, value: impl Into<String>) -> Self {
        Expression::Directive(Directive {
            keyword: keyword.into(),
            value: value.into(),
        })
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionExpr {
    pub source: Endpoint,
    pub destination: Endpoint,
    pub label: Option<String>,
}

/// Source or destination of a transition.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `[*]`: the initial state as a source, the final state as a destination.
    Marker,
    Named(String),
    /// Inline pseudostate, e.g. `entry1 <<entryPoint>>`.
    Annotated { name: String, type_tag: String },
    History(HistoryRef),
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        if name == MARKER {
            Endpoint::Marker
        } else {
            Endpoint::Named(name.to_owned())
        }
    }
}

impl From<String> for Endpoint {
    fn from(name: String) -> Self {
        Endpoint::from(name.as_str())
    }
}

impl From<HistoryRef> for Endpoint {
    fn from(history: HistoryRef) -> Self {
        Endpoint::History(history)
    }
}

/// `[H]`, `[H*]`, `Owner[H]` or `Owner[H*]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRef {
    /// State whose (single) region holds the history; `None` means the active
    /// container.
    pub owner: Option<String>,
    pub deep: bool,
}

impl HistoryRef {
    #[must_use]
    pub fn shallow(owner: Option<&str>) -> Self {
        Self {
            owner: owner.map(str::to_owned),
            deep: false,
        }
    }

    #[must_use]
    pub fn deep(owner: Option<&str>) -> Self {
        Self {
            owner: owner.map(str::to_owned),
            deep: true,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDeclaration {
    pub name: String,
    pub state_type: Option<StateType>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateType {
    Composite(Vec<Expression>),
    /// One expression list per orthogonal region, in declaration order.
    Parallel(Vec<Vec<Expression>>),
    PseudoState(String),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDescription {
    pub state: String,
    pub description: String,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateAlias {
    pub short_name: String,
    pub long_name: String,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub keyword: String,
    pub value: String,
}

/// A parsed diagram: expressions in source order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagram {
    pub expressions: Vec<Expression>,
}

impl Diagram {
    #[must_use]
    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }

    /// Builds the statechart with the default builder configuration.
    ///
    /// # Errors
    /// Returns the first fatal [`BuildError`]; no partial statechart is produced.
    pub fn transform(&self) -> Result<Statechart, BuildError> {
        self.transform_with(BuilderConfig::default())
    }

    /// # Errors
    /// Returns the first fatal [`BuildError`]; no partial statechart is produced.
    pub fn transform_with(&self, config: BuilderConfig) -> Result<Statechart, BuildError> {
        StatechartBuilder::with_config(config).build(&self.expressions)
    }

    /// # Errors
    /// Returns the `serde_json` error when the input is not a valid diagram.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    /// Propagates `serde_json` serialization failures.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<Vec<Expression>> for Diagram {
    fn from(expressions: Vec<Expression>) -> Self {
        Self::new(expressions)
    }
}
