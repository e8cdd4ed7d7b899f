// Copyright 2025 0xjcf
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # chartgen-core
//! Turns a flat, forward-referencing list of state-diagram expressions into a
//! hierarchical statechart: composite states, orthogonal regions, pseudostates
//! and history.
//!
//! The pipeline is `Diagram` (expression nodes handed over by a front end)
//! → [`StatechartBuilder`] → [`Statechart`]. The resulting tree is read-only
//! for downstream consumers such as the C generator.

pub mod builder;
pub mod error;
pub mod expr;
pub mod model;
pub mod pseudostate;

pub use builder::{BuilderConfig, StatechartBuilder, SymbolScope};
pub use error::{BuildError, ModelError};
pub use expr::{
    Diagram, Directive, Endpoint, Expression, HistoryRef, StateAlias, StateDeclaration,
    StateDescription, StateType, TransitionExpr,
};
pub use model::{NodeId, NodeKind, NodeType, StateKind, Statechart};
pub use pseudostate::PseudostateType;

pub mod prelude {
    pub use crate::builder::{BuilderConfig, StatechartBuilder, SymbolScope};
    pub use crate::expr::{Diagram, Endpoint, Expression};
    pub use crate::model::{NodeId, NodeType, StateKind, Statechart};
}
