//! # chartgen-codegen
//! Lowers a [`chartgen_core::Statechart`] into a flattened, enum-dispatched C
//! state machine: a header with the state enum, context struct and run-cycle
//! prototype, and a source file with per-state entry/evaluate functions.

pub mod c_ast;
pub mod c_generator;
pub mod error;
pub mod output;
pub mod writer;

pub use c_generator::{CGeneratorContext, CGeneratorOptions, StateHandler};
pub use error::GenerateError;
pub use output::{CGenerator, GeneratedFiles, Generator, OutputConfig};
pub use writer::IndentedWriter;
