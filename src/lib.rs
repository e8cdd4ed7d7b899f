//! # chartgen
//! State diagram in, C state machine out.
//!
//! ```no_run
//! use chartgen::prelude::*;
//!
//! let diagram = Diagram::new(vec![
//!     Expression::transition("[*]", "Idle"),
//!     Expression::transition("Idle", "[*]"),
//! ]);
//! let files = chartgen::compile(&diagram, &OutputConfig::new("out", "door"))?;
//! println!("{}", files.header_path.display());
//! # Ok::<(), chartgen::Error>(())
//! ```

pub use chartgen_codegen as codegen;
pub use chartgen_core as model;

use chartgen_codegen::{CGenerator, GeneratedFiles, Generator, OutputConfig};
use chartgen_core::{BuilderConfig, Diagram};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] chartgen_core::BuildError),
    #[error(transparent)]
    Generate(#[from] chartgen_codegen::GenerateError),
}

/// Transforms `diagram` with the default builder settings and writes the C
/// artifacts described by `config`.
///
/// # Errors
/// The first build or output error; nothing is written when the build fails.
pub fn compile(diagram: &Diagram, config: &OutputConfig) -> Result<GeneratedFiles, Error> {
    compile_with(diagram, BuilderConfig::default(), &CGenerator::new(), config)
}

/// # Errors
/// See [`compile`].
pub fn compile_with(
    diagram: &Diagram,
    builder: BuilderConfig,
    generator: &impl Generator,
    config: &OutputConfig,
) -> Result<GeneratedFiles, Error> {
    let statechart = diagram.transform_with(builder)?;
    debug!(name = %config.name, "diagram transformed, generating");
    Ok(generator.generate(&statechart, config)?)
}

pub mod prelude {
    pub use chartgen_codegen::{CGenerator, CGeneratorOptions, Generator, OutputConfig};
    pub use chartgen_core::prelude::*;

    pub use crate::{Error, compile};
}
