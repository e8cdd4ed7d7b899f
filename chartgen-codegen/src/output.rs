//! Writing generated artifacts to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chartgen_core::Statechart;
use tracing::info;

use crate::c_generator::{CGeneratorContext, CGeneratorOptions};
use crate::error::GenerateError;

/// Where artifacts go and what they are called.
///
/// `name` is the base name of both files and, unless overridden, the
/// identifier prefix of the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub out_dir: PathBuf,
    pub name: String,
}

impl OutputConfig {
    pub fn new(out_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn header_file_name(&self) -> String {
        format!("{}.h", self.name)
    }

    #[must_use]
    pub fn header_path(&self) -> PathBuf {
        self.out_dir.join(self.header_file_name())
    }

    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.c", self.name))
    }
}

/// Paths of the artifacts a generator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub header_path: PathBuf,
    pub source_path: PathBuf,
}

/// A backend lowering a statechart into files.
pub trait Generator {
    /// # Errors
    /// [`GenerateError::Io`] when an artifact cannot be written.
    fn generate(
        &self,
        statechart: &Statechart,
        config: &OutputConfig,
    ) -> Result<GeneratedFiles, GenerateError>;
}

/// Emits `<name>.h` and `<name>.c`.
#[derive(Debug, Clone, Default)]
pub struct CGenerator {
    options: CGeneratorOptions,
}

impl CGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: CGeneratorOptions) -> Self {
        Self { options }
    }

    fn prefix<'c>(&'c self, config: &'c OutputConfig) -> &'c str {
        self.options.prefix.as_deref().unwrap_or(&config.name)
    }
}

impl Generator for CGenerator {
    fn generate(
        &self,
        statechart: &Statechart,
        config: &OutputConfig,
    ) -> Result<GeneratedFiles, GenerateError> {
        if config.name.is_empty() {
            return Err(GenerateError::EmptyName);
        }
        // Render everything before touching the filesystem.
        let context = CGeneratorContext::new(statechart, self.prefix(config));
        let header = context.header_text();
        let source = context.source_text(&config.header_file_name());

        fs::create_dir_all(&config.out_dir).map_err(GenerateError::io(&config.out_dir))?;
        let files = GeneratedFiles {
            header_path: config.header_path(),
            source_path: config.source_path(),
        };
        write_artifact(&files.header_path, &header)?;
        write_artifact(&files.source_path, &source)?;
        info!(
            header = %files.header_path.display(),
            source = %files.source_path.display(),
            states = context.handlers().len(),
            "generated C artifacts"
        );
        Ok(files)
    }
}

/// The file handle lives for this call only and is closed on every path.
fn write_artifact(path: &Path, text: &str) -> Result<(), GenerateError> {
    let file = File::create(path).map_err(GenerateError::io(path))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(GenerateError::io(path))
}
