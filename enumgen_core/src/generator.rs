//! Driving the pipeline for a list of type names.

use crate::codegen::{GenerationRequest, GoFormatter, render};
use crate::config::EnumgenConfig;
use crate::error::{EnumgenError, Result};
use crate::extract::extract;
use crate::loader::Module;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where generated source goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Write `<dir>/<type><suffix>.go`, replacing an existing file.
    #[default]
    Files,
    /// Keep the source in the report only.
    Collect,
}

/// Information about one generated type.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub type_name: String,
    /// The path written, or `None` in [`OutputMode::Collect`].
    pub path: Option<PathBuf>,
    /// The final (possibly formatted) source.
    pub source: String,
    /// Number of constants extracted for the type.
    pub values: usize,
}

/// Report of the generation process.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub package: String,
    /// One entry per requested type, in request order.
    pub files: Vec<GeneratedFile>,
}

impl GenerationReport {
    fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }
}

/// Generates enum methods for types of the package in one directory.
pub struct EnumGenerator {
    dir: PathBuf,
    config: EnumgenConfig,
    command: String,
    output: OutputMode,
}

impl EnumGenerator {
    /// `command` is recorded in the header comment of every generated file.
    pub fn new(dir: impl Into<PathBuf>, config: EnumgenConfig, command: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            config,
            command: command.into(),
            output: OutputMode::default(),
        }
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Load the package once, then generate each type in order. The first
    /// failure stops the run; files written for earlier types are kept.
    pub fn generate(&self, type_names: &[String]) -> Result<GenerationReport> {
        let type_names: Vec<&str> = type_names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect();
        if type_names.is_empty() {
            return Err(EnumgenError::NoTypeNames);
        }

        info!(dir = %self.dir.display(), types = ?type_names, "Starting enum generation");
        let module = Module::load(&self.dir, &self.config.load)?;

        let mut report = GenerationReport {
            package: module.package.clone(),
            ..GenerationReport::default()
        };
        for type_name in type_names {
            let file = self.generate_type(&module, type_name)?;
            report.add_file(file);
        }

        info!(files = report.files.len(), "Enum generation complete");
        Ok(report)
    }

    /// Generate one type from an already loaded package.
    pub fn generate_type(&self, module: &Module, type_name: &str) -> Result<GeneratedFile> {
        let values = extract(module, type_name)?;
        let count = values.len();
        let request = GenerationRequest {
            type_name: type_name.to_string(),
            values,
            package_name: module.package.clone(),
            command: self.command.clone(),
        };
        let file_name = request.file_name(&self.config.generate.file_suffix);

        let mut source = render(&request)?;
        if self.config.generate.format {
            source = GoFormatter::new(&self.config.generate.gofmt).format_or_raw(source, &file_name);
        } else {
            debug!(type_name = %type_name, "Formatting disabled");
        }

        let path = match self.output {
            OutputMode::Files => {
                let path = self.dir.join(&file_name);
                fs::write(&path, &source).map_err(|source| EnumgenError::WriteFile {
                    path: path.clone(),
                    source,
                })?;
                info!(
                    type_name = %type_name,
                    values = count,
                    path = %path.display(),
                    "Generated enum methods"
                );
                Some(path)
            }
            OutputMode::Collect => {
                debug!(type_name = %type_name, values = count, "Collected enum methods");
                None
            }
        };

        Ok(GeneratedFile {
            type_name: type_name.to_string(),
            path,
            source,
            values: count,
        })
    }
}
