//! enumgen core library.
//!
//! Loads a Go package directory, resolves its package-level constants and
//! renders `Value`/`Scan`/`MarshalJSON`/`UnmarshalJSON` methods for
//! integer-backed enum types.
//!
//! ```no_run
//! use enumgen_core::{EnumGenerator, EnumgenConfig};
//! use std::path::Path;
//!
//! let dir = Path::new("./colors");
//! let config = EnumgenConfig::load(dir, None)?;
//! let generator = EnumGenerator::new(dir, config, "enumgen -t Color");
//! let report = generator.generate(&["Color".to_string()])?;
//! for file in &report.files {
//!     println!("{:?}: {} values", file.path, file.values);
//! }
//! # Ok::<(), enumgen_core::EnumgenError>(())
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod go_parser;
pub mod loader;
pub mod resolve;

pub use codegen::{GenerationRequest, GoFormatter, render};
pub use config::{EnumgenConfig, GenerateConfig, LoadConfig};
pub use error::{EnumgenError, Result};
pub use extract::{ExtractedValue, extract};
pub use generator::{EnumGenerator, GeneratedFile, GenerationReport, OutputMode};
pub use loader::Module;
