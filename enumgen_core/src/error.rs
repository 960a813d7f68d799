use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnumgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error reading {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error writing output file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{dir}: no buildable Go source files")]
    NoBuildableSource { dir: PathBuf },

    #[error("Parse error in file {file}: {message}")]
    ParseError { file: PathBuf, message: String },

    #[error("found packages {first} ({first_file}) and {second} ({second_file})")]
    MultiplePackages {
        first: String,
        first_file: PathBuf,
        second: String,
        second_file: PathBuf,
    },

    #[error("type-checking package: {file}:{line}:{column}: {message}")]
    Resolve {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("can't handle non-integer constant type {type_name}")]
    UnsupportedConstantType { type_name: String },

    #[error("can't handle non-integer constant value {name}")]
    UnsupportedConstantValue { name: String },

    #[error("can't handle constant {name}: its value comes from imported package {package}")]
    ExternalConstant { name: String, package: String },

    #[error("internal error: value of {name} ({value}) does not fit in 64 bits")]
    ValueOutOfRange { name: String, value: String },

    #[error("no value for constant {name:?}")]
    MissingSymbol { name: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("No type names given")]
    NoTypeNames,
}

pub type Result<T> = std::result::Result<T, EnumgenError>;

impl EnumgenError {
    pub fn parse_error(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        EnumgenError::ParseError {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn resolve(
        file: impl Into<PathBuf>,
        (line, column): (usize, usize),
        message: impl Into<String>,
    ) -> Self {
        EnumgenError::Resolve {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        EnumgenError::UnsupportedConstantType {
            type_name: type_name.into(),
        }
    }

    pub fn unsupported_value(name: impl Into<String>) -> Self {
        EnumgenError::UnsupportedConstantValue { name: name.into() }
    }

    pub fn missing_symbol(name: impl Into<String>) -> Self {
        EnumgenError::MissingSymbol { name: name.into() }
    }

    pub fn template(message: impl Into<String>) -> Self {
        EnumgenError::Template(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        EnumgenError::Config(message.into())
    }
}
