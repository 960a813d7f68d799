//! Post-render formatting through `gofmt`.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

/// Why formatting failed. Never fatal: callers keep the raw text.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("formatter {command:?} not found: {source}")]
    NotFound {
        command: String,
        source: which::Error,
    },

    #[error("running formatter: {0}")]
    Io(#[from] std::io::Error),

    #[error("formatter rejected the source: {0}")]
    Rejected(String),
}

/// Runs a gofmt-compatible command over Go source.
#[derive(Debug, Clone)]
pub struct GoFormatter {
    command: String,
}

impl GoFormatter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn locate(&self) -> Result<PathBuf, FormatError> {
        which::which(&self.command).map_err(|source| FormatError::NotFound {
            command: self.command.clone(),
            source,
        })
    }

    pub fn format(&self, source: &str) -> Result<String, FormatError> {
        let program = self.locate()?;
        debug!(formatter = %program.display(), "Formatting generated source");

        let mut child = Command::new(&program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FormatError::Rejected("formatter stdin unavailable".to_string()))?;
        let input = source.to_owned();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| FormatError::Rejected("formatter input thread panicked".to_string()))??;

        if !output.status.success() {
            return Err(FormatError::Rejected(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| FormatError::Rejected(format!("formatter output is not UTF-8: {}", e)))
    }

    /// Format `source`, falling back to the unformatted text with a warning.
    pub fn format_or_raw(&self, source: String, label: &str) -> String {
        match self.format(&source) {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!("formatting {}: {}; writing unformatted source", label, e);
                source
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_formatter_keeps_source() {
        let formatter = GoFormatter::new("enumgen-no-such-gofmt");
        let err = formatter.format("package p\n").unwrap_err();
        assert!(matches!(err, FormatError::NotFound { .. }));

        let raw = "package p\nconst  A=1\n".to_string();
        assert_eq!(formatter.format_or_raw(raw.clone(), "a_enum.go"), raw);
    }

    #[test]
    fn test_gofmt_when_available() {
        if which::which("gofmt").is_err() {
            println!("Skipping test: gofmt not installed");
            return;
        }
        let formatter = GoFormatter::new("gofmt");
        let formatted = formatter.format("package p\nconst  A=1\n").unwrap();
        assert!(formatted.contains("const A = 1\n"), "{formatted}");

        let err = formatter.format("package p\nconst (\n").unwrap_err();
        assert!(matches!(err, FormatError::Rejected(_)));
    }
}
