//! Command-line interface definitions for enumgen.

use clap::Parser;
use enumgen_core::EnumgenConfig;
use std::path::PathBuf;

/// enumgen - generate JSON and database/sql methods for Go enum types
#[derive(Parser, Debug)]
#[command(name = "enumgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated list of type names
    #[arg(short, long, required = true, value_delimiter = ',', env = "ENUMGEN_TYPES")]
    pub types: Vec<String>,

    /// Directory of the Go package
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Path to enumgen.toml configuration file
    #[arg(short, long, env = "ENUMGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the generated source without running gofmt
    #[arg(long)]
    pub no_format: bool,

    /// Print the generated source instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Load the package's _test.go files as well
    #[arg(long)]
    pub include_tests: bool,

    /// Extra build tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Enable verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Default log filter when RUST_LOG is not set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Apply flag overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut EnumgenConfig) {
        if self.no_format {
            config.generate.format = false;
        }
        if self.include_tests {
            config.load.include_tests = true;
        }
        for tag in &self.tags {
            if !tag.is_empty() && !config.load.tags.contains(tag) {
                config.load.tags.push(tag.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("enumgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_types_are_comma_separated() {
        let cli = parse(&["-t", "Color,Shape", "./pkg"]);
        assert_eq!(cli.types, vec!["Color".to_string(), "Shape".to_string()]);
        assert_eq!(cli.dir, PathBuf::from("./pkg"));
    }

    #[test]
    fn test_dir_defaults_to_current() {
        let cli = parse(&["--types", "Color"]);
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["-t", "A", "-v"]).log_level(), "info");
        assert_eq!(parse(&["-t", "A", "-vv"]).log_level(), "debug");
        assert_eq!(parse(&["-t", "A", "-vvvv"]).log_level(), "trace");
        assert_eq!(parse(&["-t", "A", "-q"]).log_level(), "error");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["enumgen", "-t", "A", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = parse(&["-t", "A", "--no-format", "--include-tests", "--tags", "pro,linux"]);
        let mut config = EnumgenConfig::default();
        config.load.tags.push("pro".into());
        cli.apply_overrides(&mut config);
        assert!(!config.generate.format);
        assert!(config.load.include_tests);
        assert_eq!(config.load.tags, vec!["pro".to_string(), "linux".to_string()]);
    }

    #[test]
    fn test_flags_leave_config_alone_by_default() {
        let cli = parse(&["-t", "A"]);
        let mut config = EnumgenConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, EnumgenConfig::default());
    }
}
