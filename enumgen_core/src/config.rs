use crate::error::{EnumgenError, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, trace, warn};

pub const CONFIG_FILE_NAME: &str = "enumgen.toml";

/// Options for writing generated files.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Appended to the lowercased type name: `color_enum.go`.
    pub file_suffix: String,
    /// Run gofmt over generated code when it is available.
    pub format: bool,
    /// gofmt executable name or path.
    pub gofmt: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            file_suffix: "_enum".to_string(),
            format: true,
            gofmt: "gofmt".to_string(),
        }
    }
}

/// Options for selecting which files make up the package.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Load `_test.go` files of the package as well.
    pub include_tests: bool,
    /// Extra build tags.
    pub tags: Vec<String>,
    pub goos: String,
    pub goarch: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            include_tests: false,
            tags: Vec::new(),
            goos: host_goos().to_string(),
            goarch: host_goarch().to_string(),
        }
    }
}

/// Configuration read from `enumgen.toml`.
///
/// ```toml
/// [generate]
/// file_suffix = "_enum"
/// format = true
/// gofmt = "${GOROOT:-/usr/local/go}/bin/gofmt"
///
/// [load]
/// include_tests = false
/// tags = ["integration"]
/// goos = "linux"
/// goarch = "amd64"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnumgenConfig {
    pub generate: GenerateConfig,
    pub load: LoadConfig,
}

impl EnumgenConfig {
    /// Load configuration from an explicit path, or search for
    /// `enumgen.toml` from `start_dir` upward. Without a file the defaults
    /// apply.
    pub fn load(start_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_toml_path(path);
        }
        match Self::find_config_file(start_dir) {
            Some(path) => Self::from_toml_path(&path),
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    /// Loads configuration from a specific file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| EnumgenError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&contents)
    }

    pub fn parse_toml(contents: &str) -> Result<Self> {
        let contents = substitute_env_vars(contents)?;
        let config: EnumgenConfig = toml::from_str(&contents)?;
        trace!(?config, "Parsed configuration");
        Ok(config)
    }

    /// Walk from `start_dir` toward the filesystem root.
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let start = if start_dir.is_absolute() {
            start_dir.to_path_buf()
        } else {
            env::current_dir().ok()?.join(start_dir)
        };
        let mut current = start.as_path();
        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            trace!("Checking for config at: {:?}", candidate);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = current.parent()?;
        }
    }
}

/// Substitute `${VAR}` and `${VAR:-default}` in config text.
fn substitute_env_vars(value: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")
        .expect("Invalid regex for environment variable substitution");

    let mut result = String::with_capacity(value.len());
    let mut last = 0;
    for caps in re.captures_iter(value) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let replacement = match (env::var(name.as_str()), caps.get(2)) {
            (Ok(val), _) => val,
            (Err(_), Some(default)) => {
                warn!(
                    "Environment variable {} not set, using default: {}",
                    name.as_str(),
                    default.as_str()
                );
                default.as_str().to_string()
            }
            (Err(_), None) => {
                return Err(EnumgenError::config(format!(
                    "environment variable {} not set and no default provided",
                    name.as_str()
                )));
            }
        };
        result.push_str(&value[last..whole.start()]);
        result.push_str(&replacement);
        last = whole.end();
    }
    result.push_str(&value[last..]);
    Ok(result)
}

/// GOOS naming of the host operating system.
pub fn host_goos() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// GOARCH naming of the host architecture.
pub fn host_goarch() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = EnumgenConfig::default();
        assert_eq!(config.generate.file_suffix, "_enum");
        assert!(config.generate.format);
        assert_eq!(config.generate.gofmt, "gofmt");
        assert!(!config.load.include_tests);
        assert!(config.load.tags.is_empty());
        assert_ne!(config.load.goos, "macos");
        assert_ne!(config.load.goarch, "x86_64");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EnumgenConfig::parse_toml("[load]\ntags = [\"integration\"]\n").unwrap();
        assert_eq!(config.load.tags, vec!["integration".to_string()]);
        assert_eq!(config.generate, GenerateConfig::default());
    }

    #[test]
    fn test_env_substitution_default() {
        let config = EnumgenConfig::parse_toml(
            "[generate]\ngofmt = \"${ENUMGEN_TEST_UNSET_GOROOT:-/opt/go}/bin/gofmt\"\n",
        )
        .unwrap();
        assert_eq!(config.generate.gofmt, "/opt/go/bin/gofmt");
    }

    #[test]
    fn test_env_substitution_missing() {
        let err = EnumgenConfig::parse_toml("[generate]\ngofmt = \"${ENUMGEN_TEST_UNSET_VAR}\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("ENUMGEN_TEST_UNSET_VAR"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = EnumgenConfig::parse_toml("[generate]\nformat = \"yes\"\n").unwrap_err();
        assert!(matches!(err, EnumgenError::Toml(_)));
    }

    #[test]
    fn test_find_config_file_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("pkg").join("colors");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[generate]\nfile_suffix = \"_gen\"\n",
        )
        .unwrap();

        let found = EnumgenConfig::find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE_NAME));

        let config = EnumgenConfig::load(&nested, None).unwrap();
        assert_eq!(config.generate.file_suffix, "_gen");
    }
}
