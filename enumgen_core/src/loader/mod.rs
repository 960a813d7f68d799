//! Loading a Go package directory: file selection, parsing and
//! type-checking of the package scope.

pub mod build_constraints;

pub use build_constraints::{BuildContext, Constraint};

use crate::config::LoadConfig;
use crate::error::{EnumgenError, Result};
use crate::go_parser::{SourceFile, describe_error, parse_go_source};
use crate::resolve::{self, SymbolTable};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};
use walkdir::WalkDir;

/// One parsed file of the package.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub source: String,
    pub ast: SourceFile,
}

impl SourceUnit {
    pub fn parse(path: PathBuf, source: String) -> Result<Self> {
        let ast = parse_go_source(&source)
            .map_err(|e| EnumgenError::parse_error(&path, describe_error(&source, &e)))?;
        Ok(Self { path, source, ast })
    }

    pub fn is_test_file(&self) -> bool {
        self.path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with("_test.go"))
    }
}

/// A loaded, resolved Go package.
#[derive(Debug)]
pub struct Module {
    pub dir: PathBuf,
    pub package: String,
    /// Files in file name order.
    pub files: Vec<SourceUnit>,
    pub symbols: SymbolTable,
}

impl Module {
    /// Load the package in `dir`. Fails when no file is buildable, when
    /// files disagree on the package name, or when a top-level declaration
    /// does not type-check.
    pub fn load(dir: &Path, options: &LoadConfig) -> Result<Self> {
        let ctx = BuildContext::new(&options.goos, &options.goarch, &options.tags);
        debug!(dir = %dir.display(), goos = %ctx.goos, goarch = %ctx.goarch, "Loading Go package");

        let mut units = Vec::new();
        for path in candidate_files(dir, options, &ctx)? {
            let source = std::fs::read_to_string(&path).map_err(|source| EnumgenError::ReadFile {
                path: path.clone(),
                source,
            })?;
            if !ctx.matches_source(&path, &source)? {
                debug!(file = %path.display(), "Skipping file excluded by build constraints");
                continue;
            }
            units.push(SourceUnit::parse(path, source)?);
        }
        Self::from_units(dir, units)
    }

    /// Assemble and resolve a package from already parsed files.
    pub fn from_units(dir: &Path, mut units: Vec<SourceUnit>) -> Result<Self> {
        let package = package_name(dir, &units)?;
        // External test packages (`package colors_test`) are not part of the package.
        let test_package = format!("{}_test", package);
        units.retain(|unit| {
            let keep = !(unit.is_test_file() && unit.ast.package == test_package);
            if !keep {
                debug!(file = %unit.path.display(), "Skipping external test package file");
            }
            keep
        });
        check_single_package(&package, &units)?;

        let symbols = resolve::resolve(&units)?;
        info!(
            dir = %dir.display(),
            package = %package,
            files = units.len(),
            "Loaded Go package"
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            package,
            files: units,
            symbols,
        })
    }
}

fn candidate_files(dir: &Path, options: &LoadConfig, ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".go") || name.starts_with('_') || name.starts_with('.') {
            trace!(file = %name, "Ignoring non-source file");
            continue;
        }
        if name.ends_with("_test.go") && !options.include_tests {
            trace!(file = %name, "Ignoring test file");
            continue;
        }
        if !ctx.matches_file_name(&name) {
            debug!(file = %name, "Skipping file for another GOOS/GOARCH");
            continue;
        }
        paths.push(entry.into_path());
    }
    Ok(paths)
}

/// The package name, taken from the first non-test file.
fn package_name(dir: &Path, units: &[SourceUnit]) -> Result<String> {
    units
        .iter()
        .find(|unit| !unit.is_test_file())
        .or_else(|| units.first())
        .map(|unit| unit.ast.package.clone())
        .ok_or_else(|| EnumgenError::NoBuildableSource {
            dir: dir.to_path_buf(),
        })
}

fn check_single_package(package: &str, units: &[SourceUnit]) -> Result<()> {
    let Some(first) = units.iter().find(|unit| unit.ast.package == package) else {
        return Ok(());
    };
    match units.iter().find(|unit| unit.ast.package != package) {
        Some(other) => Err(EnumgenError::MultiplePackages {
            first: package.to_string(),
            first_file: first.path.clone(),
            second: other.ast.package.clone(),
            second_file: other.path.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn linux() -> LoadConfig {
        LoadConfig {
            goos: "linux".into(),
            goarch: "amd64".into(),
            ..LoadConfig::default()
        }
    }

    #[test]
    fn test_loads_buildable_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.go", "package colors\n\nconst B = A + 1\n");
        write(dir.path(), "a.go", "package colors\n\nconst A = 1\n");
        write(dir.path(), "a_test.go", "package colors\n\nconst T = 3\n");
        write(dir.path(), "_skip.go", "package other\n");
        write(dir.path(), "x_windows.go", "package other\n");
        write(dir.path(), "ignored.go", "//go:build ignore\n\npackage main\n");
        write(dir.path(), "README.md", "# colors\n");
        fs::create_dir(dir.path().join("sub")).unwrap();
        write(&dir.path().join("sub"), "c.go", "package sub\n");

        let module = Module::load(dir.path(), &linux()).unwrap();
        assert_eq!(module.package, "colors");
        let names: Vec<_> = module
            .files
            .iter()
            .map(|unit| unit.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.go", "b.go"]);
        assert!(module.symbols.constant_named("B").is_some());
        assert!(module.symbols.constant_named("T").is_none());
    }

    #[test]
    fn test_include_tests_skips_external_test_package() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.go", "package colors\n\nconst A = 1\n");
        write(dir.path(), "a_test.go", "package colors\n\nconst T = A\n");
        write(dir.path(), "ext_test.go", "package colors_test\n\nconst E = 1\n");

        let options = LoadConfig {
            include_tests: true,
            ..linux()
        };
        let module = Module::load(dir.path(), &options).unwrap();
        assert_eq!(module.files.len(), 2);
        assert!(module.symbols.constant_named("T").is_some());
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = Module::load(dir.path(), &linux()).unwrap_err();
        assert!(matches!(err, EnumgenError::NoBuildableSource { .. }));
    }

    #[test]
    fn test_multiple_packages() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.go", "package colors\n");
        write(dir.path(), "b.go", "package shapes\n");
        let err = Module::load(dir.path(), &linux()).unwrap_err();
        match err {
            EnumgenError::MultiplePackages { first, second, .. } => {
                assert_eq!(first, "colors");
                assert_eq!(second, "shapes");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tags_enable_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.go", "package colors\n");
        write(dir.path(), "pro.go", "//go:build pro\n\npackage colors\n\nconst Pro = 1\n");

        let module = Module::load(dir.path(), &linux()).unwrap();
        assert!(module.symbols.constant_named("Pro").is_none());

        let options = LoadConfig {
            tags: vec!["pro".into()],
            ..linux()
        };
        let module = Module::load(dir.path(), &options).unwrap();
        assert!(module.symbols.constant_named("Pro").is_some());
    }

    fn load_err(source: &str) -> EnumgenError {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.go", "package colors\n\ntype T int\n\nconst A T = 1\n");
        write(dir.path(), "b.go", source);
        Module::load(dir.path(), &linux()).unwrap_err()
    }

    #[test]
    fn test_invalid_function_body_fails() {
        let err = load_err("package colors\n\nfunc f() int { x := ; return x + * 3 }\n");
        assert!(matches!(err, EnumgenError::ParseError { .. }), "{err}");
        assert!(err.to_string().contains("b.go"), "{err}");
    }

    #[test]
    fn test_mismatched_brackets_fail() {
        let err = load_err("package colors\n\nfunc f() { g( ] }\n");
        assert!(matches!(err, EnumgenError::ParseError { .. }), "{err}");
        assert!(err.to_string().contains("unexpected ], expected )"), "{err}");
    }

    #[test]
    fn test_invalid_var_initializer_fails() {
        let err = load_err("package colors\n\nvar v = 1 + * / 2\n");
        assert!(matches!(err, EnumgenError::ParseError { .. }), "{err}");
        assert!(err.to_string().contains("syntax error"), "{err}");
    }

    #[test]
    fn test_undefined_name_in_var_fails() {
        let err = load_err("package colors\n\nvar v = Undefined\n");
        let message = err.to_string();
        assert!(matches!(err, EnumgenError::Resolve { .. }), "{message}");
        assert!(message.contains("b.go:3:9: undefined: Undefined"), "{message}");
    }

    #[test]
    fn test_parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.go", "package colors\n\nconst (\n");
        let err = Module::load(dir.path(), &linux()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken.go"), "{message}");
    }
}
