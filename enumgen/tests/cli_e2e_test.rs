//! End-to-end tests for the enumgen binary.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const COLORS: &str = "package colors\n\ntype Color int\n\nconst (\n\tRed Color = 1\n\tGreen Color = 2\n)\n\ntype Ratio float64\n\nconst Half Ratio = 0.5\n";

fn enumgen() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_enumgen"));
    command
        .env_remove("RUST_LOG")
        .env_remove("ENUMGEN_TYPES")
        .env_remove("ENUMGEN_CONFIG");
    command
}

fn run(command: &mut Command) -> Output {
    command.output().expect("Failed to execute enumgen binary")
}

fn package_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("colors.go"), COLORS).unwrap();
    dir
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Argument handling
// ============================================================================

#[test]
fn test_cli_help() {
    let output = run(enumgen().arg("--help"));
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--types"), "{stdout}");
    assert!(stdout.contains("--no-format"), "{stdout}");
}

#[test]
fn test_types_are_required() {
    let output = run(&mut enumgen());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--types"), "{stderr}");
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn test_generates_file_in_package_dir() {
    let dir = package_dir();
    let output = run(enumgen().args(["--no-format", "-t", "Color", path_arg(dir.path())]));
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let written = fs::read_to_string(dir.path().join("color_enum.go")).unwrap();
    let header = written.lines().next().unwrap();
    assert_eq!(
        header,
        format!(
            "// Code generated by \"{} --no-format -t Color {}\"; DO NOT EDIT.",
            env!("CARGO_BIN_EXE_enumgen"),
            dir.path().display()
        )
    );
    assert!(written.contains("\npackage colors\n"));
    assert!(written.contains("func (r *Color) Scan(src interface{}) error {"));
}

#[test]
fn test_header_keeps_newline_arguments_on_one_line() {
    let dir = package_dir();
    let output = run(enumgen().args([
        "--no-format",
        "-t",
        "Color",
        "--tags",
        "a\npackage evil",
        path_arg(dir.path()),
    ]));
    assert!(output.status.success());

    let written = fs::read_to_string(dir.path().join("color_enum.go")).unwrap();
    let mut lines = written.lines();
    let header = lines.next().unwrap();
    assert!(header.contains("--tags a\\npackage evil"), "{header}");
    assert_eq!(lines.next(), Some(""));
    assert_eq!(lines.next(), Some("package colors"));
}

#[test]
fn test_types_from_environment() {
    let dir = package_dir();
    let output = run(enumgen()
        .env("ENUMGEN_TYPES", "Color")
        .args(["--no-format", path_arg(dir.path())]));
    assert!(output.status.success());
    assert!(dir.path().join("color_enum.go").is_file());
}

#[test]
fn test_stdout_mode_writes_nothing() {
    let dir = package_dir();
    let output = run(enumgen().args(["--stdout", "--no-format", "-t", "Color", path_arg(dir.path())]));
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("// Code generated by"), "{stdout}");
    assert!(stdout.contains("\t\t\"Green\": 2,"), "{stdout}");
    assert!(!dir.path().join("color_enum.go").exists());
}

#[test]
fn test_config_file_suffix() {
    let dir = package_dir();
    fs::write(
        dir.path().join("enumgen.toml"),
        "[generate]\nfile_suffix = \"_string\"\nformat = false\n",
    )
    .unwrap();

    let output = run(enumgen().args(["-t", "Color", path_arg(dir.path())]));
    assert!(output.status.success());
    assert!(dir.path().join("color_string.go").is_file());
    assert!(!dir.path().join("color_enum.go").exists());
}

#[test]
fn test_unsupported_type_fails() {
    let dir = package_dir();
    let output = run(enumgen().args(["--no-format", "-t", "Color,Ratio", path_arg(dir.path())]));
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("can't handle non-integer constant type Ratio"),
        "{stderr}"
    );
    // Types before the failure keep their output.
    assert!(dir.path().join("color_enum.go").is_file());
}

#[test]
fn test_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let output = run(enumgen().args(["-t", "Color", path_arg(&missing)]));
    assert!(!output.status.success());
}

#[test]
fn test_syntax_error_names_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.go"), "package colors\n\nconst (\n").unwrap();
    let output = run(enumgen().args(["-t", "Color", path_arg(dir.path())]));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.go"), "{stderr}");
}
