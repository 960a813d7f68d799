//! Build constraint evaluation: `_GOOS_GOARCH` file name suffixes,
//! `//go:build` expressions and legacy `// +build` lines.

use crate::error::{EnumgenError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js",
    "linux", "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips",
    "mipsle", "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le",
    "riscv", "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\|\||&&|!|\(|\)|[\p{L}\p{Nd}_.]+)").expect("Invalid build tag regex")
});

/// The target a package is loaded for.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
    pub tags: HashSet<String>,
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>, tags: &[String]) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            tags: tags.iter().cloned().collect(),
        }
    }

    /// Whether a single build tag is satisfied.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || self.tags.contains(tag) {
            return true;
        }
        match tag {
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            "gc" => true,
            // Release tags: every go1.N is considered satisfied.
            _ => tag
                .strip_prefix("go1.")
                .is_some_and(|minor| !minor.is_empty() && minor.chars().all(|c| c.is_ascii_digit())),
        }
    }

    /// Apply the `name_GOOS_GOARCH.go` convention.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let Some(index) = stem.find('_') else {
            return true;
        };
        let mut parts: Vec<&str> = stem[index + 1..].split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_tag(parts[n - 2]) && self.matches_tag(parts[n - 1]);
        }
        match parts.last() {
            Some(last) if KNOWN_OS.contains(last) || KNOWN_ARCH.contains(last) => self.matches_tag(last),
            _ => true,
        }
    }

    /// Evaluate the build constraints in the header of a file. A
    /// `//go:build` line wins over `// +build` lines.
    pub fn matches_source(&self, path: &Path, source: &str) -> Result<bool> {
        let mut go_build = None;
        let mut plus_build = Vec::new();
        let mut in_block = false;

        for line in source.lines() {
            let line = line.trim();
            if in_block {
                if line.contains("*/") {
                    in_block = false;
                }
                continue;
            }
            if line.is_empty() {
                continue;
            }
            if line.starts_with("/*") {
                in_block = !line.contains("*/");
                continue;
            }
            let Some(comment) = line.strip_prefix("//") else {
                break;
            };
            if let Some(expr) = comment.strip_prefix("go:build") {
                if go_build.is_some() {
                    return Err(EnumgenError::parse_error(path, "multiple //go:build comments"));
                }
                go_build = Some(expr.trim().to_string());
            } else if let Some(expr) = comment.trim_start().strip_prefix("+build") {
                plus_build.push(expr.trim().to_string());
            }
        }

        if let Some(expr) = go_build {
            let constraint = Constraint::parse(&expr)
                .map_err(|message| EnumgenError::parse_error(path, format!("invalid //go:build line: {}", message)))?;
            return Ok(constraint.eval(self));
        }
        Ok(plus_build.iter().all(|line| self.matches_plus_build(line)))
    }

    /// `// +build a,b c` means `(a && b) || c`.
    fn matches_plus_build(&self, line: &str) -> bool {
        line.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !self.matches_tag(tag),
                None => self.matches_tag(term),
            })
        })
    }
}

/// A parsed `//go:build` expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Tag(String),
    Not(Box<Constraint>),
    And(Box<Constraint>, Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
}

impl Constraint {
    pub fn parse(expr: &str) -> std::result::Result<Self, String> {
        let mut tokens = Vec::new();
        let mut rest = expr;
        while !rest.trim().is_empty() {
            let Some(caps) = TOKEN_RE.captures(rest) else {
                return Err(format!("unexpected text {:?}", rest.trim()));
            };
            let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            tokens.push(token.as_str().to_string());
            rest = &rest[whole.end()..];
        }

        let mut parser = ConstraintParser { tokens, pos: 0 };
        let constraint = parser.parse_or()?;
        match parser.tokens.get(parser.pos) {
            Some(extra) => Err(format!("unexpected {:?}", extra)),
            None => Ok(constraint),
        }
    }

    pub fn eval(&self, ctx: &BuildContext) -> bool {
        match self {
            Constraint::Tag(tag) => ctx.matches_tag(tag),
            Constraint::Not(inner) => !inner.eval(ctx),
            Constraint::And(lhs, rhs) => lhs.eval(ctx) && rhs.eval(ctx),
            Constraint::Or(lhs, rhs) => lhs.eval(ctx) || rhs.eval(ctx),
        }
    }
}

struct ConstraintParser {
    tokens: Vec<String>,
    pos: usize,
}

impl ConstraintParser {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> std::result::Result<Constraint, String> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some("||") {
            self.pos += 1;
            let rhs = self.parse_and()?;
            lhs = Constraint::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> std::result::Result<Constraint, String> {
        let mut lhs = self.parse_not()?;
        while self.peek() == Some("&&") {
            self.pos += 1;
            let rhs = self.parse_not()?;
            lhs = Constraint::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> std::result::Result<Constraint, String> {
        if self.peek() == Some("!") {
            self.pos += 1;
            return Ok(Constraint::Not(Box::new(self.parse_not()?)));
        }
        match self.next() {
            Some(token) if token == "(" => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(close) if close == ")" => Ok(inner),
                    _ => Err("missing )".to_string()),
                }
            }
            Some(token) if !matches!(token.as_str(), ")" | "&&" | "||") => Ok(Constraint::Tag(token)),
            Some(token) => Err(format!("unexpected {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_amd64() -> BuildContext {
        BuildContext::new("linux", "amd64", &["integration".to_string()])
    }

    #[test]
    fn test_file_name_suffixes() {
        let ctx = linux_amd64();
        assert!(ctx.matches_file_name("color.go"));
        assert!(ctx.matches_file_name("linux.go"));
        assert!(ctx.matches_file_name("color_linux.go"));
        assert!(ctx.matches_file_name("color_linux_amd64.go"));
        assert!(ctx.matches_file_name("color_amd64_test.go"));
        assert!(!ctx.matches_file_name("color_windows.go"));
        assert!(!ctx.matches_file_name("color_linux_arm64.go"));
        assert!(!ctx.matches_file_name("color_darwin_test.go"));
    }

    #[test]
    fn test_go_build_expressions() {
        let ctx = linux_amd64();
        let eval = |expr: &str| Constraint::parse(expr).unwrap().eval(&ctx);
        assert!(eval("linux"));
        assert!(eval("linux && amd64"));
        assert!(eval("!windows"));
        assert!(eval("(darwin || linux) && !386"));
        assert!(eval("integration"));
        assert!(eval("unix && go1.21"));
        assert!(!eval("ignore"));
        assert!(!eval("linux && !amd64"));
    }

    #[test]
    fn test_precedence_and_binds_tighter() {
        let parsed = Constraint::parse("a || b && c").unwrap();
        assert_eq!(
            parsed,
            Constraint::Or(
                Box::new(Constraint::Tag("a".into())),
                Box::new(Constraint::And(
                    Box::new(Constraint::Tag("b".into())),
                    Box::new(Constraint::Tag("c".into()))
                ))
            )
        );
    }

    #[test]
    fn test_invalid_expressions() {
        assert!(Constraint::parse("linux &&").is_err());
        assert!(Constraint::parse("(linux").is_err());
        assert!(Constraint::parse("linux darwin").is_err());
        assert!(Constraint::parse("linux $").is_err());
    }

    #[test]
    fn test_header_lines() {
        let ctx = linux_amd64();
        let path = Path::new("x.go");
        assert!(ctx.matches_source(path, "package p\n").unwrap());
        assert!(!ctx.matches_source(path, "//go:build ignore\n\npackage p\n").unwrap());
        assert!(ctx.matches_source(path, "// Copyright\n\n//go:build linux\n\npackage p\n").unwrap());
        assert!(!ctx.matches_source(path, "// +build windows darwin\n\npackage p\n").unwrap());
        assert!(ctx.matches_source(path, "// +build windows linux,amd64\n\npackage p\n").unwrap());
        // Comments after the package clause are not constraints.
        assert!(ctx.matches_source(path, "package p\n\n//go:build ignore\n").unwrap());
        assert!(ctx.matches_source(path, "//go:build linux\n// +build windows\n\npackage p\n").unwrap());
    }
}
