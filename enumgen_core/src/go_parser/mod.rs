//! Go source parser for enumgen.
//!
//! Parses Go files at declaration granularity: the package clause, imports,
//! constant groups with their full expressions, type specs, and the names of
//! variables, functions and methods. Everything the resolver does not need
//! (function bodies, variable initializers, struct fields) is skipped with
//! bracket matching, and then checked as a whole by the [`syntax`] pass.
//!
//! # Example
//!
//! ```
//! use enumgen_core::go_parser::parse_go_source;
//!
//! let file = parse_go_source("package colors\n\nconst (\n\tRed Color = iota\n\tGreen\n)\n").unwrap();
//! assert_eq!(file.package, "colors");
//! assert_eq!(file.const_groups().count(), 1);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod syntax;

pub use ast::SourceFile;
pub use lexer::LexError;
pub use parser::ParseError;

/// Parse Go source code into a [`SourceFile`]. The whole file must be
/// syntactically valid, including the parts the AST does not keep.
pub fn parse_go_source(source: &str) -> Result<SourceFile, ParseError> {
    let mut file = parser::parse(source)?;
    file.var_refs = syntax::check(source)?;
    Ok(file)
}

/// Render a parse error as `line:col: message`.
pub fn describe_error(source: &str, error: &ParseError) -> String {
    match &error.span {
        Some(span) => {
            let (line, col) = line_col(source, span.start);
            format!("{}:{}: {}", line, col, error.message)
        }
        None => error.message.clone(),
    }
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let col = offset - before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1) + 1;
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "package p\nconst A = 1\n";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 10), (2, 1));
        assert_eq!(line_col(source, 16), (2, 7));
    }

    #[test]
    fn test_describe_error_reports_position() {
        let source = "package p\n\nconst A = )\n";
        let err = parse_go_source(source).unwrap_err();
        assert!(describe_error(source, &err).starts_with("3:11: "));
    }

    #[test]
    fn test_syntax_errors_outside_declarations() {
        let source = "package p\n\nconst A = 1\n\nfunc f() int { x := ; return x }\n";
        let err = parse_go_source(source).unwrap_err();
        assert!(err.message.starts_with("syntax error"), "{}", err.message);
        assert!(describe_error(source, &err).starts_with("5:"));
    }

    #[test]
    fn test_var_references_are_collected() {
        let file = parse_go_source("package p\n\nvar v = Undefined + 1\n").unwrap();
        assert_eq!(file.var_refs.len(), 1);
        assert_eq!(file.var_refs[0].name, "Undefined");
    }
}
