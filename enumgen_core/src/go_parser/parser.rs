//! Go parser - converts tokens to the declaration-level AST.

use super::ast::{
    BinaryOp, CompositeKind, ConstGroup, ConstSpec, Decl, Expr, FuncDecl, Ident, ImportSpec,
    SourceFile, TypeExpr, TypeSpec, UnaryOp, VarSpec,
};
use super::lexer::{LexError, SpannedToken, Token};

/// Parse error with location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Option<std::ops::Range<usize>>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref span) = self.span {
            write!(f, "Parse error at {:?}: {}", span, self.message)
        } else {
            write!(f, "Parse error: {}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message,
            span: Some(e.span),
        }
    }
}

/// Parser state.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a complete Go source file.
    pub fn parse(&mut self) -> Result<SourceFile, ParseError> {
        let mut file = SourceFile::default();

        self.expect(Token::Package)?;
        file.package = self.expect_identifier()?.name;
        self.expect_terminator()?;

        while self.check(&Token::Import) {
            file.imports.extend(self.parse_import_decl()?);
            self.expect_terminator()?;
        }

        while !self.is_at_end() {
            let decl = match self.peek() {
                Some(Token::Const) => Decl::Const(self.parse_const_decl()?),
                Some(Token::Type) => Decl::Type(self.parse_type_decl()?),
                Some(Token::Var) => Decl::Var(self.parse_var_decl()?),
                Some(Token::Func) => Decl::Func(self.parse_func_decl()?),
                Some(Token::Semicolon) => {
                    self.advance();
                    continue;
                }
                Some(Token::Import) => {
                    return Err(self.error("imports must appear before other declarations"));
                }
                _ => return Err(self.error("non-declaration statement outside function body")),
            };
            file.decls.push(decl);
            self.expect_terminator()?;
        }

        Ok(file)
    }

    fn parse_import_decl(&mut self) -> Result<Vec<ImportSpec>, ParseError> {
        self.expect(Token::Import)?;
        let (specs, _) = self.parse_group(Self::parse_import_spec)?;
        Ok(specs)
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let start = self.current_start();
        let name = match self.peek() {
            Some(Token::Identifier(_)) => Some(self.expect_identifier()?.name),
            Some(Token::Dot) => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };
        let path = match self.advance() {
            Some(SpannedToken {
                token: Token::StringLiteral(lit) | Token::RawStringLiteral(lit),
                ..
            }) => super::lexer::string_value(&lit)
                .ok_or_else(|| self.error_before("invalid import path"))?,
            _ => return Err(self.error_before("expected import path")),
        };
        Ok(ImportSpec {
            name,
            path,
            span: start..self.previous_end(),
        })
    }

    fn parse_const_decl(&mut self) -> Result<ConstGroup, ParseError> {
        let start = self.current_start();
        self.expect(Token::Const)?;
        let (specs, grouped) = self.parse_group(Self::parse_const_spec)?;
        Ok(ConstGroup {
            grouped,
            specs,
            span: start..self.previous_end(),
        })
    }

    fn parse_const_spec(&mut self) -> Result<ConstSpec, ParseError> {
        let start = self.current_start();
        let names = self.parse_ident_list()?;

        let ty = if matches!(
            self.peek(),
            Some(Token::Assign | Token::Semicolon | Token::RParen) | None
        ) {
            None
        } else {
            Some(self.parse_type()?)
        };

        let values = if self.check(&Token::Assign) {
            self.advance();
            self.parse_expr_list()?
        } else {
            Vec::new()
        };

        Ok(ConstSpec {
            names,
            ty,
            values,
            span: start..self.previous_end(),
        })
    }

    fn parse_type_decl(&mut self) -> Result<Vec<TypeSpec>, ParseError> {
        self.expect(Token::Type)?;
        let (specs, _) = self.parse_group(Self::parse_type_spec)?;
        Ok(specs)
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let name = self.expect_identifier()?;

        // `type S[T any] ...` declares type parameters, `type A [N]int` is an array
        let generic = self.check(&Token::LBracket)
            && matches!(self.peek_at(1), Some(Token::Identifier(_)))
            && !matches!(self.peek_at(2), Some(Token::RBracket));
        if generic {
            self.skip_balanced()?;
        }

        let alias = self.check(&Token::Assign);
        if alias {
            self.advance();
        }
        let ty = self.parse_type()?;

        Ok(TypeSpec {
            name,
            alias,
            generic,
            ty,
        })
    }

    fn parse_var_decl(&mut self) -> Result<Vec<VarSpec>, ParseError> {
        self.expect(Token::Var)?;
        let (specs, _) = self.parse_group(Self::parse_var_spec)?;
        Ok(specs)
    }

    fn parse_var_spec(&mut self) -> Result<VarSpec, ParseError> {
        let start = self.current_start();
        let names = self.parse_ident_list()?;
        // The type and initializer never hold constants; skip them.
        self.skip_until_spec_end(false)?;
        Ok(VarSpec {
            names,
            span: start..self.previous_end(),
        })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        self.expect(Token::Func)?;

        let receiver = if self.check(&Token::LParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };
        let name = self.expect_identifier()?;

        // Signature, then an optional body
        let mut open = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(Token::Semicolon) if open.is_empty() => break,
                Some(Token::LBrace) if open.is_empty() => {
                    self.skip_balanced()?;
                    break;
                }
                Some(Token::Struct | Token::Interface) if open.is_empty() => {
                    self.advance();
                    if self.check(&Token::LBrace) {
                        self.skip_balanced()?;
                    }
                }
                Some(_) => {
                    self.track_bracket(&mut open)?;
                    self.advance();
                }
            }
        }

        Ok(FuncDecl { name, receiver })
    }

    /// Parse `(r *T)` / `(T)` / `(s Set[K])` and return the base type name.
    fn parse_receiver(&mut self) -> Result<String, ParseError> {
        self.expect(Token::LParen)?;
        let mut depth = 0usize;
        let mut base = None;
        let mut frozen = false;
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated method receiver")),
                Some(SpannedToken {
                    token: Token::RParen,
                    ..
                }) if depth == 0 => break,
                Some(SpannedToken {
                    token: Token::Identifier(name),
                    ..
                }) if depth == 0 && !frozen => base = Some(name),
                Some(SpannedToken {
                    token: Token::LBracket,
                    ..
                }) if depth == 0 => {
                    frozen = true;
                    depth += 1;
                }
                Some(SpannedToken {
                    token: Token::LParen | Token::LBracket | Token::LBrace,
                    ..
                }) => depth += 1,
                Some(SpannedToken {
                    token: Token::RParen | Token::RBracket | Token::RBrace,
                    ..
                }) => depth = depth.saturating_sub(1),
                Some(_) => {}
            }
        }
        base.ok_or_else(|| self.error_before("method has no receiver type"))
    }

    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.current_start();
        let kind = match self.peek() {
            Some(Token::Identifier(_)) => {
                let first = self.expect_identifier()?;
                let ty = if self.check(&Token::Dot) {
                    self.advance();
                    let name = self.expect_identifier()?;
                    TypeExpr::Qualified {
                        package: first,
                        name,
                    }
                } else {
                    TypeExpr::Named(first)
                };
                if self.check(&Token::LBracket) {
                    self.skip_balanced()?;
                    return Ok(TypeExpr::Composite {
                        kind: CompositeKind::Instantiated,
                        span: start..self.previous_end(),
                    });
                }
                return Ok(ty);
            }
            Some(Token::LParen) => {
                self.advance();
                let ty = self.parse_type()?;
                self.expect(Token::RParen)?;
                return Ok(ty);
            }
            Some(Token::Star) => CompositeKind::Pointer,
            Some(Token::LBracket) => {
                if matches!(self.peek_at(1), Some(Token::RBracket)) {
                    CompositeKind::Slice
                } else {
                    CompositeKind::Array
                }
            }
            Some(Token::Struct) => CompositeKind::Struct,
            Some(Token::Interface) => CompositeKind::Interface,
            Some(Token::Map) => CompositeKind::Map,
            Some(Token::Chan | Token::Arrow) => CompositeKind::Chan,
            Some(Token::Func) => CompositeKind::Func,
            _ => return Err(self.error("expected type")),
        };

        self.skip_until_spec_end(true)?;
        Ok(TypeExpr::Composite {
            kind,
            span: start..self.previous_end(),
        })
    }

    fn parse_ident_list(&mut self) -> Result<Vec<Ident>, ParseError> {
        let mut names = vec![self.expect_identifier()?];
        while self.check(&Token::Comma) {
            self.advance();
            names.push(self.expect_identifier()?);
        }
        Ok(names)
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.check(&Token::Comma) {
            self.advance();
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.peek().and_then(binary_op) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(prec + 1)?;
            let span = lhs.span().start..rhs.span().end;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Caret) => UnaryOp::Complement,
            Some(Token::Star) => UnaryOp::Deref,
            Some(Token::Amp) => UnaryOp::Addr,
            Some(Token::Arrow) => UnaryOp::Recv,
            _ => return self.parse_primary(),
        };
        let start = self.current_start();
        self.advance();
        let operand = self.parse_unary()?;
        let span = start..operand.span().end;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_operand()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    if self.check(&Token::LParen) {
                        return Err(self.error("type assertions are not constant expressions"));
                    }
                    let field = self.expect_identifier()?;
                    expr = Expr::Selector {
                        base: Box::new(expr),
                        field,
                    };
                }
                Some(Token::LParen) => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.check(&Token::RParen) {
                        args.push(self.parse_expr()?);
                        if self.check(&Token::Ellipsis) {
                            self.advance();
                        }
                        if !self.check(&Token::Comma) {
                            break;
                        }
                        self.advance();
                    }
                    self.expect(Token::RParen)?;
                    let span = expr.span().start..self.previous_end();
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        span,
                    };
                }
                Some(Token::LBracket) => {
                    self.advance();
                    let index = self.parse_expr()?;
                    if self.check(&Token::Colon) {
                        return Err(self.error("slice expressions are not constant expressions"));
                    }
                    self.expect(Token::RBracket)?;
                    let span = expr.span().start..self.previous_end();
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let Some(SpannedToken { token, span }) = self.advance() else {
            return Err(self.error("unexpected end of input, expected expression"));
        };
        let expr = match token {
            Token::IntLiteral(text) => Expr::Int { text, span },
            Token::FloatLiteral(text) => Expr::Float { text, span },
            Token::ImagLiteral(text) => Expr::Imag { text, span },
            Token::RuneLiteral(text) => Expr::Rune { text, span },
            Token::StringLiteral(text) | Token::RawStringLiteral(text) => Expr::Str { text, span },
            Token::Identifier(name) => Expr::Ident(Ident { name, span }),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Expr::Paren {
                    inner: Box::new(inner),
                    span: span.start..self.previous_end(),
                }
            }
            _ => return Err(self.error_before("expected expression")),
        };
        Ok(expr)
    }

    /// Parse either `(spec; spec; ...)` or a single spec.
    fn parse_group<T>(
        &mut self,
        mut parse_spec: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(Vec<T>, bool), ParseError> {
        if !self.check(&Token::LParen) {
            return Ok((vec![parse_spec(self)?], false));
        }

        self.advance();
        let mut specs = Vec::new();
        while !self.check(&Token::RParen) {
            if self.is_at_end() {
                return Err(self.error("unexpected end of input in declaration group"));
            }
            specs.push(parse_spec(self)?);
            if self.check(&Token::Semicolon) {
                self.advance();
            } else if !self.check(&Token::RParen) {
                return Err(self.error("expected ';' or ')' in declaration group"));
            }
        }
        self.expect(Token::RParen)?;
        Ok((specs, true))
    }

    /// Skip tokens up to (not including) a `;`, an unmatched closer, or
    /// optionally an `=`, at nesting depth zero.
    fn skip_until_spec_end(&mut self, stop_at_assign: bool) -> Result<(), ParseError> {
        let mut open = Vec::new();
        loop {
            match self.peek() {
                None if open.is_empty() => return Ok(()),
                None => return Err(self.error("unexpected end of input, unbalanced brackets")),
                Some(Token::Semicolon) if open.is_empty() => return Ok(()),
                Some(Token::Assign) if open.is_empty() && stop_at_assign => return Ok(()),
                Some(Token::RParen | Token::RBracket | Token::RBrace) if open.is_empty() => {
                    return Ok(());
                }
                Some(_) => self.track_bracket(&mut open)?,
            }
            self.advance();
        }
    }

    /// Skip a bracketed run starting at the current `(`, `[` or `{`.
    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        let mut open = Vec::new();
        loop {
            if self.is_at_end() {
                return Err(self.error("unexpected end of input, unbalanced brackets"));
            }
            self.track_bracket(&mut open)?;
            self.advance();
            if open.is_empty() {
                return Ok(());
            }
        }
    }

    /// Push the current token if it opens a bracket, pop if it closes one.
    /// A closer must match the innermost opener.
    fn track_bracket(&self, open: &mut Vec<Token>) -> Result<(), ParseError> {
        let expected = match self.peek() {
            Some(opener @ (Token::LParen | Token::LBracket | Token::LBrace)) => {
                open.push(opener.clone());
                return Ok(());
            }
            Some(Token::RParen) => Token::LParen,
            Some(Token::RBracket) => Token::LBracket,
            Some(Token::RBrace) => Token::LBrace,
            _ => return Ok(()),
        };
        match open.pop() {
            Some(opener) if opener == expected => Ok(()),
            Some(opener) => Err(self.error(&format!(
                "unexpected {}, expected {}",
                bracket_text(&expected, true),
                bracket_text(&opener, true)
            ))),
            None => Err(self.error(&format!("unexpected {}", bracket_text(&expected, true)))),
        }
    }

    // Helper methods

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        if self.is_at_end() {
            None
        } else {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(token)
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek()
            .map(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
            .unwrap_or(false)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("Expected {:?}", expected)))
        }
    }

    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        if self.is_at_end() {
            return Ok(());
        }
        self.expect(Token::Semicolon)
            .map_err(|_| self.error("expected ';' after top level declaration"))
    }

    fn expect_identifier(&mut self) -> Result<Ident, ParseError> {
        match self.advance() {
            Some(SpannedToken {
                token: Token::Identifier(name),
                span,
            }) => Ok(Ident { name, span }),
            _ => Err(self.error_before("Expected identifier")),
        }
    }

    fn current_start(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.span.start)
            .unwrap_or_else(|| self.previous_end())
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            span: self.tokens.get(self.pos).map(|t| t.span.clone()),
        }
    }

    /// Error pointing at the token just consumed.
    fn error_before(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            span: self
                .pos
                .checked_sub(1)
                .and_then(|i| self.tokens.get(i))
                .map(|t| t.span.clone()),
        }
    }
}

/// Source text of a bracket, or of the bracket closing it.
fn bracket_text(opener: &Token, closing: bool) -> &'static str {
    match (opener, closing) {
        (Token::LParen, false) => "(",
        (Token::LParen, true) => ")",
        (Token::LBracket, false) => "[",
        (Token::LBracket, true) => "]",
        (Token::LBrace, false) => "{",
        _ => "}",
    }
}

fn binary_op(token: &Token) -> Option<BinaryOp> {
    let op = match token {
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Percent => BinaryOp::Rem,
        Token::Amp => BinaryOp::And,
        Token::Pipe => BinaryOp::Or,
        Token::Caret => BinaryOp::Xor,
        Token::AndNot => BinaryOp::AndNot,
        Token::Shl => BinaryOp::Shl,
        Token::Shr => BinaryOp::Shr,
        Token::EqEq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::Ne,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::Le,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::Ge,
        Token::AndAnd => BinaryOp::LogicalAnd,
        Token::OrOr => BinaryOp::LogicalOr,
        _ => return None,
    };
    Some(op)
}

/// Parse Go source to AST.
pub fn parse(source: &str) -> Result<SourceFile, ParseError> {
    use super::lexer::tokenize;

    let tokens = tokenize(source)?;

    let mut parser = Parser::new(tokens);
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_const_group() {
        let source = r#"
package colors

const (
	Red Color = iota
	Green
	Blue = 5
	_
)
"#;

        let file = parse(source).unwrap();
        assert_eq!(file.package, "colors");
        let groups: Vec<_> = file.const_groups().collect();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].grouped);
        let specs = &groups[0].specs;
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].names[0].name, "Red");
        assert!(matches!(&specs[0].ty, Some(TypeExpr::Named(t)) if t.name == "Color"));
        assert_eq!(specs[0].values.len(), 1);
        assert!(specs[1].ty.is_none() && specs[1].values.is_empty());
        assert!(specs[2].ty.is_none() && specs[2].values.len() == 1);
        assert!(specs[3].names[0].is_blank());
    }

    #[test]
    fn test_parse_single_const_and_multiple_names() {
        let source = "package p\nconst A, B uint8 = 1, 2\n";

        let file = parse(source).unwrap();
        let group = file.const_groups().next().unwrap();
        assert!(!group.grouped);
        assert_eq!(group.specs[0].names.len(), 2);
        assert_eq!(group.specs[0].values.len(), 2);
    }

    #[test]
    fn test_parse_imports() {
        let source = r#"
package p

import "fmt"

import (
	j "encoding/json"
	_ "embed"
)
"#;

        let file = parse(source).unwrap();
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].path, "fmt");
        assert_eq!(file.imports[1].name.as_deref(), Some("j"));
        assert_eq!(file.imports[2].local_name(), None);
    }

    #[test]
    fn test_parse_types_vars_and_funcs() {
        let source = r#"
package p

type (
	Color uint8
	Alias = Color
	Point struct {
		X, Y int
	}
	Set[T comparable] map[T]struct{}
	Grid [4]int
)

var (
	names = map[Color]string{Red: "red"}
	count int
)

func (c Color) String() string {
	if c == 0 {
		return "zero"
	}
	return names[c]
}

func (s *Set[T]) Add(v T) {}

func helper() interface{} { return nil }
"#;

        let file = parse(source).unwrap();
        let Decl::Type(types) = &file.decls[0] else {
            panic!("expected type decl");
        };
        assert_eq!(types.len(), 5);
        assert!(matches!(&types[0].ty, TypeExpr::Named(t) if t.name == "uint8"));
        assert!(types[1].alias);
        assert!(matches!(
            types[2].ty,
            TypeExpr::Composite {
                kind: CompositeKind::Struct,
                ..
            }
        ));
        assert!(types[3].generic);
        assert!(!types[4].generic);

        let Decl::Var(vars) = &file.decls[1] else {
            panic!("expected var decl");
        };
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].names[0].name, "names");

        let funcs: Vec<_> = file
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Func(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(funcs.len(), 3);
        assert_eq!(funcs[0].receiver.as_deref(), Some("Color"));
        assert_eq!(funcs[0].name.name, "String");
        assert_eq!(funcs[1].receiver.as_deref(), Some("Set"));
        assert_eq!(funcs[2].receiver, None);
    }

    #[test]
    fn test_expression_precedence() {
        let source = "package p\nconst X = 1 + 2*3 << 1\n";

        let file = parse(source).unwrap();
        let value = &file.const_groups().next().unwrap().specs[0].values[0];
        let Expr::Binary { op, rhs, .. } = value else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(**rhs, Expr::Binary { op: BinaryOp::Shl, .. }));
    }

    #[test]
    fn test_mismatched_brackets_in_skipped_code() {
        let err = parse("package p\n\nfunc f() { g( ] }\n").unwrap_err();
        assert_eq!(err.message, "unexpected ], expected )");

        let err = parse("package p\n\nvar v = []int{1, 2)\n").unwrap_err();
        assert_eq!(err.message, "unexpected ), expected }");
    }

    #[test]
    fn test_unterminated_function_body() {
        let err = parse("package p\n\nfunc f() {\n\treturn\n").unwrap_err();
        assert!(err.message.contains("unbalanced brackets"), "{}", err.message);
    }

    #[test]
    fn test_missing_package_clause() {
        let err = parse("const A = 1").unwrap_err();
        assert!(err.message.contains("Package"));
    }
}
