//! Go lexer using the logos crate.
//!
//! Newlines are lexed as tokens so that [`tokenize`] can apply Go's automatic
//! semicolon insertion before the parser sees the stream.

use logos::Logos;

/// Tokens for Go source files.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    // Keywords
    #[token("break")]
    Break,

    #[token("case")]
    Case,

    #[token("chan")]
    Chan,

    #[token("const")]
    Const,

    #[token("continue")]
    Continue,

    #[token("default")]
    Default,

    #[token("defer")]
    Defer,

    #[token("else")]
    Else,

    #[token("fallthrough")]
    Fallthrough,

    #[token("for")]
    For,

    #[token("func")]
    Func,

    #[token("go")]
    Go,

    #[token("goto")]
    Goto,

    #[token("if")]
    If,

    #[token("import")]
    Import,

    #[token("interface")]
    Interface,

    #[token("map")]
    Map,

    #[token("package")]
    Package,

    #[token("range")]
    Range,

    #[token("return")]
    Return,

    #[token("select")]
    Select,

    #[token("struct")]
    Struct,

    #[token("switch")]
    Switch,

    #[token("type")]
    Type,

    #[token("var")]
    Var,

    // Operators
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("^")]
    Caret,

    #[token("<<")]
    Shl,

    #[token(">>")]
    Shr,

    #[token("&^")]
    AndNot,

    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    AssignOp,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,

    #[token("<-")]
    Arrow,

    #[token("++")]
    Inc,

    #[token("--")]
    Dec,

    #[token("==")]
    EqEq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("=")]
    Assign,

    #[token("!")]
    Not,

    #[token("~")]
    Tilde,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token(":=")]
    Define,

    #[token("...")]
    Ellipsis,

    // Punctuation
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token("\n")]
    Newline,

    // Literals keep their source text; values are decoded by the resolver.
    #[regex(r"0[xX](_?[0-9a-fA-F])+", |lex| lex.slice().to_string())]
    #[regex(r"0[bB](_?[01])+", |lex| lex.slice().to_string())]
    #[regex(r"0[oO]?(_?[0-7])+", |lex| lex.slice().to_string())]
    #[regex(r"[1-9](_?[0-9])*|0", |lex| lex.slice().to_string())]
    IntLiteral(String),

    #[regex(r"[0-9](_?[0-9])*\.([0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?", |lex| lex.slice().to_string())]
    FloatLiteral(String),

    #[regex(r"[0-9](_?[0-9])*(\.([0-9](_?[0-9])*)?)?([eE][+-]?[0-9](_?[0-9])*)?i", |lex| lex.slice().to_string())]
    ImagLiteral(String),

    #[regex(r#"'([^'\\\n]|\\[abfnrtv\\'"]|\\[0-7][0-7][0-7]|\\x[0-9a-fA-F][0-9a-fA-F]|\\u[0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F]|\\U[0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F])'"#, |lex| lex.slice().to_string())]
    RuneLiteral(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    StringLiteral(String),

    #[regex(r"`[^`]*`", |lex| lex.slice().to_string())]
    RawStringLiteral(String),

    // Identifiers (keywords above take priority)
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Comments
    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", |lex| lex.slice().contains('\n'))]
    BlockComment(bool),
}

impl Token {
    /// Whether a line break after this token terminates the statement.
    fn ends_statement(&self) -> bool {
        matches!(
            self,
            Token::Identifier(_)
                | Token::IntLiteral(_)
                | Token::FloatLiteral(_)
                | Token::ImagLiteral(_)
                | Token::RuneLiteral(_)
                | Token::StringLiteral(_)
                | Token::RawStringLiteral(_)
                | Token::Break
                | Token::Continue
                | Token::Fallthrough
                | Token::Return
                | Token::Inc
                | Token::Dec
                | Token::RParen
                | Token::RBracket
                | Token::RBrace
        )
    }
}

/// A token with its span in the source.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Tokenize Go source, dropping comments and inserting semicolons where the
/// language inserts them.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut tokens: Vec<SpannedToken> = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Newline) | Ok(Token::BlockComment(true)) => {
                line_break(&mut tokens, lexer.span().start);
            }
            Ok(Token::LineComment) | Ok(Token::BlockComment(false)) => {}
            Ok(token) => tokens.push(SpannedToken {
                token,
                span: lexer.span(),
            }),
            Err(()) => {
                return Err(LexError {
                    span: lexer.span(),
                    message: format!(
                        "Unexpected token: '{}'",
                        &source[lexer.span().start..lexer.span().end.min(source.len())]
                    ),
                });
            }
        }
    }
    line_break(&mut tokens, source.len());

    Ok(tokens)
}

fn line_break(tokens: &mut Vec<SpannedToken>, at: usize) {
    if tokens.last().is_some_and(|t| t.token.ends_statement()) {
        tokens.push(SpannedToken {
            token: Token::Semicolon,
            span: at..at,
        });
    }
}

/// Lexer error.
#[derive(Debug, Clone)]
pub struct LexError {
    pub span: std::ops::Range<usize>,
    pub message: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lex error at {:?}: {}", self.span, self.message)
    }
}

impl std::error::Error for LexError {}

/// Decode one escape sequence following a backslash. Returns the decoded
/// value and whether it denotes a raw byte (`\x` and octal escapes) rather
/// than a code point.
fn unescape_one(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<(u32, bool)> {
    let escaped = chars.next()?;
    let decoded = match escaped {
        'a' => (0x07, false),
        'b' => (0x08, false),
        'f' => (0x0c, false),
        'n' => (0x0a, false),
        'r' => (0x0d, false),
        't' => (0x09, false),
        'v' => (0x0b, false),
        '\\' => (0x5c, false),
        '\'' => (0x27, false),
        '"' => (0x22, false),
        'x' => (read_radix(chars, 2, 16)?, true),
        'u' => (read_radix(chars, 4, 16)?, false),
        'U' => (read_radix(chars, 8, 16)?, false),
        d @ '0'..='7' => {
            let code = (d as u32 - '0' as u32) * 64 + read_radix(chars, 2, 8)?;
            if code > 255 {
                return None;
            }
            (code, true)
        }
        _ => return None,
    };
    Some(decoded)
}

fn read_radix(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    radix: u32,
) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * radix + chars.next()?.to_digit(radix)?;
    }
    Some(value)
}

/// Decode a string literal token (interpreted or raw) into its value.
pub fn string_value(literal: &str) -> Option<String> {
    if let Some(raw) = literal.strip_prefix('`') {
        return Some(raw.strip_suffix('`')?.replace('\r', ""));
    }
    let body = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut buf = [0u8; 4];
    while let Some(c) = chars.next() {
        if c != '\\' {
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match unescape_one(&mut chars)? {
            (byte, true) => bytes.push(byte as u8),
            (code, false) => {
                let ch = char::from_u32(code)?;
                bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8(bytes).ok()
}

/// Decode a rune literal token into its code point.
pub fn rune_value(literal: &str) -> Option<u32> {
    let body = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = body.chars().peekable();
    let value = match chars.next()? {
        '\\' => unescape_one(&mut chars)?.0,
        c => c as u32,
    };
    chars.next().is_none().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_tokenize_const_group() {
        let source = "const (\n\tRed Color = iota\n\tGreen\n)\n";

        let tokens = kinds(source);
        assert_eq!(
            tokens,
            vec![
                Token::Const,
                Token::LParen,
                Token::Identifier("Red".into()),
                Token::Identifier("Color".into()),
                Token::Assign,
                Token::Identifier("iota".into()),
                Token::Semicolon,
                Token::Identifier("Green".into()),
                Token::Semicolon,
                Token::RParen,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_operator() {
        let tokens = kinds("const X = 1 +\n 2\n");
        assert!(!tokens[..4].contains(&Token::Semicolon));
        assert_eq!(tokens.last(), Some(&Token::Semicolon));
    }

    #[test]
    fn test_comments_are_dropped() {
        let tokens = kinds("const A = 1 // trailing\n/* block */ const B = 2");
        assert_eq!(
            tokens.iter().filter(|t| matches!(t, Token::Const)).count(),
            2
        );
        assert!(
            !tokens
                .iter()
                .any(|t| matches!(t, Token::LineComment | Token::BlockComment(_)))
        );
    }

    #[test]
    fn test_multiline_block_comment_inserts_semicolon() {
        let tokens = kinds("x /* one\ntwo */ y");
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("x".into()),
                Token::Semicolon,
                Token::Identifier("y".into()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        let tokens = kinds("0x1F 0b101 0o17 017 1_000 1.5 .5 1e3 2i");
        assert_eq!(tokens[0], Token::IntLiteral("0x1F".into()));
        assert_eq!(tokens[1], Token::IntLiteral("0b101".into()));
        assert_eq!(tokens[2], Token::IntLiteral("0o17".into()));
        assert_eq!(tokens[3], Token::IntLiteral("017".into()));
        assert_eq!(tokens[4], Token::IntLiteral("1_000".into()));
        assert_eq!(tokens[5], Token::FloatLiteral("1.5".into()));
        assert_eq!(tokens[6], Token::FloatLiteral(".5".into()));
        assert_eq!(tokens[7], Token::FloatLiteral("1e3".into()));
        assert_eq!(tokens[8], Token::ImagLiteral("2i".into()));
    }

    #[test]
    fn test_string_and_rune_values() {
        assert_eq!(string_value(r#""a\tb""#).as_deref(), Some("a\tb"));
        assert_eq!(string_value(r#""\x41é""#).as_deref(), Some("Aé"));
        assert_eq!(string_value("`raw\\n`").as_deref(), Some("raw\\n"));
        assert_eq!(rune_value("'a'"), Some(97));
        assert_eq!(rune_value(r"'\n'"), Some(10));
        assert_eq!(rune_value(r"'\377'"), Some(255));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("const A = 1 $").unwrap_err();
        assert!(err.message.contains('$'));
    }
}
