//! Go syntax tree, limited to what module-level resolution needs.
//!
//! Function bodies, variable initializers and composite type definitions are
//! skipped by the parser; only their names and extents are kept.

pub type Span = std::ops::Range<usize>;

/// One parsed `.go` file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
    /// Names used by the types and initializers of top-level variables.
    pub var_refs: Vec<Ident>,
}

impl SourceFile {
    /// Top-level constant declarations, in declaration order.
    pub fn const_groups(&self) -> impl Iterator<Item = &ConstGroup> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Const(group) => Some(group),
            _ => None,
        })
    }
}

/// An import declaration entry.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// Explicit local name (`f "fmt"`, `. "fmt"`, `_ "fmt"`).
    pub name: Option<String>,
    pub path: String,
    pub span: Span,
}

impl ImportSpec {
    /// The identifier the import binds in the file scope, if any.
    pub fn local_name(&self) -> Option<String> {
        match self.name.as_deref() {
            Some("_") | Some(".") => None,
            Some(name) => Some(name.to_string()),
            None => Some(default_import_name(&self.path)),
        }
    }
}

/// Guess the package name of an import path: its last element, without a
/// `.vN`/`-go` style suffix, and skipping a trailing major-version element.
fn default_import_name(path: &str) -> String {
    let mut parts = path.rsplit('/');
    let mut last = parts.next().unwrap_or(path);
    let is_major_version = |s: &str| {
        s.strip_prefix('v')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    };
    if is_major_version(last) {
        if let Some(prev) = parts.next() {
            last = prev;
        }
    }
    let last = last.split('.').next().unwrap_or(last);
    let last = last.strip_prefix("go-").unwrap_or(last);
    last.strip_suffix("-go").unwrap_or(last).replace('-', "_")
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Const(ConstGroup),
    Type(Vec<TypeSpec>),
    Var(Vec<VarSpec>),
    Func(FuncDecl),
}

/// A `const` declaration: a parenthesized group or a single spec.
#[derive(Debug, Clone)]
pub struct ConstGroup {
    pub grouped: bool,
    pub specs: Vec<ConstSpec>,
    pub span: Span,
}

/// One line of a constant group: `A, B T = 1, 2`.
#[derive(Debug, Clone)]
pub struct ConstSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    /// `type A = B`
    pub alias: bool,
    /// Declared with type parameters.
    pub generic: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone)]
pub struct VarSpec {
    pub names: Vec<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    /// Base type name of the receiver for methods.
    pub receiver: Option<String>,
}

/// A type expression as far as constant resolution cares about it.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Named(Ident),
    Qualified { package: Ident, name: Ident },
    Composite { kind: CompositeKind, span: Span },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named(ident) => ident.span.clone(),
            TypeExpr::Qualified { package, name } => package.span.start..name.span.end,
            TypeExpr::Composite { span, .. } => span.clone(),
        }
    }
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeExpr::Named(ident) => write!(f, "{}", ident.name),
            TypeExpr::Qualified { package, name } => write!(f, "{}.{}", package.name, name.name),
            TypeExpr::Composite { kind, .. } => write!(f, "{}", kind.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Pointer,
    Array,
    Slice,
    Struct,
    Interface,
    Map,
    Chan,
    Func,
    Instantiated,
}

impl CompositeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeKind::Pointer => "pointer",
            CompositeKind::Array => "array",
            CompositeKind::Slice => "slice",
            CompositeKind::Struct => "struct",
            CompositeKind::Interface => "interface",
            CompositeKind::Map => "map",
            CompositeKind::Chan => "chan",
            CompositeKind::Func => "func",
            CompositeKind::Instantiated => "generic instance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    Complement,
    Deref,
    Addr,
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    AndNot,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    /// Go operator precedence, 5 binds tightest.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::LogicalAnd => 2,
            BinaryOp::LogicalOr => 1,
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.precedence() == 3
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::AndNot => "&^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
        }
    }
}

/// An expression. Literals keep their source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int { text: String, span: Span },
    Float { text: String, span: Span },
    Imag { text: String, span: Span },
    Rune { text: String, span: Span },
    Str { text: String, span: Span },
    Ident(Ident),
    Selector { base: Box<Expr>, field: Ident },
    Call { func: Box<Expr>, args: Vec<Expr>, span: Span },
    Index { base: Box<Expr>, index: Box<Expr>, span: Span },
    Unary { op: UnaryOp, operand: Box<Expr>, span: Span },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    Paren { inner: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int { span, .. }
            | Expr::Float { span, .. }
            | Expr::Imag { span, .. }
            | Expr::Rune { span, .. }
            | Expr::Str { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Paren { span, .. } => span.clone(),
            Expr::Ident(ident) => ident.span.clone(),
            Expr::Selector { base, field } => base.span().start..field.span.end,
        }
    }
}
