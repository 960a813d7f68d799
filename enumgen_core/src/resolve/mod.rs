//! Module-level name resolution and constant evaluation.
//!
//! Every top-level name of the package is declared first, across all files,
//! so constants may refer to names declared later or in other files. Values
//! are then computed on demand and memoized, with cycle detection.

pub mod constant;
pub mod types;

pub use constant::{ConstValue, Constant};
pub use types::{BasicKind, Type};

use crate::error::{EnumgenError, Result};
use crate::go_parser::ast::{
    BinaryOp, CompositeKind, ConstGroup, Decl, Expr, Ident, TypeExpr, TypeSpec,
};
use crate::go_parser::lexer::{rune_value, string_value};
use crate::go_parser::line_col;
use crate::loader::SourceUnit;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

/// Position of a constant name in the module: file, top-level declaration,
/// spec within the group, and name within the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId {
    pub file: usize,
    pub decl: usize,
    pub spec: usize,
    pub name: usize,
}

#[derive(Debug, Clone)]
pub struct ConstObject {
    pub name: String,
    pub id: DeclId,
    pub constant: Constant,
}

/// What a package-level name denotes.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Const(DeclId),
    Type(Type),
    Var,
    Func,
}

/// The resolved package scope.
#[derive(Debug, Default)]
pub struct SymbolTable {
    objects: HashMap<String, Object>,
    constants: BTreeMap<DeclId, ConstObject>,
}

impl SymbolTable {
    /// The constant declared at `id`, including blank (`_`) constants.
    pub fn constant(&self, id: DeclId) -> Option<&ConstObject> {
        self.constants.get(&id)
    }

    pub fn constant_named(&self, name: &str) -> Option<&ConstObject> {
        match self.objects.get(name) {
            Some(Object::Const(id)) => self.constants.get(id),
            _ => None,
        }
    }
}

/// Resolve every top-level declaration of a package.
pub fn resolve(units: &[SourceUnit]) -> Result<SymbolTable> {
    let mut resolver = Resolver::new(units);
    resolver.declare()?;
    resolver.check_var_references()?;
    resolver.evaluate_all()?;
    debug!(
        constants = resolver.consts.len(),
        types = resolver.types.len(),
        "Resolved package scope"
    );
    Ok(resolver.finish())
}

#[derive(Debug, Clone, Copy)]
enum Binding {
    Const(DeclId),
    Type,
    Var,
    Func,
}

#[derive(Debug, Clone, Copy)]
struct PendingConst<'a> {
    name: &'a Ident,
    ty: Option<&'a TypeExpr>,
    expr: &'a Expr,
    iota: i128,
}

struct Resolver<'a> {
    units: &'a [SourceUnit],
    scope: HashMap<String, Binding>,
    /// Per file: local import name to import path.
    imports: Vec<HashMap<String, String>>,
    pending: BTreeMap<DeclId, PendingConst<'a>>,
    consts: BTreeMap<DeclId, ConstObject>,
    consts_in_progress: HashSet<DeclId>,
    type_specs: HashMap<String, (usize, &'a TypeSpec)>,
    types: HashMap<String, Type>,
    types_in_progress: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn new(units: &'a [SourceUnit]) -> Self {
        Self {
            units,
            scope: HashMap::new(),
            imports: Vec::new(),
            pending: BTreeMap::new(),
            consts: BTreeMap::new(),
            consts_in_progress: HashSet::new(),
            type_specs: HashMap::new(),
            types: HashMap::new(),
            types_in_progress: HashSet::new(),
        }
    }

    fn error_at(&self, file: usize, offset: usize, message: impl Into<String>) -> EnumgenError {
        let unit = &self.units[file];
        EnumgenError::resolve(&unit.path, line_col(&unit.source, offset), message)
    }

    fn declare(&mut self) -> Result<()> {
        let units = self.units;
        for (file, unit) in units.iter().enumerate() {
            let imports = unit
                .ast
                .imports
                .iter()
                .filter_map(|import| import.local_name().map(|name| (name, import.path.clone())))
                .collect();
            self.imports.push(imports);

            for (decl_index, decl) in unit.ast.decls.iter().enumerate() {
                match decl {
                    Decl::Const(group) => self.declare_const_group(file, decl_index, group)?,
                    Decl::Type(specs) => {
                        for spec in specs {
                            self.bind(file, &spec.name, Binding::Type)?;
                            if !spec.name.is_blank() {
                                self.type_specs.insert(spec.name.name.clone(), (file, spec));
                            }
                        }
                    }
                    Decl::Var(specs) => {
                        for name in specs.iter().flat_map(|spec| &spec.names) {
                            self.bind(file, name, Binding::Var)?;
                        }
                    }
                    Decl::Func(func) => {
                        if func.receiver.is_none() && func.name.name != "init" {
                            self.bind(file, &func.name, Binding::Func)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Declare the constants of one group, applying implicit repetition:
    /// a spec without values reuses the type and expressions of the last
    /// spec that had them, with its own `iota`.
    fn declare_const_group(&mut self, file: usize, decl: usize, group: &'a ConstGroup) -> Result<()> {
        let mut source = None;
        for (spec_index, spec) in group.specs.iter().enumerate() {
            if !spec.values.is_empty() {
                source = Some(spec);
            } else if spec.ty.is_some() {
                return Err(self.error_at(
                    file,
                    spec.span.start,
                    "const declaration cannot have type without expression",
                ));
            }
            let Some(source) = source else {
                return Err(self.error_at(
                    file,
                    spec.span.start,
                    "missing init expr for const declaration",
                ));
            };
            if spec.names.len() > source.values.len() {
                return Err(self.error_at(
                    file,
                    spec.span.start,
                    "missing init expr for const declaration",
                ));
            }
            if spec.names.len() < source.values.len() {
                return Err(self.error_at(file, spec.span.start, "extra init expr"));
            }

            for (name_index, name) in spec.names.iter().enumerate() {
                let id = DeclId {
                    file,
                    decl,
                    spec: spec_index,
                    name: name_index,
                };
                self.pending.insert(
                    id,
                    PendingConst {
                        name,
                        ty: source.ty.as_ref(),
                        expr: &source.values[name_index],
                        iota: spec_index as i128,
                    },
                );
                self.bind(file, name, Binding::Const(id))?;
            }
        }
        Ok(())
    }

    fn bind(&mut self, file: usize, ident: &Ident, binding: Binding) -> Result<()> {
        if ident.is_blank() {
            return Ok(());
        }
        if self.scope.contains_key(&ident.name) {
            return Err(self.error_at(
                file,
                ident.span.start,
                format!("{} redeclared in this block", ident.name),
            ));
        }
        self.scope.insert(ident.name.clone(), binding);
        Ok(())
    }

    /// Every name a package-level variable uses must be declared in the
    /// package, imported by its file, or predeclared.
    fn check_var_references(&self) -> Result<()> {
        for (file, unit) in self.units.iter().enumerate() {
            for ident in &unit.ast.var_refs {
                let name = ident.name.as_str();
                if self.scope.contains_key(name) || self.imports[file].contains_key(name) {
                    continue;
                }
                if name == "iota" {
                    return Err(self.error_at(
                        file,
                        ident.span.start,
                        "cannot use iota outside constant declaration",
                    ));
                }
                if !is_predeclared(name) {
                    return Err(self.error_at(file, ident.span.start, format!("undefined: {}", name)));
                }
            }
        }
        Ok(())
    }

    fn evaluate_all(&mut self) -> Result<()> {
        let type_names: Vec<String> = self.type_specs.keys().cloned().collect();
        for name in type_names {
            self.named_type(&name)?;
        }
        let ids: Vec<DeclId> = self.pending.keys().copied().collect();
        for id in ids {
            self.constant(id)?;
        }
        Ok(())
    }

    fn finish(self) -> SymbolTable {
        let objects = self
            .scope
            .iter()
            .map(|(name, binding)| {
                let object = match binding {
                    Binding::Const(id) => Object::Const(*id),
                    Binding::Type => match self.types.get(name) {
                        Some(ty) => Object::Type(ty.clone()),
                        None => Object::Type(Type::Opaque(name.clone())),
                    },
                    Binding::Var => Object::Var,
                    Binding::Func => Object::Func,
                };
                (name.clone(), object)
            })
            .collect();
        SymbolTable {
            objects,
            constants: self.consts,
        }
    }

    fn constant(&mut self, id: DeclId) -> Result<Constant> {
        if let Some(object) = self.consts.get(&id) {
            return Ok(object.constant.clone());
        }
        let Some(pending) = self.pending.get(&id).copied() else {
            return Err(self.error_at(id.file, 0, "internal error: unknown constant"));
        };
        if !self.consts_in_progress.insert(id) {
            return Err(self.error_at(
                id.file,
                pending.name.span.start,
                format!("initialization cycle: {} refers to itself", pending.name.name),
            ));
        }

        let value = self.eval(id.file, pending.iota, pending.expr)?;
        let constant = match pending.ty {
            Some(ty_expr) => {
                let ty = self.resolve_type_expr(id.file, ty_expr)?;
                if matches!(ty.underlying(), Type::Composite(_)) {
                    return Err(self.error_at(
                        id.file,
                        ty_expr.span().start,
                        format!("invalid constant type {}", ty_expr),
                    ));
                }
                constant::assign(value, &ty)
                    .map_err(|m| self.error_at(id.file, pending.expr.span().start, m))?
            }
            None => value,
        };

        trace!(name = %pending.name.name, value = %constant.value, ty = %constant.ty, "Evaluated constant");
        self.consts_in_progress.remove(&id);
        self.consts.insert(
            id,
            ConstObject {
                name: pending.name.name.clone(),
                id,
                constant: constant.clone(),
            },
        );
        Ok(constant)
    }

    fn eval(&mut self, file: usize, iota: i128, expr: &'a Expr) -> Result<Constant> {
        let start = expr.span().start;
        match expr {
            Expr::Int { text, .. } => constant::parse_int_literal(text)
                .map(Constant::untyped_int)
                .ok_or_else(|| self.error_at(file, start, format!("integer constant {} too large", text))),
            Expr::Float { text, .. } => constant::parse_float_literal(text)
                .map(|f| Constant::new(ConstValue::Float(f), Type::Basic(BasicKind::UntypedFloat)))
                .ok_or_else(|| self.error_at(file, start, format!("invalid float literal {}", text))),
            Expr::Imag { .. } => Err(self.error_at(file, start, "complex constants are not supported")),
            Expr::Rune { text, .. } => rune_value(text)
                .map(|v| Constant::new(ConstValue::Int(v as i128), Type::Basic(BasicKind::UntypedRune)))
                .ok_or_else(|| self.error_at(file, start, format!("invalid rune literal {}", text))),
            Expr::Str { text, .. } => string_value(text)
                .map(|s| Constant::new(ConstValue::Str(s), Type::Basic(BasicKind::UntypedString)))
                .ok_or_else(|| self.error_at(file, start, "invalid string literal")),
            Expr::Ident(ident) => self.eval_ident(file, iota, ident),
            Expr::Selector { base, field } => match self.import_path(file, base) {
                Some(package) => Ok(external(base, package, field)),
                None => Err(self.error_at(file, start, "selector expression is not constant")),
            },
            Expr::Call { func, args, .. } => self.eval_call(file, iota, func, args, start),
            Expr::Index { .. } => Err(self.error_at(file, start, "index expression is not constant")),
            Expr::Unary { op, operand, .. } => {
                let x = self.eval(file, iota, operand)?;
                constant::unary(*op, x).map_err(|m| self.error_at(file, start, m))
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                let x = self.eval(file, iota, lhs)?;
                let y = self.eval(file, iota, rhs)?;
                constant::binary(*op, x, y).map_err(|m| self.error_at(file, start, m))
            }
            Expr::Paren { inner, .. } => self.eval(file, iota, inner),
        }
    }

    fn eval_ident(&mut self, file: usize, iota: i128, ident: &Ident) -> Result<Constant> {
        let start = ident.span.start;
        let name = ident.name.as_str();
        if let Some(binding) = self.scope.get(name).copied() {
            return match binding {
                Binding::Const(id) => self.constant(id),
                Binding::Type => Err(self.error_at(file, start, format!("{} (type) is not an expression", name))),
                Binding::Var => Err(self.error_at(file, start, format!("{} (variable) is not constant", name))),
                Binding::Func => Err(self.error_at(file, start, format!("{} (func) is not constant", name))),
            };
        }
        if self.imports[file].contains_key(name) {
            return Err(self.error_at(file, start, format!("use of package {} without selector", name)));
        }
        match name {
            "true" => Ok(Constant::untyped_bool(true)),
            "false" => Ok(Constant::untyped_bool(false)),
            "iota" => Ok(Constant::untyped_int(iota)),
            "nil" => Err(self.error_at(file, start, "nil is not constant")),
            "_" => Err(self.error_at(file, start, "cannot use _ as value")),
            _ if BasicKind::from_name(name).is_some() => {
                Err(self.error_at(file, start, format!("{} (type) is not an expression", name)))
            }
            _ => Err(self.error_at(file, start, format!("undefined: {}", name))),
        }
    }

    fn eval_call(
        &mut self,
        file: usize,
        iota: i128,
        func: &'a Expr,
        args: &'a [Expr],
        start: usize,
    ) -> Result<Constant> {
        let mut callee = func;
        while let Expr::Paren { inner, .. } = callee {
            callee = inner;
        }
        match callee {
            Expr::Ident(ident) => {
                let name = ident.name.as_str();
                match self.scope.get(name).copied() {
                    Some(Binding::Type) => {
                        let ty = self.named_type(name)?;
                        return self.conversion(file, iota, ty, args, start);
                    }
                    Some(_) => {
                        return Err(self.error_at(file, start, format!("{}(...) is not constant", name)));
                    }
                    None => {}
                }
                if let Some(kind) = BasicKind::from_name(name) {
                    return self.conversion(file, iota, Type::Basic(kind), args, start);
                }
                match name {
                    "len" => self.builtin_len(file, iota, args, start),
                    "min" | "max" => self.builtin_min_max(file, iota, name == "min", args, start),
                    "complex" | "real" | "imag" => {
                        Err(self.error_at(file, start, "complex constants are not supported"))
                    }
                    _ if self.imports[file].contains_key(name) => {
                        Err(self.error_at(file, start, format!("use of package {} without selector", name)))
                    }
                    "append" | "cap" | "make" | "new" | "panic" | "print" | "println" | "recover" | "copy"
                    | "delete" | "close" | "clear" => {
                        Err(self.error_at(file, start, format!("{}(...) is not constant", name)))
                    }
                    _ => Err(self.error_at(file, start, format!("undefined: {}", name))),
                }
            }
            Expr::Selector { base, field } => match self.import_path(file, base) {
                Some(package) => Ok(external(base, package, field)),
                None => Err(self.error_at(file, start, "function call is not constant")),
            },
            _ => Err(self.error_at(file, start, "function call is not constant")),
        }
    }

    fn conversion(&mut self, file: usize, iota: i128, ty: Type, args: &'a [Expr], start: usize) -> Result<Constant> {
        let [arg] = args else {
            return Err(self.error_at(
                file,
                start,
                format!("wrong argument count in conversion to {}", ty),
            ));
        };
        let x = self.eval(file, iota, arg)?;
        constant::convert(x, &ty).map_err(|m| self.error_at(file, arg.span().start, m))
    }

    fn builtin_len(&mut self, file: usize, iota: i128, args: &'a [Expr], start: usize) -> Result<Constant> {
        let [arg] = args else {
            return Err(self.error_at(file, start, "wrong argument count for len"));
        };
        let x = self.eval(file, iota, arg)?;
        match &x.value {
            ConstValue::Str(s) => Ok(Constant::new(
                ConstValue::Int(s.len() as i128),
                Type::Basic(BasicKind::Int),
            )),
            _ => Err(self.error_at(file, start, format!("invalid argument {} for len", x.value))),
        }
    }

    fn builtin_min_max(
        &mut self,
        file: usize,
        iota: i128,
        is_min: bool,
        args: &'a [Expr],
        start: usize,
    ) -> Result<Constant> {
        let Some((first, rest)) = args.split_first() else {
            return Err(self.error_at(file, start, "not enough arguments for min/max"));
        };
        let mut best = self.eval(file, iota, first)?;
        for arg in rest {
            let next = self.eval(file, iota, arg)?;
            let op = if is_min { BinaryOp::Lt } else { BinaryOp::Gt };
            let better = constant::binary(op, next.clone(), best.clone())
                .map_err(|m| self.error_at(file, arg.span().start, m))?;
            let (chosen, other) = if better.value == ConstValue::Bool(true) {
                (next, best)
            } else {
                (best, next)
            };
            // A typed operand makes the result typed.
            best = if chosen.ty.is_untyped() && !other.ty.is_untyped() {
                constant::assign(chosen, &other.ty).map_err(|m| self.error_at(file, start, m))?
            } else {
                chosen
            };
        }
        Ok(best)
    }

    fn import_path(&self, file: usize, base: &Expr) -> Option<String> {
        let Expr::Ident(ident) = base else {
            return None;
        };
        if self.scope.contains_key(&ident.name) {
            return None;
        }
        self.imports[file].get(&ident.name).cloned()
    }

    fn resolve_type_expr(&mut self, file: usize, ty: &'a TypeExpr) -> Result<Type> {
        match ty {
            TypeExpr::Named(ident) => {
                let name = ident.name.as_str();
                match self.scope.get(name).copied() {
                    Some(Binding::Type) => return self.named_type(name),
                    Some(_) => {
                        return Err(self.error_at(file, ident.span.start, format!("{} is not a type", name)));
                    }
                    None => {}
                }
                if let Some(kind) = BasicKind::from_name(name) {
                    return Ok(Type::Basic(kind));
                }
                match name {
                    "error" | "any" | "comparable" => Ok(Type::Composite(CompositeKind::Interface)),
                    _ => Err(self.error_at(file, ident.span.start, format!("undefined: {}", name))),
                }
            }
            TypeExpr::Qualified { package, name } => {
                if self.imports[file].contains_key(&package.name) {
                    Ok(Type::Opaque(format!("{}.{}", package.name, name.name)))
                } else {
                    Err(self.error_at(file, package.span.start, format!("undefined: {}", package.name)))
                }
            }
            TypeExpr::Composite { kind, .. } => Ok(Type::Composite(*kind)),
        }
    }

    fn named_type(&mut self, name: &str) -> Result<Type> {
        if let Some(ty) = self.types.get(name) {
            return Ok(ty.clone());
        }
        let Some(&(file, spec)) = self.type_specs.get(name) else {
            return Ok(Type::Opaque(name.to_string()));
        };
        if !self.types_in_progress.insert(name.to_string()) {
            return Err(self.error_at(
                file,
                spec.name.span.start,
                format!("invalid recursive type {}", name),
            ));
        }

        let target = self.resolve_type_expr(file, &spec.ty)?;
        let ty = if spec.alias {
            target
        } else {
            Type::Named {
                name: name.to_string(),
                underlying: Box::new(target.underlying().clone()),
            }
        };
        self.types_in_progress.remove(name);
        self.types.insert(name.to_string(), ty.clone());
        Ok(ty)
    }
}

/// Names of the universe block other than `iota`.
fn is_predeclared(name: &str) -> bool {
    BasicKind::from_name(name).is_some()
        || matches!(
            name,
            "any"
                | "comparable"
                | "error"
                | "true"
                | "false"
                | "nil"
                | "append"
                | "cap"
                | "clear"
                | "close"
                | "complex"
                | "copy"
                | "delete"
                | "imag"
                | "len"
                | "make"
                | "max"
                | "min"
                | "new"
                | "panic"
                | "print"
                | "println"
                | "real"
                | "recover"
        )
}

/// A reference to a name exported by an imported package.
fn external(base: &Expr, package: String, field: &Ident) -> Constant {
    let qualifier = match base {
        Expr::Ident(ident) => ident.name.clone(),
        _ => package.clone(),
    };
    Constant::new(
        ConstValue::External {
            package,
            name: field.name.clone(),
        },
        Type::Opaque(format!("{}.{}", qualifier, field.name)),
    )
}
