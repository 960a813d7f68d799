//! Resolved Go types.

use crate::go_parser::ast::CompositeKind;

/// Predeclared basic types, plus the kinds of untyped constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedString,
}

impl BasicKind {
    /// Look up a predeclared type name. `byte` and `rune` are aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "rune" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            "string" => Self::String,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
            Self::UntypedBool => "untyped bool",
            Self::UntypedInt => "untyped int",
            Self::UntypedRune => "untyped rune",
            Self::UntypedFloat => "untyped float",
            Self::UntypedString => "untyped string",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uintptr
                | Self::UntypedInt
                | Self::UntypedRune
        )
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            Self::Uint | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 | Self::Uintptr
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64 | Self::UntypedFloat)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String | Self::UntypedString)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool | Self::UntypedBool)
    }

    pub fn is_untyped(&self) -> bool {
        matches!(
            self,
            Self::UntypedBool
                | Self::UntypedInt
                | Self::UntypedRune
                | Self::UntypedFloat
                | Self::UntypedString
        )
    }

    /// Inclusive value range of a typed integer kind. `int`, `uint` and
    /// `uintptr` are 64 bits wide.
    pub fn int_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            Self::Int8 => (i8::MIN as i128, i8::MAX as i128),
            Self::Int16 => (i16::MIN as i128, i16::MAX as i128),
            Self::Int32 => (i32::MIN as i128, i32::MAX as i128),
            Self::Int | Self::Int64 => (i64::MIN as i128, i64::MAX as i128),
            Self::Uint8 => (0, u8::MAX as i128),
            Self::Uint16 => (0, u16::MAX as i128),
            Self::Uint32 => (0, u32::MAX as i128),
            Self::Uint | Self::Uint64 | Self::Uintptr => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    /// Rank of untyped numeric kinds: mixing untyped constants yields the
    /// kind that appears later in int, rune, float.
    pub(crate) fn untyped_rank(&self) -> u8 {
        match self {
            Self::UntypedInt => 1,
            Self::UntypedRune => 2,
            Self::UntypedFloat => 3,
            _ => 0,
        }
    }
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Basic(BasicKind),
    /// A defined type (`type Color uint8`). `underlying` is never `Named`.
    Named { name: String, underlying: Box<Type> },
    Composite(CompositeKind),
    /// A type from an imported package; its definition is not loaded.
    Opaque(String),
}

impl Type {
    pub fn untyped_int() -> Self {
        Type::Basic(BasicKind::UntypedInt)
    }

    pub fn untyped_bool() -> Self {
        Type::Basic(BasicKind::UntypedBool)
    }

    pub fn underlying(&self) -> &Type {
        match self {
            Type::Named { underlying, .. } => underlying,
            other => other,
        }
    }

    /// The basic kind of the underlying type, if it is basic.
    pub fn basic(&self) -> Option<BasicKind> {
        match self.underlying() {
            Type::Basic(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Basic(kind) if kind.is_untyped())
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Basic(kind) => write!(f, "{}", kind.name()),
            Type::Named { name, .. } => write!(f, "{}", name),
            Type::Composite(kind) => write!(f, "{} type", kind.as_str()),
            Type::Opaque(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_same_kind() {
        assert_eq!(BasicKind::from_name("byte"), Some(BasicKind::Uint8));
        assert_eq!(BasicKind::from_name("rune"), Some(BasicKind::Int32));
        assert_eq!(BasicKind::from_name("Color"), None);
    }

    #[test]
    fn test_named_type_underlying() {
        let color = Type::Named {
            name: "Color".into(),
            underlying: Box::new(Type::Basic(BasicKind::Uint8)),
        };
        assert_eq!(color.basic(), Some(BasicKind::Uint8));
        assert!(color.basic().unwrap().is_unsigned());
        assert_eq!(color.to_string(), "Color");
        assert!(!color.is_untyped());
    }

    #[test]
    fn test_int_ranges() {
        assert_eq!(BasicKind::Int8.int_range(), Some((-128, 127)));
        assert_eq!(BasicKind::Uint64.int_range(), Some((0, u64::MAX as i128)));
        assert_eq!(BasicKind::UntypedInt.int_range(), None);
    }
}
