//! Collecting the constants of one type from a loaded module.

use crate::error::{EnumgenError, Result};
use crate::go_parser::ast::Decl;
use crate::loader::Module;
use crate::resolve::{ConstValue, DeclId};
use tracing::{debug, trace};

/// One constant of the requested type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedValue {
    pub name: String,
    /// Bit pattern of the 64-bit signed or unsigned reading.
    pub value: u64,
    pub signed: bool,
    /// Canonical decimal form of the value.
    pub literal: String,
}

impl ExtractedValue {
    /// The value reinterpreted as signed.
    pub fn as_i64(&self) -> i64 {
        self.value as i64
    }
}

/// Every constant whose in-force type is `type_name`, in file order and
/// then declaration order.
///
/// Within a group an explicit type sets the in-force type, a value without
/// a type keeps it, and a bare name with neither clears it. Blank names are
/// skipped. Duplicates are kept.
pub fn extract(module: &Module, type_name: &str) -> Result<Vec<ExtractedValue>> {
    let mut values = Vec::new();

    for (file_index, unit) in module.files.iter().enumerate() {
        for (decl_index, decl) in unit.ast.decls.iter().enumerate() {
            let Decl::Const(group) = decl else {
                continue;
            };

            let mut in_force: Option<String> = None;
            for (spec_index, spec) in group.specs.iter().enumerate() {
                match (&spec.ty, spec.values.is_empty()) {
                    (Some(ty), _) => in_force = Some(ty.to_string()),
                    (None, false) => {}
                    (None, true) => in_force = None,
                }
                if in_force.as_deref() != Some(type_name) {
                    continue;
                }

                for (name_index, name) in spec.names.iter().enumerate() {
                    if name.is_blank() {
                        continue;
                    }
                    let id = DeclId {
                        file: file_index,
                        decl: decl_index,
                        spec: spec_index,
                        name: name_index,
                    };
                    let value = extract_one(module, id, &name.name, type_name)?;
                    trace!(name = %value.name, literal = %value.literal, "Selected constant");
                    values.push(value);
                }
            }
        }
    }

    debug!(type_name = %type_name, values = values.len(), "Extracted constants");
    Ok(values)
}

fn extract_one(module: &Module, id: DeclId, name: &str, type_name: &str) -> Result<ExtractedValue> {
    let object = module
        .symbols
        .constant(id)
        .ok_or_else(|| EnumgenError::missing_symbol(name))?;

    let Some(kind) = object.constant.ty.basic().filter(|kind| kind.is_integer()) else {
        return Err(EnumgenError::unsupported_type(type_name));
    };

    let value = match &object.constant.value {
        ConstValue::Int(v) => *v,
        ConstValue::External { package, name: external } => {
            return Err(EnumgenError::ExternalConstant {
                name: format!("{} ({}.{})", name, package, external),
                package: package.clone(),
            });
        }
        _ => return Err(EnumgenError::unsupported_value(name)),
    };

    let bits = if let Ok(signed) = i64::try_from(value) {
        signed as u64
    } else if let Ok(unsigned) = u64::try_from(value) {
        unsigned
    } else {
        return Err(EnumgenError::ValueOutOfRange {
            name: name.to_string(),
            value: value.to_string(),
        });
    };

    Ok(ExtractedValue {
        name: name.to_string(),
        value: bits,
        signed: !kind.is_unsigned(),
        literal: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceUnit;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    fn module(files: &[(&str, &str)]) -> Module {
        let units = files
            .iter()
            .map(|(name, source)| SourceUnit::parse(PathBuf::from(name), source.to_string()).unwrap())
            .collect();
        Module::from_units(Path::new("."), units).unwrap()
    }

    fn names(values: &[ExtractedValue]) -> Vec<&str> {
        values.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_carry_over() {
        let m = module(&[(
            "t.go",
            "package p\n\ntype T int\n\nconst (\n\tA T = 1\n\tB = 2\n\tC = 3\n)\n",
        )]);
        let values = extract(&m, "T").unwrap();
        assert_eq!(names(&values), vec!["A", "B", "C"]);
        assert_eq!(values.iter().map(|v| v.value).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_carry_over_reset_by_bare_name() {
        let m = module(&[(
            "t.go",
            "package p\n\ntype T int\ntype T2 int\n\nconst (\n\tA T = iota + 1\n\tX\n\tB T2 = 2\n)\n",
        )]);
        let values = extract(&m, "T").unwrap();
        assert_eq!(names(&values), vec!["A"]);
        let others = extract(&m, "T2").unwrap();
        assert_eq!(names(&others), vec!["B"]);
    }

    #[test]
    fn test_iota_group_with_blank() {
        let m = module(&[(
            "color.go",
            "package colors\n\ntype Color uint8\n\nconst (\n\t_ Color = iota\n\tRed Color = iota\n\tGreen Color = iota\n\tBlue Color = iota\n)\n",
        )]);
        let values = extract(&m, "Color").unwrap();
        assert_eq!(names(&values), vec!["Red", "Green", "Blue"]);
        assert_eq!(values[2].value, 3);
        assert!(!values[0].signed);
        assert_eq!(values[0].literal, "1");
    }

    #[test]
    fn test_bare_continuation_is_not_selected() {
        let m = module(&[(
            "color.go",
            "package colors\n\ntype Color int\n\nconst (\n\tRed Color = iota\n\tGreen\n\tBlue\n)\n",
        )]);
        let values = extract(&m, "Color").unwrap();
        assert_eq!(names(&values), vec!["Red"]);
    }

    #[test]
    fn test_file_then_declaration_order() {
        let m = module(&[
            ("a.go", "package p\n\nconst (\n\tZ T = 26\n)\n\nconst Y T = 25\n"),
            ("b.go", "package p\n\ntype T int\n\nconst A T = 1\n"),
        ]);
        let values = extract(&m, "T").unwrap();
        assert_eq!(names(&values), vec!["Z", "Y", "A"]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let m = module(&[("t.go", "package p\n\ntype T int\n\nconst A = 1\n")]);
        assert!(extract(&m, "T").unwrap().is_empty());
        assert!(extract(&m, "Missing").unwrap().is_empty());
    }

    #[test]
    fn test_non_integer_type() {
        let m = module(&[(
            "t.go",
            "package p\n\ntype Ratio float64\n\nconst Half Ratio = 0.5\n",
        )]);
        let err = extract(&m, "Ratio").unwrap_err();
        assert_eq!(err.to_string(), "can't handle non-integer constant type Ratio");
    }

    #[test]
    fn test_carried_untyped_float_is_rejected() {
        let m = module(&[(
            "t.go",
            "package p\n\ntype T int\n\nconst (\n\tA T = 1\n\tB = 2.5\n)\n",
        )]);
        let err = extract(&m, "T").unwrap_err();
        assert!(matches!(err, EnumgenError::UnsupportedConstantType { .. }));
    }

    #[test]
    fn test_external_value_is_rejected() {
        let m = module(&[(
            "t.go",
            "package p\n\nimport \"math\"\n\ntype T int64\n\nconst Max T = math.MaxInt32\n",
        )]);
        let err = extract(&m, "T").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Max"), "{message}");
        assert!(message.contains("math"), "{message}");
    }

    #[test]
    fn test_unsigned_max_keeps_bits() {
        let m = module(&[(
            "t.go",
            "package p\n\ntype Mask uint64\n\nconst All Mask = 1<<64 - 1\n",
        )]);
        let values = extract(&m, "Mask").unwrap();
        assert_eq!(values[0].value, u64::MAX);
        assert!(!values[0].signed);
        assert_eq!(values[0].literal, "18446744073709551615");
    }

    #[test]
    fn test_equal_values_are_kept() {
        let m = module(&[(
            "t.go",
            "package p\n\ntype T int\n\nconst (\n\tA T = 1\n\tB T = 1\n)\n",
        )]);
        let values = extract(&m, "T").unwrap();
        assert_eq!(names(&values), vec!["A", "B"]);
        assert_eq!(values[0].value, values[1].value);
    }

    proptest! {
        #[test]
        fn prop_signed_values_round_trip(n in any::<i64>()) {
            let source = format!(
                "package p\n\ntype Level int64\n\nconst L Level = {}\n",
                n
            );
            let m = module(&[("t.go", source.as_str())]);
            let values = extract(&m, "Level").unwrap();
            prop_assert_eq!(values.len(), 1);
            prop_assert!(values[0].signed);
            prop_assert_eq!(values[0].as_i64(), n);
            prop_assert_eq!(values[0].literal.clone(), n.to_string());
        }

        #[test]
        fn prop_unsigned_values_round_trip(n in any::<u64>()) {
            let source = format!(
                "package p\n\ntype Flags uint64\n\nconst F Flags = {}\n",
                n
            );
            let m = module(&[("t.go", source.as_str())]);
            let values = extract(&m, "Flags").unwrap();
            prop_assert!(!values[0].signed);
            prop_assert_eq!(values[0].value, n);
        }
    }
}
