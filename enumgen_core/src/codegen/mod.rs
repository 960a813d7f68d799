//! Rendering the generated Go source for one enum type.
//!
//! The output gives the type `Value`/`Scan` (database/sql) and
//! `MarshalJSON`/`UnmarshalJSON` (encoding/json) methods backed by two
//! package-level lookup tables. When the type implements `fmt.Stringer` the
//! tables are rebuilt in `init`, keyed by `String()` output.

pub mod format;

pub use format::{FormatError, GoFormatter};

use crate::error::{EnumgenError, Result};
use crate::extract::ExtractedValue;
use std::collections::HashMap;
use std::fmt::Write;

/// Everything needed to render one type.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub type_name: String,
    pub values: Vec<ExtractedValue>,
    pub package_name: String,
    /// Invocation recorded in the header comment.
    pub command: String,
}

impl GenerationRequest {
    /// Output file name: the lowercased type name plus `suffix` and `.go`.
    pub fn file_name(&self, suffix: &str) -> String {
        format!("{}{}.go", self.type_name.to_lowercase(), suffix)
    }
}

/// Collapse values into map entries where later entries win. The entry
/// keeps the position of the first occurrence of its key.
fn last_wins<'a, K, F>(values: &'a [ExtractedValue], key: F) -> Vec<&'a ExtractedValue>
where
    K: std::hash::Hash + Eq,
    F: Fn(&ExtractedValue) -> K,
{
    let mut entries: Vec<&ExtractedValue> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for value in values {
        match index.get(&key(value)) {
            Some(&i) => entries[i] = value,
            None => {
                index.insert(key(value), entries.len());
                entries.push(value);
            }
        }
    }
    entries
}

fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Render the Go source for `request`.
pub fn render(request: &GenerationRequest) -> Result<String> {
    if !is_go_identifier(&request.type_name) {
        return Err(EnumgenError::template(format!(
            "{:?} is not a valid Go type name",
            request.type_name
        )));
    }
    if !is_go_identifier(&request.package_name) {
        return Err(EnumgenError::template(format!(
            "{:?} is not a valid Go package name",
            request.package_name
        )));
    }

    let mut out = String::new();
    write_source(&mut out, request).map_err(|e| EnumgenError::template(e.to_string()))?;

    tracing::debug!(
        type_name = %request.type_name,
        values = request.values.len(),
        bytes = out.len(),
        "Rendered enum methods"
    );
    Ok(out)
}

fn write_source(out: &mut String, request: &GenerationRequest) -> std::fmt::Result {
    let t = request.type_name.as_str();
    let by_name = last_wins(&request.values, |v| v.name.clone());
    let by_value = last_wins(&request.values, |v| v.value);

    writeln!(
        out,
        "// Code generated by \"{}\"; DO NOT EDIT.",
        escape_control(&request.command)
    )?;
    writeln!(out)?;
    writeln!(out, "package {}", request.package_name)?;
    writeln!(out)?;
    out.push_str("import (\n\t\"database/sql/driver\"\n\t\"encoding/json\"\n\t\"fmt\"\n)\n\n");

    // Lookup tables
    writeln!(out, "var (")?;
    writeln!(out, "\t_{t}NameToValue = map[string]{t}{{")?;
    for value in &by_name {
        writeln!(out, "\t\t\"{}\": {},", value.name, value.literal)?;
    }
    writeln!(out, "\t}}")?;
    writeln!(out)?;
    writeln!(out, "\t_{t}ValueToName = map[{t}]string{{")?;
    for value in &by_value {
        writeln!(out, "\t\t{}: \"{}\",", value.literal, value.name)?;
    }
    writeln!(out, "\t}}")?;
    writeln!(out)?;
    writeln!(out, "\t// _{t}IsStringer records whether {t} implements fmt.Stringer.")?;
    writeln!(out, "\t_{t}IsStringer bool")?;
    writeln!(out, ")")?;
    writeln!(out)?;

    // Stringer check and table rebuild
    let declared: Vec<&str> = request.values.iter().map(|v| v.name.as_str()).collect();
    writeln!(out, "func init() {{")?;
    writeln!(out, "\tvar v {t}")?;
    writeln!(out, "\tif _, ok := interface{{}}(v).(fmt.Stringer); !ok {{")?;
    writeln!(out, "\t\treturn")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\t_{t}IsStringer = true")?;
    writeln!(out, "\t_{t}NameToValue = make(map[string]{t})")?;
    writeln!(out, "\t_{t}ValueToName = make(map[{t}]string)")?;
    writeln!(out, "\tfor _, value := range []{t}{{{}}} {{", declared.join(", "))?;
    writeln!(out, "\t\tname := interface{{}}(value).(fmt.Stringer).String()")?;
    writeln!(out, "\t\t_{t}NameToValue[name] = value")?;
    writeln!(out, "\t\t_{t}ValueToName[value] = name")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    // database/sql
    writeln!(out, "// Value implements the driver.Valuer interface (database/sql/driver) for")?;
    writeln!(out, "// converting to a value that can be stored in the database.")?;
    writeln!(out, "func (r {t}) Value() (driver.Value, error) {{")?;
    writeln!(out, "\tif _{t}IsStringer {{")?;
    writeln!(out, "\t\treturn interface{{}}(r).(fmt.Stringer).String(), nil")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\treturn _{t}ValueToName[r], nil")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "// Scan implements the sql.Scanner interface for reading this enum from")?;
    writeln!(out, "// the database. Values that are not text leave the receiver at zero.")?;
    writeln!(out, "func (r *{t}) Scan(src interface{{}}) error {{")?;
    writeln!(out, "\t*r = 0")?;
    writeln!(out, "\tvar s string")?;
    writeln!(out, "\tswitch src := src.(type) {{")?;
    writeln!(out, "\tcase []byte:")?;
    writeln!(out, "\t\ts = string(src)")?;
    writeln!(out, "\tcase string:")?;
    writeln!(out, "\t\ts = src")?;
    writeln!(out, "\tdefault:")?;
    writeln!(out, "\t\treturn nil")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\tv, ok := _{t}NameToValue[s]")?;
    writeln!(out, "\tif !ok {{")?;
    writeln!(out, "\t\treturn fmt.Errorf(\"invalid {t} %q\", s)")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\t*r = v")?;
    writeln!(out, "\treturn nil")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    // encoding/json
    writeln!(out, "// MarshalJSON is generated so {t} satisfies json.Marshaler.")?;
    writeln!(out, "func (r {t}) MarshalJSON() ([]byte, error) {{")?;
    writeln!(out, "\tif _{t}IsStringer {{")?;
    writeln!(out, "\t\treturn json.Marshal(interface{{}}(r).(fmt.Stringer).String())")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\ts, ok := _{t}ValueToName[r]")?;
    writeln!(out, "\tif !ok {{")?;
    writeln!(out, "\t\treturn nil, fmt.Errorf(\"invalid {t}: %d\", r)")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\treturn json.Marshal(s)")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "// UnmarshalJSON is generated so {t} satisfies json.Unmarshaler.")?;
    writeln!(out, "func (r *{t}) UnmarshalJSON(data []byte) error {{")?;
    writeln!(out, "\tvar s string")?;
    writeln!(out, "\tif err := json.Unmarshal(data, &s); err != nil {{")?;
    writeln!(out, "\t\treturn fmt.Errorf(\"{t} should be a string, got %s\", data)")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\tv, ok := _{t}NameToValue[s]")?;
    writeln!(out, "\tif !ok {{")?;
    writeln!(out, "\t\treturn fmt.Errorf(\"invalid {t} %q\", s)")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\t*r = v")?;
    writeln!(out, "\treturn nil")?;
    writeln!(out, "}}")?;
    Ok(())
}

/// Escape control characters so the command stays on the header line.
fn escape_control(command: &str) -> String {
    command
        .chars()
        .map(|c| {
            if c.is_control() {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}
