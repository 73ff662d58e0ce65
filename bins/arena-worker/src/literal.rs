/// Value Literal Encoder
///
/// **Core Responsibility:**
/// Turn a test-case value into source text the target language parses back
/// into the same value.
///
/// **Dialects:**
/// The set of target grammars is closed, so each language slug resolves to a
/// `Dialect` tag and one recursive encoder reads the tag's rules:
/// - boolean and null spelling
/// - list bracket style
/// - whether arrays need an explicit typed construction (`new int[] {..}`)
/// - how a language-neutral `DataType` is spelled natively
///
/// Encoding is pure and never fails. Lists without a usable type hint fall
/// back to the encoder's configured element type.

use arena_common::types::{DataType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Python,
    JavaScript,
    Cpp,
    Java,
    /// JSON spelling, used for every slug without a dedicated dialect
    Generic,
}

impl Dialect {
    pub fn from_slug(slug: &str) -> Self {
        match slug.to_lowercase().as_str() {
            "python" | "python3" | "py" => Dialect::Python,
            "javascript" | "js" | "node" => Dialect::JavaScript,
            "cpp" | "c++" => Dialect::Cpp,
            "java" => Dialect::Java,
            _ => Dialect::Generic,
        }
    }

    pub fn true_literal(&self) -> &'static str {
        match self {
            Dialect::Python => "True",
            _ => "true",
        }
    }

    pub fn false_literal(&self) -> &'static str {
        match self {
            Dialect::Python => "False",
            _ => "false",
        }
    }

    pub fn null_literal(&self) -> &'static str {
        match self {
            Dialect::Python => "None",
            Dialect::Cpp => "nullptr",
            _ => "null",
        }
    }

    fn brackets(&self) -> (&'static str, &'static str) {
        match self {
            Dialect::Cpp | Dialect::Java => ("{", "}"),
            _ => ("[", "]"),
        }
    }

    /// Languages whose harness must declare each argument with a static type
    pub fn is_typed(&self) -> bool {
        matches!(self, Dialect::Cpp | Dialect::Java)
    }

    /// Arrays need `new T[] {..}` rather than a bare brace list
    fn requires_typed_array(&self) -> bool {
        matches!(self, Dialect::Java)
    }

    /// Type used when the signature has no entry for an argument position
    pub fn any_type(&self) -> &'static str {
        match self {
            Dialect::Cpp => "auto",
            Dialect::Java => "Object",
            _ => "any",
        }
    }

    /// Native spelling of a signature type
    pub fn native_type(&self, data_type: &DataType) -> String {
        match self {
            Dialect::Java => match data_type {
                DataType::Int => "int".to_string(),
                DataType::Long => "long".to_string(),
                DataType::Float => "double".to_string(),
                DataType::String => "String".to_string(),
                DataType::Boolean => "boolean".to_string(),
                DataType::Void => "void".to_string(),
                DataType::Array(inner) => format!("{}[]", self.native_type(inner)),
                DataType::Named(name) => name.clone(),
            },
            Dialect::Cpp => match data_type {
                DataType::Int => "int".to_string(),
                DataType::Long => "long long".to_string(),
                DataType::Float => "double".to_string(),
                DataType::String => "std::string".to_string(),
                DataType::Boolean => "bool".to_string(),
                DataType::Void => "void".to_string(),
                DataType::Array(inner) => format!("std::vector<{}>", self.native_type(inner)),
                DataType::Named(name) => name.clone(),
            },
            _ => data_type.to_string(),
        }
    }

    /// Parameter list for a starter-code stub, arguments named `arg1..argN`.
    /// A signature without argument types gets the dialect's variadic form.
    pub fn parameter_list(&self, argument_types: &[DataType]) -> String {
        let names = (1..=argument_types.len()).map(|idx| format!("arg{}", idx));

        match self {
            Dialect::Python if argument_types.is_empty() => "self, *args".to_string(),
            Dialect::Python => std::iter::once("self".to_string()).chain(names).collect::<Vec<_>>().join(", "),
            Dialect::JavaScript if argument_types.is_empty() => "...args".to_string(),
            Dialect::JavaScript => names.collect::<Vec<_>>().join(", "),
            Dialect::Cpp if argument_types.is_empty() => "auto ...args".to_string(),
            Dialect::Java if argument_types.is_empty() => "Object... args".to_string(),
            Dialect::Cpp | Dialect::Java => argument_types
                .iter()
                .zip(names)
                .map(|(data_type, name)| format!("{} {}", self.native_type(data_type), name))
                .collect::<Vec<_>>()
                .join(", "),
            Dialect::Generic => "*args".to_string(),
        }
    }

    /// Escape one character inside a double-quoted string literal
    fn escape_char(&self, c: char, out: &mut String) {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => match self {
                // `\x` is greedy in C++ and `\u` is pre-lexed in Java; octal is exact in both
                Dialect::Cpp | Dialect::Java => out.push_str(&format!("\\{:03o}", c as u32)),
                _ => out.push_str(&format!("\\x{:02x}", c as u32)),
            },
            c => out.push(c),
        }
    }
}

pub struct LiteralEncoder {
    dialect: Dialect,
    fallback_element: DataType,
}

impl LiteralEncoder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            fallback_element: DataType::Int,
        }
    }

    /// Element type assumed for lists that carry no array type hint
    pub fn with_fallback_element(mut self, element: DataType) -> Self {
        self.fallback_element = element;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn encode(&self, value: &Value, declared: Option<&DataType>) -> String {
        let mut out = String::new();
        self.write_value(value, declared, &mut out);
        out
    }

    fn write_value(&self, value: &Value, declared: Option<&DataType>, out: &mut String) {
        match value {
            Value::Null => out.push_str(self.dialect.null_literal()),
            Value::Bool(true) => out.push_str(self.dialect.true_literal()),
            Value::Bool(false) => out.push_str(self.dialect.false_literal()),
            Value::Int(n) => {
                out.push_str(&n.to_string());
                if self.dialect == Dialect::Java && needs_long_suffix(*n, declared) {
                    out.push('L');
                }
            }
            Value::Float(x) => out.push_str(&format_float(*x)),
            Value::Str(s) => {
                out.push('"');
                for c in s.chars() {
                    self.dialect.escape_char(c, out);
                }
                out.push('"');
            }
            Value::List(items) => self.write_list(value, items, declared, out),
        }
    }

    fn write_list(&self, value: &Value, items: &[Value], declared: Option<&DataType>, out: &mut String) {
        let array_type = match declared {
            Some(t @ DataType::Array(_)) => t.clone(),
            _ => self.fallback_array(value.list_depth()),
        };
        let element = array_type.element();

        if self.dialect.requires_typed_array() {
            out.push_str("new ");
            out.push_str(&self.dialect.native_type(&array_type));
            out.push(' ');
        }

        let (open, close) = self.dialect.brackets();
        out.push_str(open);
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            self.write_value(item, element, out);
        }
        out.push_str(close);
    }

    fn fallback_array(&self, depth: usize) -> DataType {
        (0..depth.max(1)).fold(self.fallback_element.clone(), |t, _| DataType::array_of(t))
    }
}

/// Encode with the default fallback element type.
pub fn encode(value: &Value, dialect: Dialect, declared: Option<&DataType>) -> String {
    LiteralEncoder::new(dialect).encode(value, declared)
}

fn needs_long_suffix(n: i64, declared: Option<&DataType>) -> bool {
    matches!(declared, Some(DataType::Long)) || i32::try_from(n).is_err()
}

/// Floats keep a decimal point or exponent so they never read back as ints.
fn format_float(x: f64) -> String {
    let text = format!("{:?}", x);
    if text.contains(['.', 'e', 'E']) || !x.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}
