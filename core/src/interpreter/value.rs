use std::fmt::Display;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Int(i64),
    Double(f64),
    Str(String),
    Bool(bool),
    Char(char),
    Null,
    /// Initializer text kept verbatim because it could not be evaluated.
    Raw(String),
}

impl Value {
    /// Default value for a declaration without initializer, or `None` when
    /// the type does not hold a value the interpreter models.
    pub fn default_for(var_type: &str) -> Option<Value> {
        match var_type {
            "int" | "long" | "short" | "byte" => Some(Value::Int(0)),
            "double" | "float" => Some(Value::Double(0.0)),
            "boolean" => Some(Value::Bool(false)),
            "char" => Some(Value::Char('\0')),
            "String" => Some(Value::Null),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Integer view used by comparisons: doubles truncate, booleans are 1/0,
    /// text contributes its leading integer prefix or 0.
    pub fn coerce_int(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            Value::Double(d) => *d as i64,
            Value::Bool(b) => i64::from(*b),
            Value::Char(c) => leading_integer(&c.to_string()),
            Value::Str(s) | Value::Raw(s) => leading_integer(s),
            Value::Null => 0,
        }
    }
}

fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let mut end = 0;
    for (index, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (index == 0 && (c == '-' || c == '+')) {
            end = index + c.len_utf8();
        } else {
            break;
        }
    }

    let prefix = &trimmed[..end];
    match prefix.parse::<i64>() {
        Ok(n) => n,
        // Saturate like a float-to-int cast on overflow
        Err(_) if prefix.trim_start_matches(['-', '+']).is_empty() => 0,
        Err(_) if prefix.starts_with('-') => i64::MIN,
        Err(_) => i64::MAX,
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Double(d) if d.is_finite() && d.fract() == 0.0 && d.abs() < 1e15 => {
                write!(f, "{}", *d as i64)
            }
            Value::Double(d) => write!(f, "{}", d),
            Value::Str(s) | Value::Raw(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Null => write!(f, "null"),
        }
    }
}
