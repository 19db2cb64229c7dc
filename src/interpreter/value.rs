use crate::parser::Number;

/// Runtime value. Equality is structural and never coerces between kinds,
/// so `Integer(1) != Float(1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
}

impl Value {
    /// Zero and `null` are false, booleans are themselves, everything else
    /// is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(_) => true,
        }
    }

    /// Numeric view used by arithmetic and relational operators.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Boolean(_) | Self::String(_) | Self::Null => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Null => "null",
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        match value {
            Number::Integer(i) => Self::Integer(i),
            Number::Float(f) => Self::Float(f),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) if x.is_nan() => f.write_str("NaN"),
            Self::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // Whole floats keep a fractional digit so they never read as integers.
            Self::Float(x) if x.fract() == 0.0 => write!(f, "{x}.0"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}
