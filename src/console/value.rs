use std::fmt;

use super::ConsoleError;

/// Marshalled form of a COM `VARIANT` as used by the NSI2000 console.
///
/// Only the kinds the automation surface actually produces are modelled.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConsoleValue {
    /// `VT_EMPTY`, returned by methods without a result.
    #[default]
    Empty,
    /// `VT_BOOL`
    Bool(bool),
    /// `VT_I4` (and the narrower integer kinds, widened)
    Int(i32),
    /// `VT_R8` (and `VT_R4`, widened)
    Float(f64),
    /// `VT_BSTR`
    Text(String),
}

impl ConsoleValue {
    /// Name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConsoleValue::Empty => "empty",
            ConsoleValue::Bool(_) => "boolean",
            ConsoleValue::Int(_) => "integer",
            ConsoleValue::Float(_) => "float",
            ConsoleValue::Text(_) => "text",
        }
    }

    /// Numeric value; integers widen to `f64` as COM coercion does.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConsoleValue::Float(v) => Some(*v),
            ConsoleValue::Int(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Integer value. Floats are accepted only when integral.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ConsoleValue::Int(v) => Some(*v),
            ConsoleValue::Float(v)
                if v.fract() == 0.0 && *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX) =>
            {
                Some(*v as i32)
            }
            _ => None,
        }
    }

    /// Boolean value. The console reports some flags as 0/-1 integers.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConsoleValue::Bool(v) => Some(*v),
            ConsoleValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConsoleValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn expect_f64(&self, member: &str) -> Result<f64, ConsoleError> {
        self.as_f64().ok_or_else(|| self.type_error(member, "float"))
    }

    pub(crate) fn expect_i32(&self, member: &str) -> Result<i32, ConsoleError> {
        self.as_i32().ok_or_else(|| self.type_error(member, "integer"))
    }

    pub(crate) fn expect_bool(&self, member: &str) -> Result<bool, ConsoleError> {
        self.as_bool().ok_or_else(|| self.type_error(member, "boolean"))
    }

    pub(crate) fn expect_text(&self, member: &str) -> Result<String, ConsoleError> {
        self.as_str()
            .map(str::to_string)
            .ok_or_else(|| self.type_error(member, "text"))
    }

    fn type_error(&self, member: &str, expected: &'static str) -> ConsoleError {
        ConsoleError::Type {
            member: member.to_string(),
            expected,
            found: self.kind(),
        }
    }
}

impl fmt::Display for ConsoleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleValue::Empty => f.write_str("<empty>"),
            ConsoleValue::Bool(v) => write!(f, "{v}"),
            ConsoleValue::Int(v) => write!(f, "{v}"),
            ConsoleValue::Float(v) => write!(f, "{v}"),
            ConsoleValue::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for ConsoleValue {
    fn from(v: bool) -> Self {
        ConsoleValue::Bool(v)
    }
}

impl From<i32> for ConsoleValue {
    fn from(v: i32) -> Self {
        ConsoleValue::Int(v)
    }
}

impl From<f64> for ConsoleValue {
    fn from(v: f64) -> Self {
        ConsoleValue::Float(v)
    }
}

impl From<String> for ConsoleValue {
    fn from(v: String) -> Self {
        ConsoleValue::Text(v)
    }
}

impl From<&str> for ConsoleValue {
    fn from(v: &str) -> Self {
        ConsoleValue::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_widening() {
        assert_eq!(ConsoleValue::Int(481).as_f64(), Some(481.0));
        assert_eq!(ConsoleValue::Float(481.0).as_i32(), Some(481));
        assert_eq!(ConsoleValue::Float(2.5).as_i32(), None);
        assert_eq!(ConsoleValue::Text("9.5".into()).as_f64(), None);
    }

    #[test]
    fn test_vb_booleans() {
        assert_eq!(ConsoleValue::Int(-1).as_bool(), Some(true));
        assert_eq!(ConsoleValue::Int(0).as_bool(), Some(false));
        assert_eq!(ConsoleValue::Float(1.0).as_bool(), None);
    }

    #[test]
    fn test_type_error_names_member() {
        let err = ConsoleValue::Empty.expect_f64("FF_PEAK").unwrap_err();
        assert_eq!(err.to_string(), "FF_PEAK returned empty, expected float");
    }
}
