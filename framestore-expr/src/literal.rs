use arrow::datatypes::TimeUnit;
use chrono::{NaiveDate, NaiveDateTime};

/// A literal value that has not yet been coerced into a specific native
/// type. This allows type inference to be deferred until the target column
/// type is known.
///
/// One logical value may arrive in several physical shapes (a date as a
/// `NaiveDate`, as ISO text, or as ISO bytes); the coercion engine decides
/// per column which shapes are acceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i128),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Time since the Unix epoch at an explicit precision.
    Timestamp { value: i64, unit: TimeUnit },
}

impl Literal {
    /// Name of the literal's type family, used in error messages.
    pub fn family(&self) -> &'static str {
        match self {
            Literal::Int(_) => "integer",
            Literal::Float(_) => "float",
            Literal::String(_) => "string",
            Literal::Bytes(_) => "bytes",
            Literal::Date(_) => "date",
            Literal::DateTime(_) => "datetime",
            Literal::Timestamp { .. } => "timestamp",
        }
    }

    /// Build a timestamp literal from a raw epoch offset and unit.
    pub fn timestamp(value: i64, unit: TimeUnit) -> Self {
        Literal::Timestamp { value, unit }
    }
}

macro_rules! impl_from_for_literal {
    ($variant:ident, $($t:ty),*) => {
        $(
            impl From<$t> for Literal {
                fn from(v: $t) -> Self {
                    Literal::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_literal!(Int, i8, i16, i32, i64, i128, u8, u16, u32, u64);
impl_from_for_literal!(Float, f32, f64);
impl_from_for_literal!(String, String);
impl_from_for_literal!(Bytes, Vec<u8>);
impl_from_for_literal!(Date, NaiveDate);
impl_from_for_literal!(DateTime, NaiveDateTime);

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<&[u8]> for Literal {
    fn from(v: &[u8]) -> Self {
        Literal::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Literal {
    fn from(v: &[u8; N]) -> Self {
        Literal::Bytes(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_impls_pick_the_right_variant() {
        assert_eq!(Literal::from(3u8), Literal::Int(3));
        assert_eq!(Literal::from(-3i64), Literal::Int(-3));
        assert_eq!(Literal::from(3.0f32), Literal::Float(3.0));
        assert_eq!(Literal::from("abc"), Literal::String("abc".to_string()));
        assert_eq!(Literal::from(b"abc"), Literal::Bytes(b"abc".to_vec()));
        let d = NaiveDate::from_ymd_opt(2018, 1, 5).unwrap();
        assert_eq!(Literal::from(d), Literal::Date(d));
    }

    #[test]
    fn family_names() {
        assert_eq!(Literal::Int(1).family(), "integer");
        assert_eq!(Literal::from("x").family(), "string");
        assert_eq!(
            Literal::timestamp(1, TimeUnit::Millisecond).family(),
            "timestamp"
        );
    }
}
