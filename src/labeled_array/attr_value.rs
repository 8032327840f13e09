use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use ordered_float::OrderedFloat;

/// A decoded header annotation or coordinate label.
///
/// ADAS headers carry free-form `key = value` annotations whose type is only known once the
/// value is decoded. [`crate::conversion::auto_decode`] tries the variants in declaration
/// order: integer, then float, then the trimmed text.
///
/// Equality, hashing and ordering are total so that values can serve as index keys:
/// variants are ranked `Integer < Float < Text`, floats compare with [`f64::total_cmp`].
#[derive(Debug, Clone)]
pub enum AttrValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    fn rank(&self) -> u8 {
        match self {
            AttrValue::Integer(_) => 0,
            AttrValue::Float(_) => 1,
            AttrValue::Text(_) => 2,
        }
    }

    /// Numeric view of the value, `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Integer(i) => Some(*i as f64),
            AttrValue::Float(x) => Some(*x),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttrValue {}

impl Hash for AttrValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            AttrValue::Integer(i) => i.hash(state),
            AttrValue::Float(x) => OrderedFloat(*x).hash(state),
            AttrValue::Text(s) => s.hash(state),
        }
    }
}

impl PartialOrd for AttrValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttrValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AttrValue::Integer(a), AttrValue::Integer(b)) => a.cmp(b),
            (AttrValue::Float(a), AttrValue::Float(b)) => a.total_cmp(b),
            (AttrValue::Text(a), AttrValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Integer(i) => write!(f, "{i}"),
            AttrValue::Float(x) => write!(f, "{x}"),
            AttrValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Integer(i)
    }
}

impl From<usize> for AttrValue {
    fn from(i: usize) -> Self {
        AttrValue::Integer(i as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        AttrValue::Float(x)
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

#[cfg(test)]
mod attr_value_test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_total_order() {
        let mut values = vec![
            AttrValue::from("EXCIT"),
            AttrValue::from(2.5),
            AttrValue::from(3_i64),
            AttrValue::from("CHEXC"),
            AttrValue::from(-1_i64),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                AttrValue::from(-1_i64),
                AttrValue::from(3_i64),
                AttrValue::from(2.5),
                AttrValue::from("CHEXC"),
                AttrValue::from("EXCIT"),
            ]
        );
    }

    #[test]
    fn test_integer_and_float_are_distinct_keys() {
        let set: HashSet<AttrValue> = [AttrValue::from(1_i64), AttrValue::from(1.0)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert_ne!(AttrValue::from(1_i64), AttrValue::from(1.0));
    }
}
