use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::firestore::model::GeoPoint;
use crate::firestore::value::{ArrayValue, MapValue};

#[derive(Clone, Debug, PartialEq)]
pub struct FirestoreValue {
    kind: ValueKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    GeoPoint(GeoPoint),
    Array(ArrayValue),
    Map(MapValue),
}

impl FirestoreValue {
    pub fn null() -> Self {
        Self {
            kind: ValueKind::Null,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Self {
            kind: ValueKind::Boolean(value),
        }
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            kind: ValueKind::Integer(value),
        }
    }

    pub fn from_double(value: f64) -> Self {
        Self {
            kind: ValueKind::Double(value),
        }
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::String(value.into()),
        }
    }

    pub fn from_geo_point(value: GeoPoint) -> Self {
        Self {
            kind: ValueKind::GeoPoint(value),
        }
    }

    pub fn from_array(values: Vec<FirestoreValue>) -> Self {
        Self {
            kind: ValueKind::Array(ArrayValue::new(values)),
        }
    }

    pub fn from_map(map: BTreeMap<String, FirestoreValue>) -> Self {
        Self {
            kind: ValueKind::Map(MapValue::new(map)),
        }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn as_geo_point(&self) -> Option<GeoPoint> {
        match &self.kind {
            ValueKind::GeoPoint(point) => Some(*point),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    /// Compares two values of the same type class.
    ///
    /// Integers and doubles compare numerically with each other; values of unrelated
    /// types are not comparable and yield `None`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (&self.kind, &other.kind) {
            (ValueKind::Null, ValueKind::Null) => Some(Ordering::Equal),
            (ValueKind::Boolean(a), ValueKind::Boolean(b)) => Some(a.cmp(b)),
            (ValueKind::Integer(a), ValueKind::Integer(b)) => Some(a.cmp(b)),
            (ValueKind::Double(a), ValueKind::Double(b)) => a.partial_cmp(b),
            (ValueKind::Integer(a), ValueKind::Double(b)) => (*a as f64).partial_cmp(b),
            (ValueKind::Double(a), ValueKind::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (ValueKind::String(a), ValueKind::String(b)) => Some(a.cmp(b)),
            (ValueKind::GeoPoint(a), ValueKind::GeoPoint(b)) => Some(a.compare(b)),
            _ => None,
        }
    }

    /// Equality as the query engine sees it: `1 == 1.0`.
    pub fn query_equals(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (ValueKind::Array(a), ValueKind::Array(b)) => {
                a.values().len() == b.values().len()
                    && a.values()
                        .iter()
                        .zip(b.values())
                        .all(|(l, r)| l.query_equals(r))
            }
            (ValueKind::Map(_), ValueKind::Map(_)) => self == other,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

impl From<GeoPoint> for FirestoreValue {
    fn from(value: GeoPoint) -> Self {
        FirestoreValue::from_geo_point(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_values() {
        let v = FirestoreValue::from_string("hello");
        match v.kind() {
            ValueKind::String(value) => assert_eq!(value, "hello"),
            _ => panic!("unexpected kind"),
        }
    }

    #[test]
    fn geo_point_accessor() {
        let point = GeoPoint::new(20.0, 30.0).unwrap();
        let value = FirestoreValue::from(point);
        assert_eq!(value.as_geo_point(), Some(point));
        assert_eq!(FirestoreValue::null().as_geo_point(), None);
    }

    #[test]
    fn numeric_comparison_crosses_integer_and_double() {
        let one = FirestoreValue::from_integer(1);
        let one_point_o = FirestoreValue::from_double(1.0);
        assert!(one.query_equals(&one_point_o));
        assert_eq!(
            FirestoreValue::from_integer(2).compare(&one_point_o),
            Some(Ordering::Greater)
        );
        assert_eq!(one.compare(&FirestoreValue::from_string("1")), None);
    }
}
