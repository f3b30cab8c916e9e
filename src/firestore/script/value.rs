use std::collections::BTreeMap;

use serde_json::{Number, Value as JsonValue};

use crate::firestore::error::{invalid_argument, FirestoreResult};
use crate::firestore::model::{FieldPath, GeoPoint};
use crate::firestore::value::{FirestoreValue, ValueKind};

/// Largest integer a script number represents exactly (`Number.MAX_SAFE_INTEGER`).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A dynamically typed value as it crosses the script binding boundary.
///
/// Script code can hand the bridge anything, so constructors and `is_equal` receive
/// `ScriptValue`s and do their own type checks. Values the bridge hands back use the
/// same type; GeoPoints read from a document come back as [`ScriptValue::GeoPoint`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ScriptValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ScriptValue>),
    Object(BTreeMap<String, ScriptValue>),
    FieldPath(FieldPath),
    GeoPoint(GeoPoint),
}

impl ScriptValue {
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ScriptValue)>,
        K: Into<String>,
    {
        ScriptValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The script `typeof` of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Undefined => "undefined",
            ScriptValue::Bool(_) => "boolean",
            ScriptValue::Number(_) => "number",
            ScriptValue::String(_) => "string",
            ScriptValue::Null
            | ScriptValue::Array(_)
            | ScriptValue::Object(_)
            | ScriptValue::FieldPath(_)
            | ScriptValue::GeoPoint(_) => "object",
        }
    }

    /// The script constructor name for object values.
    pub fn constructor_name(&self) -> Option<&'static str> {
        match self {
            ScriptValue::Array(_) => Some("Array"),
            ScriptValue::Object(_) => Some("Object"),
            ScriptValue::FieldPath(_) => Some("FirestoreFieldPath"),
            ScriptValue::GeoPoint(_) => Some("FirestoreGeoPoint"),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ScriptValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_geo_point(&self) -> Option<&GeoPoint> {
        match self {
            ScriptValue::GeoPoint(point) => Some(point),
            _ => None,
        }
    }

    pub fn as_field_path(&self) -> Option<&FieldPath> {
        match self {
            ScriptValue::FieldPath(path) => Some(path),
            _ => None,
        }
    }

    /// Property lookup; `Undefined` for anything that is not an object or lacks `key`.
    pub fn get(&self, key: &str) -> &ScriptValue {
        static UNDEFINED: ScriptValue = ScriptValue::Undefined;
        match self {
            ScriptValue::Object(entries) => entries.get(key).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    /// The value `JSON.stringify` would produce; `Undefined` maps to `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            ScriptValue::Undefined | ScriptValue::Null => JsonValue::Null,
            ScriptValue::Bool(value) => JsonValue::Bool(*value),
            ScriptValue::Number(value) => number_to_json(*value),
            ScriptValue::String(value) => JsonValue::String(value.clone()),
            ScriptValue::Array(values) => {
                JsonValue::Array(values.iter().map(ScriptValue::to_json).collect())
            }
            ScriptValue::Object(entries) => JsonValue::Object(
                entries
                    .iter()
                    .filter(|(_, value)| !value.is_undefined())
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            ScriptValue::FieldPath(path) => JsonValue::Array(
                path.segments()
                    .iter()
                    .cloned()
                    .map(JsonValue::String)
                    .collect(),
            ),
            ScriptValue::GeoPoint(point) => point.to_json(),
        }
    }

    /// Converts a field value headed for the store.
    ///
    /// `field` names the enclosing field for error messages.
    pub(crate) fn to_firestore_value(&self, field: &str) -> FirestoreResult<FirestoreValue> {
        let value = match self {
            ScriptValue::Undefined => {
                return Err(invalid_argument(format!(
                    "Unsupported field value: undefined (found in field {field})"
                )))
            }
            ScriptValue::FieldPath(_) => {
                return Err(invalid_argument(format!(
                    "Unsupported field value: a FieldPath (found in field {field})"
                )))
            }
            ScriptValue::Null => FirestoreValue::null(),
            ScriptValue::Bool(value) => FirestoreValue::from_bool(*value),
            ScriptValue::Number(value) => number_to_firestore(*value),
            ScriptValue::String(value) => FirestoreValue::from_string(value.as_str()),
            ScriptValue::GeoPoint(point) => FirestoreValue::from_geo_point(*point),
            ScriptValue::Array(values) => FirestoreValue::from_array(
                values
                    .iter()
                    .map(|value| value.to_firestore_value(field))
                    .collect::<FirestoreResult<Vec<_>>>()?,
            ),
            ScriptValue::Object(entries) => {
                let mut fields = BTreeMap::new();
                for (key, value) in entries {
                    let nested = format!("{field}.{key}");
                    fields.insert(key.clone(), value.to_firestore_value(&nested)?);
                }
                FirestoreValue::from_map(fields)
            }
        };
        Ok(value)
    }

    pub(crate) fn from_firestore_value(value: &FirestoreValue) -> Self {
        match value.kind() {
            ValueKind::Null => ScriptValue::Null,
            ValueKind::Boolean(value) => ScriptValue::Bool(*value),
            ValueKind::Integer(value) => ScriptValue::Number(*value as f64),
            ValueKind::Double(value) => ScriptValue::Number(*value),
            ValueKind::String(value) => ScriptValue::String(value.clone()),
            ValueKind::GeoPoint(point) => ScriptValue::GeoPoint(*point),
            ValueKind::Array(array) => ScriptValue::Array(
                array
                    .values()
                    .iter()
                    .map(ScriptValue::from_firestore_value)
                    .collect(),
            ),
            ValueKind::Map(map) => ScriptValue::Object(
                map.fields()
                    .iter()
                    .map(|(key, value)| (key.clone(), ScriptValue::from_firestore_value(value)))
                    .collect(),
            ),
        }
    }
}

/// Whole numbers within the safe range, excluding `-0`, which only a double can hold.
fn is_safe_integer(value: f64) -> bool {
    value.is_finite()
        && value.fract() == 0.0
        && value.abs() <= MAX_SAFE_INTEGER
        && !(value == 0.0 && value.is_sign_negative())
}

fn number_to_firestore(value: f64) -> FirestoreValue {
    if is_safe_integer(value) {
        FirestoreValue::from_integer(value as i64)
    } else {
        FirestoreValue::from_double(value)
    }
}

fn number_to_json(value: f64) -> JsonValue {
    if is_safe_integer(value) {
        return JsonValue::Number(Number::from(value as i64));
    }
    Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        ScriptValue::Bool(value)
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        ScriptValue::Number(value)
    }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self {
        ScriptValue::Number(f64::from(value))
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        ScriptValue::String(value.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        ScriptValue::String(value)
    }
}

impl From<FieldPath> for ScriptValue {
    fn from(value: FieldPath) -> Self {
        ScriptValue::FieldPath(value)
    }
}

impl From<GeoPoint> for ScriptValue {
    fn from(value: GeoPoint) -> Self {
        ScriptValue::GeoPoint(value)
    }
}

impl From<Vec<ScriptValue>> for ScriptValue {
    fn from(values: Vec<ScriptValue>) -> Self {
        ScriptValue::Array(values)
    }
}

impl From<BTreeMap<String, ScriptValue>> for ScriptValue {
    fn from(entries: BTreeMap<String, ScriptValue>) -> Self {
        ScriptValue::Object(entries)
    }
}

impl From<JsonValue> for ScriptValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => ScriptValue::Null,
            JsonValue::Bool(value) => ScriptValue::Bool(value),
            JsonValue::Number(number) => ScriptValue::Number(number.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(value) => ScriptValue::String(value),
            JsonValue::Array(values) => {
                ScriptValue::Array(values.into_iter().map(ScriptValue::from).collect())
            }
            JsonValue::Object(entries) => ScriptValue::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, ScriptValue::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_script_type_names() {
        assert_eq!(ScriptValue::Undefined.type_name(), "undefined");
        assert_eq!(ScriptValue::from(1).type_name(), "number");
        assert_eq!(ScriptValue::from("1").type_name(), "string");
        let point = ScriptValue::from(GeoPoint::new(1.0, 2.0).unwrap());
        assert_eq!(point.type_name(), "object");
        assert_eq!(point.constructor_name(), Some("FirestoreGeoPoint"));
        assert_eq!(ScriptValue::Null.constructor_name(), None);
    }

    #[test]
    fn converts_from_json() {
        let value = ScriptValue::from(json!({ "a": [1, "two", null], "b": { "c": true } }));
        assert_eq!(
            value.get("a"),
            &ScriptValue::Array(vec![1.into(), "two".into(), ScriptValue::Null])
        );
        assert_eq!(value.get("b").get("c"), &ScriptValue::Bool(true));
        assert!(value.get("missing").is_undefined());
        assert!(ScriptValue::from(3).get("x").is_undefined());
    }

    #[test]
    fn json_output_matches_script_serialization() {
        let point = GeoPoint::new(30.0, 35.0).unwrap();
        let value = ScriptValue::object([
            ("geo", ScriptValue::from(point)),
            ("count", ScriptValue::from(2)),
            ("gone", ScriptValue::Undefined),
        ]);
        assert_eq!(
            value.to_json(),
            json!({ "geo": { "latitude": 30.0, "longitude": 35.0 }, "count": 2 })
        );
    }

    #[test]
    fn numbers_map_to_integers_when_exact() {
        let integer = ScriptValue::from(42).to_firestore_value("n").unwrap();
        assert_eq!(integer, FirestoreValue::from_integer(42));
        let double = ScriptValue::from(1.5).to_firestore_value("n").unwrap();
        assert_eq!(double, FirestoreValue::from_double(1.5));
        let huge = ScriptValue::from(1e300).to_firestore_value("n").unwrap();
        assert_eq!(huge, FirestoreValue::from_double(1e300));
    }

    #[test]
    fn negative_zero_stays_a_double() {
        let stored = ScriptValue::from(-0.0).to_firestore_value("n").unwrap();
        match stored.kind() {
            ValueKind::Double(value) => assert!(*value == 0.0 && value.is_sign_negative()),
            other => panic!("expected a double, got {other:?}"),
        }
        let restored = ScriptValue::from_firestore_value(&stored).as_number().unwrap();
        assert!(restored.is_sign_negative());

        let zero = ScriptValue::from(0.0).to_firestore_value("n").unwrap();
        assert_eq!(zero, FirestoreValue::from_integer(0));
        assert_eq!(ScriptValue::from(-0.0).to_json(), json!(-0.0));
    }

    #[test]
    fn undefined_and_field_paths_cannot_be_stored() {
        let nested = ScriptValue::object([("x", ScriptValue::Undefined)]);
        let data = ScriptValue::object([("nested", nested)]);
        let err = data.to_firestore_value("root").unwrap_err();
        assert!(err.message().contains("found in field root.nested.x"));

        let path = ScriptValue::from(FieldPath::document_id());
        assert!(path.to_firestore_value("p").is_err());
    }

    #[test]
    fn firestore_values_come_back_as_script_values() {
        let point = GeoPoint::new(-10.0, 10.0).unwrap();
        let stored = ScriptValue::object([
            ("at", ScriptValue::from(point)),
            ("n", ScriptValue::from(7)),
        ])
        .to_firestore_value("doc")
        .unwrap();
        let restored = ScriptValue::from_firestore_value(&stored);
        assert_eq!(restored.get("at").as_geo_point(), Some(&point));
        assert_eq!(restored.get("n").as_number(), Some(7.0));
    }
}
