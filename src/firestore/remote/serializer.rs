use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::{json, Value as JsonValue};

use crate::firestore::error::{invalid_argument, FirestoreResult};
use crate::firestore::model::{DatabaseId, DocumentKey, GeoPoint};
use crate::firestore::value::{FirestoreValue, MapValue, ValueKind};

/// Encodes documents in the Firestore REST (JSON proto) representation.
#[derive(Clone, Debug)]
pub struct JsonProtoSerializer {
    database_id: DatabaseId,
}

impl JsonProtoSerializer {
    pub fn new(database_id: DatabaseId) -> Self {
        Self { database_id }
    }

    pub fn document_name(&self, key: &DocumentKey) -> String {
        format!(
            "{}/documents/{}",
            self.database_id.resource_name(),
            key.path().canonical_string()
        )
    }

    /// Recovers the document key from a fully qualified document name.
    pub fn decode_document_name(&self, name: &str) -> FirestoreResult<DocumentKey> {
        let prefix = format!("{}/documents/", self.database_id.resource_name());
        let relative = name.strip_prefix(&prefix).ok_or_else(|| {
            invalid_argument(format!(
                "Document name {name} does not belong to {}",
                self.database_id.resource_name()
            ))
        })?;
        DocumentKey::from_string(relative)
    }

    pub fn encode_document(&self, key: &DocumentKey, map: &MapValue) -> JsonValue {
        json!({
            "name": self.document_name(key),
            "fields": encode_map_fields(map),
        })
    }

    pub fn decode_document(&self, value: &JsonValue) -> FirestoreResult<(DocumentKey, MapValue)> {
        let name = value
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| invalid_argument("Document is missing its name"))?;
        let key = self.decode_document_name(name)?;
        Ok((key, decode_map_value(value)?))
    }

    pub fn encode_value(&self, value: &FirestoreValue) -> JsonValue {
        encode_value(value)
    }

    pub fn decode_value(&self, value: &JsonValue) -> FirestoreResult<FirestoreValue> {
        decode_value(value)
    }
}

fn encode_map_fields(map: &MapValue) -> JsonValue {
    let mut fields = serde_json::Map::new();
    for (key, value) in map.fields() {
        fields.insert(key.clone(), encode_value(value));
    }
    JsonValue::Object(fields)
}

fn encode_value(value: &FirestoreValue) -> JsonValue {
    match value.kind() {
        ValueKind::Null => json!({ "nullValue": JsonValue::Null }),
        ValueKind::Boolean(boolean) => json!({ "booleanValue": boolean }),
        ValueKind::Integer(integer) => json!({ "integerValue": integer.to_string() }),
        ValueKind::Double(double) if double.is_nan() => json!({ "doubleValue": "NaN" }),
        ValueKind::Double(double) if double.is_infinite() => json!({
            "doubleValue": if *double > 0.0 { "Infinity" } else { "-Infinity" }
        }),
        ValueKind::Double(double) => json!({ "doubleValue": double }),
        ValueKind::String(string) => json!({ "stringValue": string }),
        ValueKind::GeoPoint(point) => json!({
            "geoPointValue": {
                "latitude": point.latitude(),
                "longitude": point.longitude(),
            }
        }),
        ValueKind::Array(array) => {
            let values = array.values().iter().map(encode_value).collect::<Vec<_>>();
            json!({ "arrayValue": { "values": values } })
        }
        ValueKind::Map(map) => json!({
            "mapValue": {
                "fields": encode_map_fields(map)
            }
        }),
    }
}

fn decode_map_value(value: &JsonValue) -> FirestoreResult<MapValue> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid_argument("Expected object for map value"))?;
    let fields_object = match map.get("fields") {
        Some(fields_value) => fields_value
            .as_object()
            .ok_or_else(|| invalid_argument("Expected 'fields' to be an object"))?,
        None => return Ok(MapValue::default()),
    };

    let mut fields = BTreeMap::new();
    for (key, value) in fields_object {
        fields.insert(key.clone(), decode_value(value)?);
    }
    Ok(MapValue::new(fields))
}

fn decode_value(value: &JsonValue) -> FirestoreResult<FirestoreValue> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid_argument("Expected Firestore value object"))?;
    if let Some(null_value) = object.get("nullValue") {
        if null_value.is_null() {
            return Ok(FirestoreValue::null());
        }
    }
    if let Some(bool_value) = object.get("booleanValue") {
        let value = bool_value
            .as_bool()
            .ok_or_else(|| invalid_argument("booleanValue must be bool"))?;
        return Ok(FirestoreValue::from_bool(value));
    }
    if let Some(integer_value) = object.get("integerValue") {
        let parsed = match integer_value {
            JsonValue::String(value) => i64::from_str(value)
                .map_err(|err| invalid_argument(format!("Invalid integerValue: {err}")))?,
            JsonValue::Number(number) => number
                .as_i64()
                .ok_or_else(|| invalid_argument("Integer out of range"))?,
            _ => return Err(invalid_argument("integerValue must be a string or number")),
        };
        return Ok(FirestoreValue::from_integer(parsed));
    }
    if let Some(double_value) = object.get("doubleValue") {
        let parsed = match double_value {
            JsonValue::Number(number) => number
                .as_f64()
                .ok_or_else(|| invalid_argument("Invalid doubleValue"))?,
            JsonValue::String(value) => value
                .parse::<f64>()
                .map_err(|err| invalid_argument(format!("Invalid doubleValue: {err}")))?,
            _ => return Err(invalid_argument("doubleValue must be a number or string")),
        };
        return Ok(FirestoreValue::from_double(parsed));
    }
    if let Some(string_value) = object.get("stringValue") {
        let str_value = string_value
            .as_str()
            .ok_or_else(|| invalid_argument("stringValue must be string"))?;
        return Ok(FirestoreValue::from_string(str_value));
    }
    if let Some(geo_point) = object.get("geoPointValue") {
        // the REST API omits zero coordinates
        let coordinate = |name: &str| match geo_point.get(name) {
            None => Ok(0.0),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| invalid_argument(format!("geoPointValue.{name} must be f64"))),
        };
        let point = GeoPoint::new(coordinate("latitude")?, coordinate("longitude")?)?;
        return Ok(FirestoreValue::from_geo_point(point));
    }
    if let Some(array_value) = object.get("arrayValue") {
        let decoded = match array_value.get("values").and_then(JsonValue::as_array) {
            Some(entries) => entries
                .iter()
                .map(decode_value)
                .collect::<FirestoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        return Ok(FirestoreValue::from_array(decoded));
    }
    if let Some(map_value) = object.get("mapValue") {
        let map = decode_map_value(map_value)?;
        return Ok(FirestoreValue::from_map(map.into_fields()));
    }

    Err(invalid_argument("Unknown Firestore value type"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serializer() -> JsonProtoSerializer {
        JsonProtoSerializer::new(DatabaseId::default("project"))
    }

    #[test]
    fn encodes_geo_point_value() {
        let point = GeoPoint::new(20.0, 30.0).unwrap();
        let encoded = serializer().encode_value(&FirestoreValue::from_geo_point(point));
        assert_eq!(
            encoded,
            json!({ "geoPointValue": { "latitude": 20.0, "longitude": 30.0 } })
        );
    }

    #[test]
    fn document_keeps_nested_geo_points() {
        let point = GeoPoint::new(-33.8, 151.2).unwrap();
        let nested = BTreeMap::from([("where".to_string(), FirestoreValue::from(point))]);
        let map = MapValue::new(BTreeMap::from([
            ("name".to_string(), FirestoreValue::from_string("Sydney")),
            ("location".to_string(), FirestoreValue::from_map(nested)),
            (
                "stops".to_string(),
                FirestoreValue::from_array(vec![FirestoreValue::from(point)]),
            ),
        ]));
        let key = DocumentKey::from_string("cities/syd").unwrap();

        let serializer = serializer();
        let encoded = serializer.encode_document(&key, &map);
        assert_eq!(
            encoded["name"],
            "projects/project/databases/(default)/documents/cities/syd"
        );

        let (decoded_key, decoded) = serializer.decode_document(&encoded).unwrap();
        assert_eq!(decoded_key, key);
        assert_eq!(decoded, map);
    }

    #[test]
    fn decodes_omitted_zero_coordinates() {
        let decoded = serializer()
            .decode_value(&json!({ "geoPointValue": { "longitude": 12.0 } }))
            .unwrap();
        assert_eq!(decoded.as_geo_point(), Some(GeoPoint::new(0.0, 12.0).unwrap()));
    }

    #[test]
    fn rejects_out_of_range_geo_point() {
        let err = serializer()
            .decode_value(&json!({ "geoPointValue": { "latitude": 95.0, "longitude": 0.0 } }))
            .unwrap_err();
        assert!(err.message().contains("'latitude' must be a number between -90 and 90"));
    }

    #[test]
    fn rejects_foreign_document_names() {
        let err = serializer()
            .decode_document_name("projects/other/databases/(default)/documents/cities/sf")
            .unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[test]
    fn non_finite_doubles_survive_encoding() {
        let serializer = serializer();
        let encoded = serializer.encode_value(&FirestoreValue::from_double(f64::NEG_INFINITY));
        assert_eq!(encoded, json!({ "doubleValue": "-Infinity" }));
        let decoded = serializer.decode_value(&encoded).unwrap();
        assert_eq!(decoded, FirestoreValue::from_double(f64::NEG_INFINITY));

        let nan = serializer.encode_value(&FirestoreValue::from_double(f64::NAN));
        match serializer.decode_value(&nan).unwrap().kind() {
            ValueKind::Double(value) => assert!(value.is_nan()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
