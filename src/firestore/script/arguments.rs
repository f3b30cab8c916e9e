//! Argument checks shared by the namespaced and modular surfaces.
//!
//! Both surfaces receive loosely typed script arguments; every check lives here once so
//! the two surfaces cannot drift apart in what they accept or the errors they report.

use std::collections::BTreeMap;

use crate::firestore::api::{FilterOperator, Query};
use crate::firestore::error::{invalid_argument, FirestoreError, FirestoreResult};
use crate::firestore::model::{
    invalid_segment, no_segments, not_a_number, FieldPath, FieldPathPolicy, GeoPoint,
};
use crate::firestore::value::FirestoreValue;

use super::value::ScriptValue;

/// Builds a field path from constructor arguments, one segment per argument.
pub fn field_path_from_arguments(arguments: &[ScriptValue]) -> FirestoreResult<FieldPath> {
    if arguments.is_empty() {
        return Err(no_segments());
    }
    let mut segments = Vec::with_capacity(arguments.len());
    for (index, argument) in arguments.iter().enumerate() {
        match argument {
            ScriptValue::String(segment) if !segment.is_empty() => segments.push(segment.clone()),
            _ => return Err(invalid_segment(index)),
        }
    }
    FieldPath::new(segments)
}

/// Builds a GeoPoint from constructor arguments.
///
/// Checks run in order: argument count, latitude type, longitude type, then the ranges.
pub fn geo_point_from_arguments(arguments: &[ScriptValue]) -> FirestoreResult<GeoPoint> {
    let [latitude, longitude] = arguments else {
        return Err(invalid_argument(
            "firebase.firestore.GeoPoint constructor expected latitude and longitude values.",
        ));
    };
    let latitude = latitude.as_number().ok_or_else(|| not_a_number("latitude"))?;
    let longitude = longitude
        .as_number()
        .ok_or_else(|| not_a_number("longitude"))?;
    GeoPoint::new(latitude, longitude)
}

/// Equality as script code sees it: comparing against anything but the same kind of
/// value is an argument error rather than `false`.
pub trait ScriptEquality {
    fn is_equal(&self, other: Option<&ScriptValue>) -> FirestoreResult<bool>;
}

impl ScriptEquality for FieldPath {
    fn is_equal(&self, other: Option<&ScriptValue>) -> FirestoreResult<bool> {
        match other {
            Some(ScriptValue::FieldPath(other)) => Ok(self == other),
            _ => Err(invalid_argument(
                "firebase.firestore.FieldPath.isEqual(*) 'other' expected instance of FieldPath.",
            )),
        }
    }
}

impl ScriptEquality for GeoPoint {
    fn is_equal(&self, other: Option<&ScriptValue>) -> FirestoreResult<bool> {
        match other {
            Some(ScriptValue::GeoPoint(other)) => Ok(self == other),
            _ => Err(invalid_argument(
                "firebase.firestore.GeoPoint.isEqual(*) 'other' expected an instance of GeoPoint.",
            )),
        }
    }
}

/// Resolves the `fieldPath` argument of `where`: a dotted string checked against
/// `policy`, or a ready-made [`FieldPath`].
pub fn field_path_argument(
    field: &ScriptValue,
    policy: &FieldPathPolicy,
) -> FirestoreResult<FieldPath> {
    match field {
        ScriptValue::String(path) => FieldPath::from_dot_separated_with(path, policy),
        ScriptValue::FieldPath(path) => Ok(path.clone()),
        _ => Err(invalid_field_argument()),
    }
}

fn invalid_field_argument() -> FirestoreError {
    invalid_argument(
        "firebase.firestore().collection().where(*) 'fieldPath' must be a string or instance of FieldPath.",
    )
}

/// A `where` clause whose arguments have been checked but not yet bound to a query.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WhereArguments {
    field: ScriptValue,
    operator: FilterOperator,
    value: FirestoreValue,
}

impl WhereArguments {
    /// Runs the checks that do not depend on an instance. Reserved characters are checked
    /// by [`WhereArguments::apply`] against the policy of the query's instance.
    pub(crate) fn parse(
        field: ScriptValue,
        operator: &str,
        value: &ScriptValue,
    ) -> FirestoreResult<Self> {
        match &field {
            ScriptValue::String(path) => FieldPathPolicy::check_shape(path)?,
            ScriptValue::FieldPath(_) => {}
            _ => return Err(invalid_field_argument()),
        }
        let operator = operator.parse::<FilterOperator>()?;
        let value = value.to_firestore_value("where")?;
        Ok(Self {
            field,
            operator,
            value,
        })
    }

    pub(crate) fn apply(&self, query: &Query) -> FirestoreResult<Query> {
        let policy = &query.firestore().settings().field_path_policy;
        let field = field_path_argument(&self.field, policy)?;
        query.where_field(field, self.operator, self.value.clone())
    }
}

/// Converts the `data` argument of `set`/`add` into document fields.
pub fn document_data(data: &ScriptValue) -> FirestoreResult<BTreeMap<String, FirestoreValue>> {
    let ScriptValue::Object(entries) = data else {
        return Err(invalid_argument(
            "firebase.firestore().doc().set(*) 'data' must be an object.",
        ));
    };
    let mut fields = BTreeMap::new();
    for (key, value) in entries {
        fields.insert(key.clone(), value.to_firestore_value(key)?);
    }
    Ok(fields)
}
