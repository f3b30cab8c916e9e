use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::firestore::error::{invalid_argument, FirestoreError, FirestoreResult};

/// An immutable latitude/longitude pair.
///
/// Latitude is always within `[-90, 90]` and longitude within `[-180, 180]`; both are
/// finite. Serializes as `{ "latitude": .., "longitude": .. }` and deserializes through
/// [`GeoPoint::new`], so out-of-range input is rejected on the way in too.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoPointFields")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct GeoPointFields {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<GeoPointFields> for GeoPoint {
    type Error = FirestoreError;

    fn try_from(fields: GeoPointFields) -> Result<Self, Self::Error> {
        GeoPoint::new(fields.latitude, fields.longitude)
    }
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> FirestoreResult<Self> {
        if !latitude.is_finite() {
            return Err(not_a_number("latitude"));
        }
        if !longitude.is_finite() {
            return Err(not_a_number("longitude"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid_argument(format!(
                "firebase.firestore.GeoPoint 'latitude' must be a number between -90 and 90, but was: {latitude}."
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid_argument(format!(
                "firebase.firestore.GeoPoint 'longitude' must be a number between -180 and 180, but was: {longitude}."
            )));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Plain record form: exactly the `latitude` and `longitude` keys.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "latitude": self.latitude,
            "longitude": self.longitude,
        })
    }

    /// Orders by latitude, then longitude.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.latitude
            .total_cmp(&other.latitude)
            .then_with(|| self.longitude.total_cmp(&other.longitude))
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GeoPoint(latitude={}, longitude={})",
            self.latitude, self.longitude
        )
    }
}

pub(crate) fn not_a_number(field: &str) -> FirestoreError {
    invalid_argument(format!(
        "firebase.firestore.GeoPoint '{field}' must be a number value."
    ))
}
