use firestore_script_bridge::firestore::script::{
    modular, FirebaseNamespace, ScriptEquality, ScriptValue,
};
use firestore_script_bridge::firestore::{Firestore, FirestoreSettings, GeoPoint};

const COLLECTION: &str = "firestore";

fn coordinates(
    latitude: impl Into<ScriptValue>,
    longitude: impl Into<ScriptValue>,
) -> Vec<ScriptValue> {
    vec![latitude.into(), longitude.into()]
}

fn namespace() -> FirebaseNamespace {
    let settings = FirestoreSettings::default().with_silenced_deprecation_warnings(true);
    FirebaseNamespace::new(Firestore::in_memory_with_settings("geo-point-tests", settings))
}

mod namespaced {
    use super::*;

    #[test]
    fn throws_without_both_coordinates() {
        let err = namespace().geo_point(&[ScriptValue::from(123)]).unwrap_err();
        assert!(err
            .message()
            .contains("constructor expected latitude and longitude values"));
    }

    #[test]
    fn throws_on_non_numeric_latitude() {
        let err = namespace().geo_point(&coordinates("123", "1234")).unwrap_err();
        assert!(err.message().contains("'latitude' must be a number value"));
    }

    #[test]
    fn throws_on_non_numeric_longitude() {
        let err = namespace().geo_point(&coordinates(123, "1234")).unwrap_err();
        assert!(err.message().contains("'longitude' must be a number value"));
    }

    #[test]
    fn throws_on_out_of_range_coordinates() {
        let firebase = namespace();
        let err = firebase.geo_point(&coordinates(-100, 200)).unwrap_err();
        assert!(err
            .message()
            .contains("'latitude' must be a number between -90 and 90"));

        let err = firebase.geo_point(&coordinates(90, 200)).unwrap_err();
        assert!(err
            .message()
            .contains("'longitude' must be a number between -180 and 180"));
    }

    #[test]
    fn exposes_coordinates() {
        let point = namespace().geo_point(&coordinates(90, 180)).unwrap();
        assert_eq!(point.latitude(), 90.0);
        assert_eq!(point.longitude(), 180.0);
    }

    #[test]
    fn is_equal_checks_argument_type() {
        let point = namespace().geo_point(&coordinates(90, 180)).unwrap();
        let err = point.is_equal(None).unwrap_err();
        assert!(err
            .message()
            .contains("'other' expected an instance of GeoPoint"));
    }

    #[test]
    fn is_equal_compares_coordinates() {
        let firebase = namespace();
        let point = firebase.geo_point(&coordinates(90, 180)).unwrap();
        let same = firebase.geo_point(&coordinates(90, 180)).unwrap();
        let different = firebase.geo_point(&coordinates(90, 179)).unwrap();
        assert!(point.is_equal(Some(&same.into())).unwrap());
        assert!(!point.is_equal(Some(&different.into())).unwrap());
    }

    #[test]
    fn serializes_to_plain_record() {
        let point = namespace().geo_point(&coordinates(90, 180)).unwrap();
        let json = point.to_json();
        assert_eq!(json["latitude"], 90.0);
        assert_eq!(json["longitude"], 180.0);
        assert_eq!(json.as_object().map(|record| record.len()), Some(2));
    }

    #[tokio::test]
    async fn round_trips_through_a_document() {
        let firebase = namespace();
        let reference = firebase
            .firestore()
            .doc(&format!("{COLLECTION}/geopoint"))
            .unwrap();
        let point = firebase.geo_point(&coordinates(20, 30)).unwrap();

        reference
            .set(ScriptValue::object([("geopoint", ScriptValue::from(point))]))
            .await
            .unwrap();

        let snapshot = reference.get().await.unwrap();
        let data = snapshot.data().unwrap();
        let stored = data.get("geopoint");
        assert_eq!(stored.constructor_name(), Some("FirestoreGeoPoint"));
        let stored = stored.as_geo_point().unwrap();
        assert_eq!(stored.latitude(), 20.0);
        assert_eq!(stored.longitude(), 30.0);

        reference.delete().await.unwrap();
        assert!(!reference.get().await.unwrap().exists());
    }
}

mod modular_api {
    use super::*;

    #[test]
    fn checks_arguments_like_the_namespaced_surface() {
        let err = modular::geo_point(&[ScriptValue::from(123)]).unwrap_err();
        assert!(err
            .message()
            .contains("constructor expected latitude and longitude values"));

        let err = modular::geo_point(&coordinates("123", "1234")).unwrap_err();
        assert!(err.message().contains("'latitude' must be a number value"));

        let err = modular::geo_point(&coordinates(123, "1234")).unwrap_err();
        assert!(err.message().contains("'longitude' must be a number value"));

        let err = modular::geo_point(&coordinates(-100, 200)).unwrap_err();
        assert!(err
            .message()
            .contains("'latitude' must be a number between -90 and 90"));

        let err = modular::geo_point(&coordinates(90, 200)).unwrap_err();
        assert!(err
            .message()
            .contains("'longitude' must be a number between -180 and 180"));
    }

    #[test]
    fn is_equal_compares_coordinates() {
        let point = modular::geo_point(&coordinates(90, 180)).unwrap();
        let same = ScriptValue::from(GeoPoint::new(90.0, 180.0).unwrap());
        let different = ScriptValue::from(GeoPoint::new(90.0, 179.0).unwrap());
        assert!(point.is_equal(Some(&same)).unwrap());
        assert!(!point.is_equal(Some(&different)).unwrap());
        assert!(point.is_equal(None).is_err());
    }

    #[tokio::test]
    async fn round_trips_through_a_document() {
        let db = Firestore::in_memory("geo-point-tests");
        let reference = modular::doc(&db, &format!("{COLLECTION}/geopoint")).unwrap();
        let point = modular::geo_point(&coordinates(20, 30)).unwrap();

        modular::set_doc(
            &reference,
            ScriptValue::object([("geopoint", ScriptValue::from(point))]),
        )
        .await
        .unwrap();

        let snapshot = modular::get_doc(&reference).await.unwrap();
        let stored = snapshot
            .get(&ScriptValue::from("geopoint"))
            .unwrap();
        assert_eq!(stored.constructor_name(), Some("FirestoreGeoPoint"));
        assert!(point.is_equal(Some(&stored)).unwrap());

        modular::delete_doc(&reference).await.unwrap();
        assert!(!modular::get_doc(&reference).await.unwrap().exists());
    }

    #[tokio::test]
    async fn documents_written_by_one_surface_read_back_in_the_other() {
        let firebase = namespace();
        let db = modular::get_firestore(&firebase);
        let point = modular::geo_point(&coordinates(-33.86, 151.21)).unwrap();

        let collection = modular::collection(&db, "places").unwrap();
        let reference = modular::add_doc(
            &collection,
            ScriptValue::object([("at", ScriptValue::from(point))]),
        )
        .await
        .unwrap();

        let snapshot = firebase
            .firestore()
            .doc(&reference.path().canonical_string())
            .unwrap()
            .get()
            .await
            .unwrap();
        assert_eq!(
            snapshot.data().unwrap().get("at").as_geo_point(),
            Some(&point)
        );
    }
}
