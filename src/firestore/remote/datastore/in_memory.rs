use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::firestore::api::{
    DocumentSnapshot, FieldFilter, FilterOperator, QueryDefinition, SnapshotMetadata,
};
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{DatabaseId, DocumentKey};
use crate::firestore::remote::serializer::JsonProtoSerializer;
use crate::firestore::value::{FirestoreValue, MapValue, ValueKind};

use super::Datastore;

/// Keeps documents in process memory, encoded the way the REST API would return them.
///
/// Every read decodes the stored JSON again, so values such as GeoPoints come back as
/// freshly validated instances rather than shared copies of what was written.
#[derive(Clone)]
pub struct InMemoryDatastore {
    serializer: JsonProtoSerializer,
    documents: Arc<Mutex<BTreeMap<DocumentKey, JsonValue>>>,
}

impl InMemoryDatastore {
    pub fn new(database_id: DatabaseId) -> Self {
        Self {
            serializer: JsonProtoSerializer::new(database_id),
            documents: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Number of stored documents across all collections.
    pub fn len(&self) -> usize {
        self.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
    }

    fn store(&self) -> MutexGuard<'_, BTreeMap<DocumentKey, JsonValue>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn decode(&self, encoded: &JsonValue) -> FirestoreResult<(DocumentKey, MapValue)> {
        self.serializer.decode_document(encoded)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Datastore for InMemoryDatastore {
    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<DocumentSnapshot> {
        let encoded = self.store().get(key).cloned();
        let data = match encoded {
            Some(encoded) => Some(self.decode(&encoded)?.1),
            None => None,
        };
        Ok(DocumentSnapshot::new(
            key.clone(),
            data,
            SnapshotMetadata::new(false, false),
        ))
    }

    async fn set_document(&self, key: &DocumentKey, data: MapValue) -> FirestoreResult<()> {
        let encoded = self.serializer.encode_document(key, &data);
        log::debug!("in-memory set {}", key.path());
        self.store().insert(key.clone(), encoded);
        Ok(())
    }

    async fn delete_document(&self, key: &DocumentKey) -> FirestoreResult<()> {
        if self.store().remove(key).is_none() {
            log::debug!("in-memory delete of missing document {}", key.path());
        }
        Ok(())
    }

    async fn run_query(&self, query: &QueryDefinition) -> FirestoreResult<Vec<DocumentSnapshot>> {
        let candidates: Vec<JsonValue> = self
            .store()
            .iter()
            .filter(|(key, _)| query.matches_collection(key))
            .map(|(_, encoded)| encoded.clone())
            .collect();

        let mut documents = Vec::new();
        for encoded in candidates {
            let (key, data) = self.decode(&encoded)?;
            if query
                .filters()
                .iter()
                .all(|filter| document_satisfies(&key, &data, filter))
            {
                documents.push(DocumentSnapshot::new(
                    key,
                    Some(data),
                    SnapshotMetadata::new(false, false),
                ));
            }
        }

        if let Some(limit) = query.limit() {
            documents.truncate(limit as usize);
        }
        Ok(documents)
    }
}

fn document_satisfies(key: &DocumentKey, data: &MapValue, filter: &FieldFilter) -> bool {
    if filter.field().is_document_id() {
        let id = FirestoreValue::from_string(key.id());
        return evaluate_filter(filter, &id);
    }
    match data.get(filter.field()) {
        Some(value) => evaluate_filter(filter, value),
        None => false,
    }
}

fn evaluate_filter(filter: &FieldFilter, value: &FirestoreValue) -> bool {
    let operand = filter.value();
    match filter.operator() {
        FilterOperator::Equal => value.query_equals(operand),
        FilterOperator::NotEqual => !value.is_null() && !value.query_equals(operand),
        FilterOperator::LessThan => value.compare(operand) == Some(Ordering::Less),
        FilterOperator::LessThanOrEqual => matches!(
            value.compare(operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::GreaterThan => value.compare(operand) == Some(Ordering::Greater),
        FilterOperator::GreaterThanOrEqual => matches!(
            value.compare(operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::ArrayContains => match value.kind() {
            ValueKind::Array(array) => array.contains(operand),
            _ => false,
        },
        FilterOperator::ArrayContainsAny => match (value.kind(), operand.kind()) {
            (ValueKind::Array(array), ValueKind::Array(needles)) => {
                needles.values().iter().any(|needle| array.contains(needle))
            }
            _ => false,
        },
        FilterOperator::In => match operand.kind() {
            ValueKind::Array(candidates) => candidates.contains(value),
            _ => false,
        },
        FilterOperator::NotIn => match operand.kind() {
            ValueKind::Array(candidates) => !value.is_null() && !candidates.contains(value),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::api::Firestore;
    use crate::firestore::model::GeoPoint;

    fn key(path: &str) -> DocumentKey {
        DocumentKey::from_string(path).unwrap()
    }

    #[tokio::test]
    async fn in_memory_get_set() {
        let datastore = InMemoryDatastore::new(DatabaseId::default("project"));
        let key = key("cities/sf");
        let point = GeoPoint::new(37.77, -122.42).unwrap();
        let map = MapValue::new(BTreeMap::from([
            ("name".to_string(), FirestoreValue::from_string("SF")),
            ("location".to_string(), FirestoreValue::from(point)),
        ]));
        datastore.set_document(&key, map.clone()).await.unwrap();
        assert_eq!(datastore.len(), 1);

        let snapshot = datastore.get_document(&key).await.unwrap();
        assert!(snapshot.exists());
        assert_eq!(snapshot.map_value(), Some(&map));
        assert_eq!(
            snapshot.data().unwrap().get("location").and_then(FirestoreValue::as_geo_point),
            Some(point)
        );
    }

    #[tokio::test]
    async fn delete_missing_document_succeeds() {
        let datastore = InMemoryDatastore::new(DatabaseId::default("project"));
        datastore.delete_document(&key("cities/nowhere")).await.unwrap();
        assert!(datastore.is_empty());
    }

    #[tokio::test]
    async fn evaluates_filters_and_limits() {
        let firestore = Firestore::in_memory("project");
        let cities = firestore.collection("cities").unwrap();
        let rows = [
            ("a", 1, vec!["west"]),
            ("b", 5, vec!["east", "coast"]),
            ("c", 10, vec!["west", "coast"]),
        ];
        for (id, rank, tags) in rows {
            let tags = tags.into_iter().map(FirestoreValue::from_string).collect();
            cities
                .doc(Some(id))
                .unwrap()
                .set(BTreeMap::from([
                    ("rank".to_string(), FirestoreValue::from_integer(rank)),
                    ("tags".to_string(), FirestoreValue::from_array(tags)),
                ]))
                .await
                .unwrap();
        }

        let ids = |snapshot: crate::firestore::api::QuerySnapshot| {
            snapshot
                .into_iter()
                .map(|doc| doc.id().to_string())
                .collect::<Vec<_>>()
        };

        let query = cities
            .query()
            .where_field(
                "rank",
                FilterOperator::GreaterThanOrEqual,
                FirestoreValue::from_double(5.0),
            )
            .unwrap();
        assert_eq!(ids(query.get().await.unwrap()), ["b", "c"]);

        let query = cities
            .query()
            .where_field(
                "tags",
                FilterOperator::ArrayContains,
                FirestoreValue::from_string("coast"),
            )
            .unwrap()
            .limit(1)
            .unwrap();
        assert_eq!(ids(query.get().await.unwrap()), ["b"]);

        let query = cities
            .query()
            .where_field(
                crate::firestore::model::FieldPath::document_id(),
                FilterOperator::In,
                FirestoreValue::from_array(vec![
                    FirestoreValue::from_string("a"),
                    FirestoreValue::from_string("c"),
                ]),
            )
            .unwrap();
        assert_eq!(ids(query.get().await.unwrap()), ["a", "c"]);

        let query = cities
            .query()
            .where_field("rank", FilterOperator::NotEqual, FirestoreValue::from_integer(5))
            .unwrap()
            .where_field("missing", FilterOperator::Equal, FirestoreValue::null())
            .unwrap();
        assert!(query.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filters_on_geo_points() {
        let firestore = Firestore::in_memory("project");
        let places = firestore.collection("places").unwrap();
        for (id, lat) in [("north", 60.0), ("south", -45.0)] {
            let point = GeoPoint::new(lat, 0.0).unwrap();
            places
                .doc(Some(id))
                .unwrap()
                .set(BTreeMap::from([("at".to_string(), FirestoreValue::from(point))]))
                .await
                .unwrap();
        }

        let equator = FirestoreValue::from(GeoPoint::new(0.0, 0.0).unwrap());
        let north = places
            .query()
            .where_field("at", FilterOperator::GreaterThan, equator)
            .unwrap()
            .get()
            .await
            .unwrap();
        assert_eq!(north.len(), 1);
        assert_eq!(north.documents()[0].id(), "north");
    }
}
