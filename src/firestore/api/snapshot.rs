use std::collections::BTreeMap;

use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{DocumentKey, FieldPathPolicy, IntoFieldPath};
use crate::firestore::value::{FirestoreValue, MapValue};

/// Metadata about the state of a document snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    from_cache: bool,
    has_pending_writes: bool,
}

impl SnapshotMetadata {
    pub fn new(from_cache: bool, has_pending_writes: bool) -> Self {
        Self {
            from_cache,
            has_pending_writes,
        }
    }

    /// Indicates whether the snapshot was served from a local cache.
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// Indicates whether the snapshot contains uncommitted local mutations.
    pub fn has_pending_writes(&self) -> bool {
        self.has_pending_writes
    }
}

#[derive(Clone, Debug)]
pub struct DocumentSnapshot {
    key: DocumentKey,
    data: Option<MapValue>,
    metadata: SnapshotMetadata,
}

impl DocumentSnapshot {
    pub fn new(key: DocumentKey, data: Option<MapValue>, metadata: SnapshotMetadata) -> Self {
        Self {
            key,
            data,
            metadata,
        }
    }

    /// Returns whether the document exists on the backend.
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    /// Returns the decoded document fields if the snapshot contains data.
    pub fn data(&self) -> Option<&BTreeMap<String, FirestoreValue>> {
        self.data.as_ref().map(|map| map.fields())
    }

    pub fn map_value(&self) -> Option<&MapValue> {
        self.data.as_ref()
    }

    /// Reads a single, possibly nested, field.
    ///
    /// Returns `Ok(None)` when the document or the field is missing.
    pub fn get<F>(&self, field: F) -> FirestoreResult<Option<&FirestoreValue>>
    where
        F: IntoFieldPath,
    {
        self.get_with(field, &FieldPathPolicy::default())
    }

    pub(crate) fn get_with<F>(
        &self,
        field: F,
        policy: &FieldPathPolicy,
    ) -> FirestoreResult<Option<&FirestoreValue>>
    where
        F: IntoFieldPath,
    {
        let path = field.into_field_path_with(policy)?;
        Ok(self.data.as_ref().and_then(|map| map.get(&path)))
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &str {
        self.key.id()
    }

    pub fn document_key(&self) -> &DocumentKey {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::model::GeoPoint;

    #[test]
    fn metadata_flags() {
        let meta = SnapshotMetadata::new(true, false);
        assert!(meta.from_cache());
        assert!(!meta.has_pending_writes());
    }

    #[test]
    fn snapshot_reports_existence() {
        let key = DocumentKey::from_string("cities/sf").unwrap();
        let snapshot = DocumentSnapshot::new(key, None, SnapshotMetadata::default());
        assert!(!snapshot.exists());
        assert_eq!(snapshot.id(), "sf");
        assert_eq!(snapshot.get("anything").unwrap(), None);
    }

    #[test]
    fn reads_nested_fields() {
        let point = GeoPoint::new(37.7, -122.4).unwrap();
        let location = BTreeMap::from([("center".to_string(), FirestoreValue::from(point))]);
        let data = MapValue::new(BTreeMap::from([(
            "location".to_string(),
            FirestoreValue::from_map(location),
        )]));
        let key = DocumentKey::from_string("cities/sf").unwrap();
        let snapshot = DocumentSnapshot::new(key, Some(data), SnapshotMetadata::default());

        let value = snapshot.get("location.center").unwrap().unwrap();
        assert_eq!(value.as_geo_point(), Some(point));
        assert!(snapshot.get("location/center").is_err());
    }
}
