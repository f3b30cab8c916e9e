use std::collections::BTreeMap;

use crate::firestore::api::{DocumentSnapshot, QuerySnapshot, SnapshotMetadata};
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::FieldPathPolicy;

use super::arguments::field_path_argument;
use super::value::ScriptValue;

/// A document snapshot whose fields read back as [`ScriptValue`]s.
#[derive(Clone, Debug)]
pub struct ScriptDocumentSnapshot {
    inner: DocumentSnapshot,
    policy: FieldPathPolicy,
}

impl ScriptDocumentSnapshot {
    pub(crate) fn new(inner: DocumentSnapshot, policy: FieldPathPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn exists(&self) -> bool {
        self.inner.exists()
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        self.inner.metadata()
    }

    /// The document fields as an `Object`, or `None` when the document does not exist.
    ///
    /// Stored GeoPoints come back as [`ScriptValue::GeoPoint`].
    pub fn data(&self) -> Option<ScriptValue> {
        self.inner.data().map(|fields| {
            ScriptValue::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), ScriptValue::from_firestore_value(value)))
                    .collect::<BTreeMap<_, _>>(),
            )
        })
    }

    /// Reads one field; `Undefined` when the document or the field is missing.
    pub fn get(&self, field: &ScriptValue) -> FirestoreResult<ScriptValue> {
        let path = field_path_argument(field, &self.policy)?;
        Ok(self
            .inner
            .get_with(&path, &self.policy)?
            .map(ScriptValue::from_firestore_value)
            .unwrap_or_default())
    }

    pub fn inner(&self) -> &DocumentSnapshot {
        &self.inner
    }
}

/// Result of running a query from script code.
#[derive(Clone, Debug)]
pub struct ScriptQuerySnapshot {
    docs: Vec<ScriptDocumentSnapshot>,
}

impl ScriptQuerySnapshot {
    pub(crate) fn new(snapshot: QuerySnapshot, policy: &FieldPathPolicy) -> Self {
        let docs = snapshot
            .into_documents()
            .into_iter()
            .map(|document| ScriptDocumentSnapshot::new(document, policy.clone()))
            .collect();
        Self { docs }
    }

    pub fn docs(&self) -> &[ScriptDocumentSnapshot] {
        &self.docs
    }

    pub fn size(&self) -> usize {
        self.docs.len()
    }

    pub fn empty(&self) -> bool {
        self.docs.is_empty()
    }
}
