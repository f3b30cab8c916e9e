use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::firestore::constants::AUTO_ID_LENGTH;
use crate::firestore::error::{invalid_argument, FirestoreResult};
use crate::firestore::model::{DocumentKey, ResourcePath};
use crate::firestore::value::FirestoreValue;

use super::database::Firestore;
use super::document;
use super::query::Query;
use super::snapshot::DocumentSnapshot;

#[derive(Clone, Debug)]
pub struct CollectionReference {
    firestore: Firestore,
    path: ResourcePath,
}

impl CollectionReference {
    pub(crate) fn new(firestore: Firestore, path: ResourcePath) -> FirestoreResult<Self> {
        if path.len() % 2 == 0 {
            return Err(invalid_argument(format!(
                "Invalid collection reference. Collection references must have an odd number of segments, but {} has {}.",
                path.canonical_string(),
                path.len()
            )));
        }
        Ok(Self { firestore, path })
    }

    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    /// The full resource path of the collection (e.g. `rooms/eros/messages`).
    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.last_segment().unwrap_or_default()
    }

    /// Returns the document that logically contains this collection, if any.
    pub fn parent(&self) -> Option<DocumentReference> {
        let parent_path = self.path.without_last();
        if parent_path.is_empty() {
            return None;
        }
        DocumentReference::new(self.firestore.clone(), parent_path).ok()
    }

    /// Returns a reference to the document identified by `document_id`.
    ///
    /// When `document_id` is `None`, an auto-ID is generated.
    pub fn doc(&self, document_id: Option<&str>) -> FirestoreResult<DocumentReference> {
        let id = document_id
            .map(|id| id.to_string())
            .unwrap_or_else(generate_auto_id);
        if id.is_empty() || id.contains('/') {
            return Err(invalid_argument(format!(
                "Invalid document ID ({id}). Document IDs must be non-empty and cannot contain '/'."
            )));
        }
        DocumentReference::new(self.firestore.clone(), self.path.child([id]))
    }

    /// Creates a query that targets this collection.
    pub fn query(&self) -> Query {
        Query::new(self.firestore.clone(), self.path.clone())
    }

    /// Writes `data` to a new document with a generated id.
    pub async fn add(
        &self,
        data: BTreeMap<String, FirestoreValue>,
    ) -> FirestoreResult<DocumentReference> {
        document::add_doc(self, data).await
    }
}

impl Display for CollectionReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CollectionReference({})", self.path.canonical_string())
    }
}

#[derive(Clone, Debug)]
pub struct DocumentReference {
    firestore: Firestore,
    key: DocumentKey,
}

impl DocumentReference {
    pub(crate) fn new(firestore: Firestore, path: ResourcePath) -> FirestoreResult<Self> {
        let key = DocumentKey::from_path(path)?;
        Ok(Self { firestore, key })
    }

    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    pub fn id(&self) -> &str {
        self.key.id()
    }

    pub fn path(&self) -> &ResourcePath {
        self.key.path()
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// The parent collection containing this document.
    pub fn parent(&self) -> CollectionReference {
        CollectionReference {
            firestore: self.firestore.clone(),
            path: self.key.collection_path(),
        }
    }

    /// Returns a reference to a subcollection rooted at this document.
    pub fn collection(&self, path: &str) -> FirestoreResult<CollectionReference> {
        let sub_path = ResourcePath::from_string(path)?;
        let full_path = self.key.path().child(sub_path.iter().cloned());
        CollectionReference::new(self.firestore.clone(), full_path)
    }

    pub async fn get(&self) -> FirestoreResult<DocumentSnapshot> {
        document::get_doc(self).await
    }

    /// Replaces the document's contents with `data`.
    pub async fn set(&self, data: BTreeMap<String, FirestoreValue>) -> FirestoreResult<()> {
        document::set_doc(self, data).await
    }

    pub async fn delete(&self) -> FirestoreResult<()> {
        document::delete_doc(self).await
    }
}

impl Display for DocumentReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentReference({})", self.key.path().canonical_string())
    }
}

fn generate_auto_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(AUTO_ID_LENGTH)
        .collect()
}
