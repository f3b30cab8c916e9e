use std::collections::BTreeMap;

use crate::firestore::error::FirestoreResult;
use crate::firestore::value::{FirestoreValue, MapValue};

use super::query::{Query, QuerySnapshot};
use super::reference::{CollectionReference, DocumentReference};
use super::snapshot::DocumentSnapshot;

/// Fetches the document behind `reference`.
///
/// Missing documents are not an error: the snapshot reports `exists() == false`.
pub async fn get_doc(reference: &DocumentReference) -> FirestoreResult<DocumentSnapshot> {
    let datastore = reference.firestore().datastore();
    datastore.get_document(reference.key()).await
}

/// Replaces the document behind `reference` with `data`.
///
/// # Examples
/// ```
/// # use std::collections::BTreeMap;
/// # use firestore_script_bridge::firestore::{
/// #     Firestore, FirestoreResult, FirestoreValue, GeoPoint,
/// # };
/// # use firestore_script_bridge::firestore::api::{get_doc, set_doc};
/// # async fn run() -> FirestoreResult<()> {
/// let firestore = Firestore::in_memory("demo-project");
/// let reference = firestore.doc("firestore/geopoint")?;
/// let point = GeoPoint::new(20.0, 30.0)?;
///
/// set_doc(&reference, BTreeMap::from([("geopoint".into(), FirestoreValue::from(point))])).await?;
///
/// let snapshot = get_doc(&reference).await?;
/// let stored = snapshot.get("geopoint")?.and_then(|value| value.as_geo_point());
/// assert_eq!(stored, Some(point));
/// # Ok(()) }
/// ```
pub async fn set_doc(
    reference: &DocumentReference,
    data: BTreeMap<String, FirestoreValue>,
) -> FirestoreResult<()> {
    let datastore = reference.firestore().datastore();
    datastore
        .set_document(reference.key(), MapValue::new(data))
        .await
}

/// Deletes the document behind `reference`; succeeds when it does not exist.
pub async fn delete_doc(reference: &DocumentReference) -> FirestoreResult<()> {
    let datastore = reference.firestore().datastore();
    datastore.delete_document(reference.key()).await
}

/// Adds a new document with a generated id to `collection`.
pub async fn add_doc(
    collection: &CollectionReference,
    data: BTreeMap<String, FirestoreValue>,
) -> FirestoreResult<DocumentReference> {
    let reference = collection.doc(None)?;
    set_doc(&reference, data).await?;
    Ok(reference)
}

/// Executes `query` against the owning instance's datastore.
pub async fn get_docs(query: &Query) -> FirestoreResult<QuerySnapshot> {
    let datastore = query.firestore().datastore();
    let documents = datastore.run_query(query.definition()).await?;
    Ok(QuerySnapshot::new(query.clone(), documents))
}
