//! The modular surface: free functions that take the instance or reference they act on.

use crate::firestore::api::{self, CollectionReference, DocumentReference, Firestore, Query};
use crate::firestore::error::{invalid_argument, FirestoreResult};
use crate::firestore::model::{FieldPath, GeoPoint};

use super::arguments::{self, WhereArguments};
use super::namespaced::FirebaseNamespace;
use super::snapshot::{ScriptDocumentSnapshot, ScriptQuerySnapshot};
use super::value::ScriptValue;

/// `new FieldPath(...segments)`
pub fn field_path(segments: &[ScriptValue]) -> FirestoreResult<FieldPath> {
    arguments::field_path_from_arguments(segments)
}

/// `documentId()`
pub fn document_id() -> FieldPath {
    FieldPath::document_id()
}

/// `new GeoPoint(latitude, longitude)`
pub fn geo_point(coordinates: &[ScriptValue]) -> FirestoreResult<GeoPoint> {
    arguments::geo_point_from_arguments(coordinates)
}

/// `getFirestore()`: the instance behind `namespace`, shared with the namespaced surface.
pub fn get_firestore(namespace: &FirebaseNamespace) -> Firestore {
    namespace.instance().clone()
}

pub fn collection(db: &Firestore, path: &str) -> FirestoreResult<CollectionReference> {
    db.collection(path)
}

pub fn doc(db: &Firestore, path: &str) -> FirestoreResult<DocumentReference> {
    db.doc(path)
}

/// A clause passed to [`query`].
#[derive(Clone, Debug, PartialEq)]
pub struct QueryConstraint {
    kind: ConstraintKind,
}

#[derive(Clone, Debug, PartialEq)]
enum ConstraintKind {
    Where(WhereArguments),
    Limit(u32),
}

/// `where(fieldPath, opStr, value)`
///
/// The field shape, operator and value are checked immediately. Reserved characters are
/// checked by [`query`] against the policy of the collection's instance, exactly as the
/// namespaced `where` does.
pub fn where_(
    field: impl Into<ScriptValue>,
    operator: &str,
    value: impl Into<ScriptValue>,
) -> FirestoreResult<QueryConstraint> {
    let clause = WhereArguments::parse(field.into(), operator, &value.into())?;
    Ok(QueryConstraint {
        kind: ConstraintKind::Where(clause),
    })
}

pub fn limit(limit: u32) -> FirestoreResult<QueryConstraint> {
    if limit == 0 {
        return Err(invalid_argument(
            "firebase.firestore().collection().limit(*) 'limit' must be a positive integer value.",
        ));
    }
    Ok(QueryConstraint {
        kind: ConstraintKind::Limit(limit),
    })
}

/// `query(collection, ...constraints)`
pub fn query<I>(collection: &CollectionReference, constraints: I) -> FirestoreResult<Query>
where
    I: IntoIterator<Item = QueryConstraint>,
{
    let mut query = collection.query();
    for constraint in constraints {
        query = match &constraint.kind {
            ConstraintKind::Where(clause) => clause.apply(&query)?,
            ConstraintKind::Limit(limit) => query.limit(*limit)?,
        };
    }
    Ok(query)
}

pub async fn set_doc(
    reference: &DocumentReference,
    data: impl Into<ScriptValue>,
) -> FirestoreResult<()> {
    let fields = arguments::document_data(&data.into())?;
    api::set_doc(reference, fields).await
}

pub async fn get_doc(reference: &DocumentReference) -> FirestoreResult<ScriptDocumentSnapshot> {
    let snapshot = api::get_doc(reference).await?;
    let policy = reference.firestore().settings().field_path_policy.clone();
    Ok(ScriptDocumentSnapshot::new(snapshot, policy))
}

pub async fn delete_doc(reference: &DocumentReference) -> FirestoreResult<()> {
    api::delete_doc(reference).await
}

pub async fn add_doc(
    collection: &CollectionReference,
    data: impl Into<ScriptValue>,
) -> FirestoreResult<DocumentReference> {
    let fields = arguments::document_data(&data.into())?;
    api::add_doc(collection, fields).await
}

pub async fn get_docs(query: &Query) -> FirestoreResult<ScriptQuerySnapshot> {
    let snapshot = api::get_docs(query).await?;
    let policy = &query.firestore().settings().field_path_policy;
    Ok(ScriptQuerySnapshot::new(snapshot, policy))
}
