use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::firestore::api::{CollectionReference, DocumentReference, Firestore, Query};
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{FieldPath, GeoPoint};

use super::arguments::{self, WhereArguments};
use super::snapshot::{ScriptDocumentSnapshot, ScriptQuerySnapshot};
use super::value::ScriptValue;

/// The legacy `firebase.firestore` namespace.
///
/// Every entry point behaves exactly like its modular counterpart in
/// [`modular`](super::modular). The first call of each entry point logs a deprecation
/// warning through the instance logger naming the modular replacement, unless warnings
/// are silenced through [`FirestoreSettings`](crate::firestore::FirestoreSettings) or
/// [`FirebaseNamespace::silence_deprecation_warnings`].
#[derive(Clone)]
pub struct FirebaseNamespace {
    inner: Arc<NamespaceInner>,
}

struct NamespaceInner {
    firestore: Firestore,
    silenced: AtomicBool,
    warned: Mutex<HashSet<&'static str>>,
}

impl FirebaseNamespace {
    pub fn new(firestore: Firestore) -> Self {
        let silenced = firestore.settings().silence_namespaced_deprecation_warnings;
        Self {
            inner: Arc::new(NamespaceInner {
                firestore,
                silenced: AtomicBool::new(silenced),
                warned: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn silence_deprecation_warnings(&self, silenced: bool) {
        self.inner.silenced.store(silenced, Ordering::SeqCst);
    }

    pub fn deprecation_warnings_silenced(&self) -> bool {
        self.inner.silenced.load(Ordering::SeqCst)
    }

    /// `new firebase.firestore.FieldPath(...segments)`
    pub fn field_path(&self, segments: &[ScriptValue]) -> FirestoreResult<FieldPath> {
        self.deprecated("firebase.firestore.FieldPath", "FieldPath");
        arguments::field_path_from_arguments(segments)
    }

    /// `firebase.firestore.FieldPath.documentId()`
    pub fn field_path_document_id(&self) -> FieldPath {
        self.deprecated("firebase.firestore.FieldPath.documentId", "documentId");
        FieldPath::document_id()
    }

    /// `new firebase.firestore.GeoPoint(latitude, longitude)`
    pub fn geo_point(&self, coordinates: &[ScriptValue]) -> FirestoreResult<GeoPoint> {
        self.deprecated("firebase.firestore.GeoPoint", "GeoPoint");
        arguments::geo_point_from_arguments(coordinates)
    }

    /// `firebase.firestore()`
    pub fn firestore(&self) -> NamespacedFirestore {
        self.deprecated("firebase.firestore", "getFirestore");
        NamespacedFirestore {
            namespace: self.clone(),
        }
    }

    pub(crate) fn instance(&self) -> &Firestore {
        &self.inner.firestore
    }

    fn deprecated(&self, method: &'static str, replacement: &str) {
        if self.deprecation_warnings_silenced() {
            return;
        }
        let first_use = self
            .inner
            .warned
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(method);
        if first_use {
            self.inner.firestore.logger().warn(format!(
                "`{method}` belongs to the deprecated namespaced API and will be removed in a future release. Use the modular `{replacement}` instead."
            ));
        }
    }
}

impl Debug for FirebaseNamespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseNamespace")
            .field("firestore", &self.inner.firestore)
            .field("silenced", &self.deprecation_warnings_silenced())
            .finish()
    }
}

/// The object returned by `firebase.firestore()`.
#[derive(Clone, Debug)]
pub struct NamespacedFirestore {
    namespace: FirebaseNamespace,
}

impl NamespacedFirestore {
    pub fn collection(&self, path: &str) -> FirestoreResult<NamespacedCollection> {
        self.namespace
            .deprecated("firebase.firestore().collection", "collection");
        let reference = self.namespace.instance().collection(path)?;
        Ok(NamespacedCollection {
            namespace: self.namespace.clone(),
            reference,
        })
    }

    pub fn doc(&self, path: &str) -> FirestoreResult<NamespacedDocument> {
        self.namespace.deprecated("firebase.firestore().doc", "doc");
        let reference = self.namespace.instance().doc(path)?;
        Ok(NamespacedDocument {
            namespace: self.namespace.clone(),
            reference,
        })
    }
}

#[derive(Clone, Debug)]
pub struct NamespacedCollection {
    namespace: FirebaseNamespace,
    reference: CollectionReference,
}

impl NamespacedCollection {
    pub fn id(&self) -> &str {
        self.reference.id()
    }

    pub fn reference(&self) -> &CollectionReference {
        &self.reference
    }

    /// `collection.doc(id?)`; a random id is generated when `id` is `None`.
    pub fn doc(&self, id: Option<&str>) -> FirestoreResult<NamespacedDocument> {
        self.namespace
            .deprecated("firebase.firestore().collection().doc", "doc");
        Ok(NamespacedDocument {
            namespace: self.namespace.clone(),
            reference: self.reference.doc(id)?,
        })
    }

    /// `collection.where(fieldPath, opStr, value)`
    pub fn where_(
        &self,
        field: impl Into<ScriptValue>,
        operator: &str,
        value: impl Into<ScriptValue>,
    ) -> FirestoreResult<NamespacedQuery> {
        self.query().where_(field, operator, value)
    }

    pub fn limit(&self, limit: u32) -> FirestoreResult<NamespacedQuery> {
        self.query().limit(limit)
    }

    pub async fn get(&self) -> FirestoreResult<ScriptQuerySnapshot> {
        self.query().get().await
    }

    pub async fn add(&self, data: impl Into<ScriptValue>) -> FirestoreResult<NamespacedDocument> {
        self.namespace
            .deprecated("firebase.firestore().collection().add", "addDoc");
        let fields = arguments::document_data(&data.into())?;
        let reference = self.reference.add(fields).await?;
        Ok(NamespacedDocument {
            namespace: self.namespace.clone(),
            reference,
        })
    }

    fn query(&self) -> NamespacedQuery {
        NamespacedQuery {
            namespace: self.namespace.clone(),
            query: self.reference.query(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NamespacedQuery {
    namespace: FirebaseNamespace,
    query: Query,
}

impl NamespacedQuery {
    pub fn where_(
        &self,
        field: impl Into<ScriptValue>,
        operator: &str,
        value: impl Into<ScriptValue>,
    ) -> FirestoreResult<NamespacedQuery> {
        self.namespace
            .deprecated("firebase.firestore().collection().where", "where");
        let clause = WhereArguments::parse(field.into(), operator, &value.into())?;
        Ok(NamespacedQuery {
            namespace: self.namespace.clone(),
            query: clause.apply(&self.query)?,
        })
    }

    pub fn limit(&self, limit: u32) -> FirestoreResult<NamespacedQuery> {
        self.namespace
            .deprecated("firebase.firestore().collection().limit", "limit");
        Ok(NamespacedQuery {
            namespace: self.namespace.clone(),
            query: self.query.limit(limit)?,
        })
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub async fn get(&self) -> FirestoreResult<ScriptQuerySnapshot> {
        self.namespace
            .deprecated("firebase.firestore().collection().get", "getDocs");
        let snapshot = self.query.get().await?;
        let policy = &self.namespace.instance().settings().field_path_policy;
        Ok(ScriptQuerySnapshot::new(snapshot, policy))
    }
}

#[derive(Clone, Debug)]
pub struct NamespacedDocument {
    namespace: FirebaseNamespace,
    reference: DocumentReference,
}

impl NamespacedDocument {
    pub fn id(&self) -> &str {
        self.reference.id()
    }

    pub fn path(&self) -> String {
        self.reference.path().canonical_string()
    }

    pub fn reference(&self) -> &DocumentReference {
        &self.reference
    }

    pub async fn set(&self, data: impl Into<ScriptValue>) -> FirestoreResult<()> {
        self.namespace
            .deprecated("firebase.firestore().doc().set", "setDoc");
        let fields = arguments::document_data(&data.into())?;
        self.reference.set(fields).await
    }

    pub async fn get(&self) -> FirestoreResult<ScriptDocumentSnapshot> {
        self.namespace
            .deprecated("firebase.firestore().doc().get", "getDoc");
        let snapshot = self.reference.get().await?;
        let policy = self.namespace.instance().settings().field_path_policy.clone();
        Ok(ScriptDocumentSnapshot::new(snapshot, policy))
    }

    pub async fn delete(&self) -> FirestoreResult<()> {
        self.namespace
            .deprecated("firebase.firestore().doc().delete", "deleteDoc");
        self.reference.delete().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::FirestoreSettings;
    use crate::logger::LogLevel;

    fn capture(namespace: &FirebaseNamespace) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let logger = namespace.instance().logger();
        logger.set_log_level(LogLevel::Warn).unwrap();
        logger.set_log_handler(move |_, level, message| {
            if level == LogLevel::Warn {
                sink.lock().unwrap().push(message.to_string());
            }
        });
        seen
    }

    #[test]
    fn warns_once_per_entry_point() {
        let namespace = FirebaseNamespace::new(Firestore::in_memory("project"));
        let seen = capture(&namespace);

        namespace.field_path(&[ScriptValue::from("a")]).unwrap();
        namespace.field_path(&[ScriptValue::from("b")]).unwrap();
        namespace.field_path_document_id();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("`firebase.firestore.FieldPath`"));
        assert!(seen[0].contains("modular `FieldPath`"));
        assert!(seen[1].contains("modular `documentId`"));
    }

    #[test]
    fn silenced_by_settings_or_at_runtime() {
        let settings = FirestoreSettings::default().with_silenced_deprecation_warnings(true);
        let namespace =
            FirebaseNamespace::new(Firestore::in_memory_with_settings("project", settings));
        let seen = capture(&namespace);
        namespace
            .geo_point(&[ScriptValue::from(1), ScriptValue::from(2)])
            .unwrap();
        assert!(seen.lock().unwrap().is_empty());

        namespace.silence_deprecation_warnings(false);
        namespace
            .geo_point(&[ScriptValue::from(1), ScriptValue::from(2)])
            .unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn where_uses_the_instance_policy() {
        let namespace = FirebaseNamespace::new(Firestore::in_memory("project"));
        namespace.silence_deprecation_warnings(true);
        let collection = namespace.firestore().collection("v8").unwrap();

        let err = collection.where_(".foo", "<", 123).unwrap_err();
        assert!(err.message().contains("Invalid field path"));
        let err = collection.where_("foo/bar", "<", 123).unwrap_err();
        assert!(err.message().contains("Paths must not contain"));
        assert!(collection.where_("foo.bar", "<", 123).is_ok());
    }

    #[tokio::test]
    async fn add_then_query() {
        let namespace = FirebaseNamespace::new(Firestore::in_memory("project"));
        namespace.silence_deprecation_warnings(true);
        let collection = namespace.firestore().collection("places").unwrap();
        let point = namespace
            .geo_point(&[ScriptValue::from(10), ScriptValue::from(20)])
            .unwrap();

        let added = collection
            .add(ScriptValue::object([("at", ScriptValue::from(point))]))
            .await
            .unwrap();
        assert_eq!(added.id().len(), 20);

        let snapshot = collection.where_("at", "==", point).unwrap().get().await.unwrap();
        assert_eq!(snapshot.size(), 1);
        assert_eq!(snapshot.docs()[0].id(), added.id());
    }
}
