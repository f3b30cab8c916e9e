use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::firestore::constants::LOGGER_NAME;
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{DatabaseId, FieldPath, ResourcePath};
use crate::firestore::remote::datastore::{Datastore, InMemoryDatastore};
use crate::firestore::settings::FirestoreSettings;
use crate::logger::Logger;

use super::reference::{CollectionReference, DocumentReference};

/// Handle to one Firestore database and the datastore that backs it.
///
/// Cloning is cheap; every clone shares the same settings, logger and datastore.
#[derive(Clone)]
pub struct Firestore {
    inner: Arc<FirestoreInner>,
}

struct FirestoreInner {
    database_id: DatabaseId,
    settings: FirestoreSettings,
    datastore: Arc<dyn Datastore>,
    logger: Logger,
}

impl Firestore {
    pub fn new(
        database_id: DatabaseId,
        settings: FirestoreSettings,
        datastore: Arc<dyn Datastore>,
    ) -> Self {
        let logger = Logger::new(LOGGER_NAME);
        if let Some(level) = settings.log_level {
            let _ = logger.set_log_level(level);
        }
        let inner = FirestoreInner {
            database_id,
            settings,
            datastore,
            logger,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// A Firestore instance for `project_id` whose documents live in process memory.
    pub fn in_memory(project_id: impl Into<String>) -> Self {
        Self::in_memory_with_settings(project_id, FirestoreSettings::default())
    }

    pub fn in_memory_with_settings(
        project_id: impl Into<String>,
        settings: FirestoreSettings,
    ) -> Self {
        let database_id = DatabaseId::default(project_id);
        let datastore = InMemoryDatastore::new(database_id.clone());
        Self::new(database_id, settings, Arc::new(datastore))
    }

    /// The fully qualified database identifier (project + database name).
    pub fn database_id(&self) -> &DatabaseId {
        &self.inner.database_id
    }

    pub fn project_id(&self) -> &str {
        self.inner.database_id.project_id()
    }

    pub fn settings(&self) -> &FirestoreSettings {
        &self.inner.settings
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    pub(crate) fn datastore(&self) -> &Arc<dyn Datastore> {
        &self.inner.datastore
    }

    /// Creates a `CollectionReference` pointing at `path`.
    ///
    /// The path is interpreted relative to the Firestore root using forward
    /// slashes to separate segments (e.g. `"users/alovelace/repos"`).
    pub fn collection(&self, path: &str) -> FirestoreResult<CollectionReference> {
        let resource = ResourcePath::from_string(path)?;
        CollectionReference::new(self.clone(), resource)
    }

    /// Creates a `DocumentReference` pointing at `path`.
    ///
    /// The path must contain an even number of segments (collection/doc pairs).
    pub fn doc(&self, path: &str) -> FirestoreResult<DocumentReference> {
        let resource = ResourcePath::from_string(path)?;
        DocumentReference::new(self.clone(), resource)
    }

    /// Parses a dotted field path using this instance's reserved character policy.
    pub fn field_path(&self, dotted: &str) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated_with(dotted, &self.inner.settings.field_path_policy)
    }
}

impl Debug for Firestore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Firestore")
            .field("database_id", &self.inner.database_id)
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}
