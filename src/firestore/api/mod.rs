mod database;
mod document;
mod query;
mod reference;
mod snapshot;

pub use database::Firestore;
pub use document::{add_doc, delete_doc, get_doc, get_docs, set_doc};
pub use query::{FieldFilter, FilterOperator, Query, QueryDefinition, QuerySnapshot};
pub use reference::{CollectionReference, DocumentReference};
pub use snapshot::{DocumentSnapshot, SnapshotMetadata};
