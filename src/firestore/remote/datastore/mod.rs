use async_trait::async_trait;

use crate::firestore::api::{DocumentSnapshot, QueryDefinition};
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::DocumentKey;
use crate::firestore::value::MapValue;

pub mod in_memory;

/// The document store the bridge persists to.
///
/// Operations issued one after another on the same key complete in issue order.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Datastore: Send + Sync + 'static {
    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<DocumentSnapshot>;
    async fn set_document(&self, key: &DocumentKey, data: MapValue) -> FirestoreResult<()>;
    async fn delete_document(&self, key: &DocumentKey) -> FirestoreResult<()>;
    async fn run_query(&self, query: &QueryDefinition) -> FirestoreResult<Vec<DocumentSnapshot>>;
}

pub use in_memory::InMemoryDatastore;
