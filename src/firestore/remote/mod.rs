pub mod datastore;
pub mod serializer;

pub use datastore::{Datastore, InMemoryDatastore};
pub use serializer::JsonProtoSerializer;
