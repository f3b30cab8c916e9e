//! Firestore value types and the script bindings built on them.
//!
//! [`FieldPath`] and [`GeoPoint`] are validated on construction. The [`api`] module is the
//! typed document API over a [`remote::Datastore`], and [`script`] exposes both script
//! surfaces over it.

pub mod api;
mod constants;
pub mod error;
pub mod model;
pub mod remote;
pub mod script;
pub mod settings;
pub mod value;

pub use api::{CollectionReference, DocumentReference, DocumentSnapshot, Firestore, Query};
pub use error::{FirestoreError, FirestoreErrorCode, FirestoreResult};
pub use model::{FieldPath, FieldPathPolicy, GeoPoint};
pub use settings::FirestoreSettings;
pub use value::{FirestoreValue, ValueKind};
