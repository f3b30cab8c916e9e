//! Bindings exposed to script code.
//!
//! Two surfaces sit over one shared core: the legacy [`namespaced`] API
//! (`firebase.firestore.FieldPath`, `firebase.firestore().collection(...)`) and the
//! [`modular`] free functions (`field_path`, `collection(db, ...)`). Arguments arrive as
//! loosely typed [`ScriptValue`]s and are checked in [`arguments`].

pub mod arguments;
pub mod modular;
pub mod namespaced;
mod snapshot;
mod value;

pub use arguments::ScriptEquality;
pub use modular::QueryConstraint;
pub use namespaced::{
    FirebaseNamespace, NamespacedCollection, NamespacedDocument, NamespacedFirestore,
    NamespacedQuery,
};
pub use snapshot::{ScriptDocumentSnapshot, ScriptQuerySnapshot};
pub use value::ScriptValue;
