mod database_id;
mod document_key;
mod field_path;
mod geo_point;
mod resource_path;

pub use database_id::DatabaseId;
pub use document_key::DocumentKey;
pub use field_path::{FieldPath, FieldPathPolicy, FieldPathViolation, IntoFieldPath};
pub use geo_point::GeoPoint;
pub use resource_path::ResourcePath;

pub(crate) use field_path::{invalid_segment, no_segments};
pub(crate) use geo_point::not_a_number;
