use serde::Deserialize;

use crate::firestore::error::{invalid_argument, FirestoreResult};
use crate::firestore::model::FieldPathPolicy;
use crate::logger::LogLevel;

/// Per-instance configuration for [`Firestore`](crate::firestore::Firestore) and the script
/// surfaces built on top of it.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use firestore_script_bridge::firestore::FirestoreSettings;
///
/// let settings = FirestoreSettings::from_json(r##"{
///     "silence_namespaced_deprecation_warnings": true,
///     "field_path_policy": { "reserved_characters": ["~", "*", "/", "[", "]", "#"] }
/// }"##).unwrap();
/// assert!(settings.silence_namespaced_deprecation_warnings);
/// assert_eq!(settings.field_path_policy.reserved_characters().len(), 6);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FirestoreSettings {
    /// Characters rejected when a dotted string is used as a field path.
    pub field_path_policy: FieldPathPolicy,
    /// Suppresses the warning emitted the first time each namespaced entry point is used.
    pub silence_namespaced_deprecation_warnings: bool,
    /// Level applied to the Firestore logger when the instance is created.
    pub log_level: Option<LogLevel>,
}

impl FirestoreSettings {
    pub fn from_json(raw: &str) -> FirestoreResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| invalid_argument(format!("Invalid Firestore settings: {err}")))
    }

    pub fn with_field_path_policy(mut self, policy: FieldPathPolicy) -> Self {
        self.field_path_policy = policy;
        self
    }

    pub fn with_silenced_deprecation_warnings(mut self, silenced: bool) -> Self {
        self.silence_namespaced_deprecation_warnings = silenced;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }
}
