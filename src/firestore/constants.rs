pub(crate) const DEFAULT_DATABASE_ID: &str = "(default)";

/// Reserved field name that addresses a document's own identifier.
pub(crate) const DOCUMENT_ID_FIELD: &str = "__name__";

pub(crate) const DEFAULT_RESERVED_FIELD_PATH_CHARACTERS: [char; 5] = ['~', '*', '/', '[', ']'];

pub(crate) const AUTO_ID_LENGTH: usize = 20;

pub(crate) const LOGGER_NAME: &str = "@firebase/firestore";
