use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::firestore::error::{invalid_argument, FirestoreError, FirestoreResult};
use crate::firestore::model::{DocumentKey, FieldPath, IntoFieldPath, ResourcePath};
use crate::firestore::value::{FirestoreValue, ValueKind};

use super::document;
use super::snapshot::DocumentSnapshot;
use super::Firestore;

/// Comparison applied by a [`FieldFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
    ArrayContainsAny,
    In,
    NotIn,
}

impl FilterOperator {
    /// The operator string used by the script `where` APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::LessThan => "<",
            FilterOperator::LessThanOrEqual => "<=",
            FilterOperator::Equal => "==",
            FilterOperator::NotEqual => "!=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterThanOrEqual => ">=",
            FilterOperator::ArrayContains => "array-contains",
            FilterOperator::ArrayContainsAny => "array-contains-any",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not-in",
        }
    }

    fn expects_array(&self) -> bool {
        matches!(
            self,
            FilterOperator::ArrayContainsAny | FilterOperator::In | FilterOperator::NotIn
        )
    }
}

impl FromStr for FilterOperator {
    type Err = FirestoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(FilterOperator::LessThan),
            "<=" => Ok(FilterOperator::LessThanOrEqual),
            "==" => Ok(FilterOperator::Equal),
            "!=" => Ok(FilterOperator::NotEqual),
            ">" => Ok(FilterOperator::GreaterThan),
            ">=" => Ok(FilterOperator::GreaterThanOrEqual),
            "array-contains" => Ok(FilterOperator::ArrayContains),
            "array-contains-any" => Ok(FilterOperator::ArrayContainsAny),
            "in" => Ok(FilterOperator::In),
            "not-in" => Ok(FilterOperator::NotIn),
            other => Err(invalid_argument(format!(
                "firebase.firestore().collection().where(_, *) 'opStr' is invalid, got '{other}'."
            ))),
        }
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    field: FieldPath,
    operator: FilterOperator,
    value: FirestoreValue,
}

impl FieldFilter {
    pub fn new(
        field: FieldPath,
        operator: FilterOperator,
        value: FirestoreValue,
    ) -> FirestoreResult<Self> {
        if operator.expects_array() {
            match value.kind() {
                ValueKind::Array(values) if !values.values().is_empty() => {}
                _ => {
                    return Err(invalid_argument(format!(
                        "firebase.firestore().collection().where(_, '{operator}', *) 'value' must be a non-empty array."
                    )))
                }
            }
        }
        if field.is_document_id()
            && !matches!(value.kind(), ValueKind::String(_) | ValueKind::Array(_))
        {
            return Err(invalid_argument(
                "firebase.firestore().collection().where(FieldPath.documentId(), _, *) 'value' must be a document id string.",
            ));
        }
        Ok(Self {
            field,
            operator,
            value,
        })
    }

    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> &FirestoreValue {
        &self.value
    }
}

/// A Firestore query targeting a specific collection.
#[derive(Clone, Debug)]
pub struct Query {
    firestore: Firestore,
    definition: QueryDefinition,
}

impl Query {
    /// `collection_path` must already be a validated collection path.
    pub(crate) fn new(firestore: Firestore, collection_path: ResourcePath) -> Self {
        Self {
            firestore,
            definition: QueryDefinition {
                collection_path,
                filters: Vec::new(),
                limit: None,
            },
        }
    }

    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    pub fn collection_path(&self) -> &ResourcePath {
        &self.definition.collection_path
    }

    /// Returns a new query that additionally filters on `field`.
    ///
    /// String fields are parsed with the owning instance's [`FieldPathPolicy`], so
    /// `"address.city"` is accepted while `".city"` or `"address/city"` are rejected.
    ///
    /// [`FieldPathPolicy`]: crate::firestore::model::FieldPathPolicy
    pub fn where_field<F>(
        &self,
        field: F,
        operator: FilterOperator,
        value: FirestoreValue,
    ) -> FirestoreResult<Self>
    where
        F: IntoFieldPath,
    {
        let field = field.into_field_path_with(&self.firestore.settings().field_path_policy)?;
        let filter = FieldFilter::new(field, operator, value)?;
        let mut next = self.clone();
        next.definition.filters.push(filter);
        Ok(next)
    }

    pub fn limit(&self, limit: u32) -> FirestoreResult<Self> {
        if limit == 0 {
            return Err(invalid_argument(
                "firebase.firestore().collection().limit(*) 'limit' must be a positive integer value.",
            ));
        }
        let mut next = self.clone();
        next.definition.limit = Some(limit);
        Ok(next)
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.definition.filters
    }

    pub(crate) fn definition(&self) -> &QueryDefinition {
        &self.definition
    }

    pub async fn get(&self) -> FirestoreResult<QuerySnapshot> {
        document::get_docs(self).await
    }
}

/// What a datastore needs to execute a query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryDefinition {
    collection_path: ResourcePath,
    filters: Vec<FieldFilter>,
    limit: Option<u32>,
}

impl QueryDefinition {
    pub fn collection_path(&self) -> &ResourcePath {
        &self.collection_path
    }

    pub fn matches_collection(&self, key: &DocumentKey) -> bool {
        key.collection_path() == self.collection_path
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

/// A snapshot containing the results of executing a query.
#[derive(Clone, Debug)]
pub struct QuerySnapshot {
    query: Query,
    documents: Vec<DocumentSnapshot>,
}

impl QuerySnapshot {
    pub fn new(query: Query, documents: Vec<DocumentSnapshot>) -> Self {
        Self { query, documents }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn into_documents(self) -> Vec<DocumentSnapshot> {
        self.documents
    }
}

impl IntoIterator for QuerySnapshot {
    type Item = DocumentSnapshot;
    type IntoIter = std::vec::IntoIter<DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Query {
        Firestore::in_memory("project").collection("cities").unwrap().query()
    }

    #[test]
    fn parses_operator_strings() {
        for op in [
            "<",
            "<=",
            "==",
            "!=",
            ">",
            ">=",
            "array-contains",
            "array-contains-any",
            "in",
            "not-in",
        ] {
            assert_eq!(op.parse::<FilterOperator>().unwrap().as_str(), op);
        }
        let err = "=~".parse::<FilterOperator>().unwrap_err();
        assert!(err.message().contains("'opStr' is invalid"));
    }

    #[test]
    fn where_field_validates_string_paths() {
        let query = cities();
        let value = FirestoreValue::from_integer(123);

        let err = query
            .where_field(".foo", FilterOperator::LessThan, value.clone())
            .unwrap_err();
        assert!(err.message().contains("Invalid field path"));

        let err = query
            .where_field("foo/bar", FilterOperator::LessThan, value.clone())
            .unwrap_err();
        assert!(err.message().contains("Paths must not contain"));

        let filtered = query
            .where_field("foo.bar", FilterOperator::LessThan, value)
            .unwrap();
        assert_eq!(filtered.filters().len(), 1);
        assert_eq!(filtered.filters()[0].field().canonical_string(), "foo.bar");
        assert!(query.filters().is_empty());
    }

    #[test]
    fn array_operators_require_non_empty_arrays() {
        let err = cities()
            .where_field("tags", FilterOperator::In, FirestoreValue::from_string("a"))
            .unwrap_err();
        assert!(err.message().contains("non-empty array"));
        assert!(cities()
            .where_field(
                "tags",
                FilterOperator::In,
                FirestoreValue::from_array(vec![FirestoreValue::from_string("a")])
            )
            .is_ok());
    }

    #[test]
    fn document_id_filters_need_strings() {
        let err = cities()
            .where_field(
                FieldPath::document_id(),
                FilterOperator::Equal,
                FirestoreValue::from_integer(1),
            )
            .unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[test]
    fn limit_must_be_positive() {
        assert!(cities().limit(0).is_err());
        assert_eq!(cities().limit(3).unwrap().definition().limit(), Some(3));
    }
}
