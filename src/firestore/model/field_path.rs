use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Deserialize;

use crate::firestore::constants::{DEFAULT_RESERVED_FIELD_PATH_CHARACTERS, DOCUMENT_ID_FIELD};
use crate::firestore::error::{invalid_argument, FirestoreError, FirestoreResult};

/// A path to a (possibly nested) document field, stored as its ordered segments.
///
/// A `FieldPath` always holds at least one segment and none of its segments are empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Builds a path from explicit segments.
    ///
    /// # Errors
    /// Returns `firestore/invalid-argument` when `segments` is empty or when any segment is
    /// an empty string; the message names the offending index.
    pub fn new<S, I>(segments: I) -> FirestoreResult<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(no_segments());
        }
        if let Some(index) = segments.iter().position(String::is_empty) {
            return Err(invalid_segment(index));
        }
        Ok(Self { segments })
    }

    /// Parses a dotted path (`"address.city"`) using the default reserved character set.
    pub fn from_dot_separated(path: &str) -> FirestoreResult<Self> {
        Self::from_dot_separated_with(path, &FieldPathPolicy::default())
    }

    /// Parses a dotted path, rejecting the characters reserved by `policy`.
    pub fn from_dot_separated_with(path: &str, policy: &FieldPathPolicy) -> FirestoreResult<Self> {
        policy.check(path).map_err(FirestoreError::from)?;
        FieldPath::new(path.split('.'))
    }

    /// The path addressing a document's own identifier (`__name__`).
    pub fn document_id() -> Self {
        Self {
            segments: vec![DOCUMENT_ID_FIELD.to_string()],
        }
    }

    pub fn is_document_id(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == DOCUMENT_ID_FIELD
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first_segment(&self) -> &str {
        &self.segments[0]
    }

    pub fn last_segment(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Returns a path with `child` appended to this one.
    pub fn child(&self, child: impl Into<String>) -> FirestoreResult<Self> {
        let mut segments = self.segments.clone();
        segments.push(child.into());
        FieldPath::new(segments)
    }

    /// The segments joined with `.`.
    pub fn canonical_string(&self) -> String {
        self.segments.join(".")
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.segments.clone()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

impl FromStr for FieldPath {
    type Err = FirestoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::from_dot_separated(s)
    }
}

pub(crate) fn no_segments() -> FirestoreError {
    invalid_argument("firebase.firestore.FieldPath cannot construct FieldPath with no segments.")
}

pub(crate) fn invalid_segment(index: usize) -> FirestoreError {
    invalid_argument(format!(
        "firebase.firestore.FieldPath invalid segment at index {index}."
    ))
}

/// Characters a dotted field path string may not contain.
///
/// The store's full path grammar is larger than what clients check up front, so the set
/// is configurable; it defaults to `~ * / [ ]`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldPathPolicy {
    reserved_characters: Vec<char>,
}

impl Default for FieldPathPolicy {
    fn default() -> Self {
        Self {
            reserved_characters: DEFAULT_RESERVED_FIELD_PATH_CHARACTERS.to_vec(),
        }
    }
}

impl FieldPathPolicy {
    pub fn new<I>(reserved_characters: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        let mut policy = Self {
            reserved_characters: Vec::new(),
        };
        for character in reserved_characters {
            policy = policy.with_reserved_character(character);
        }
        policy
    }

    pub fn with_reserved_character(mut self, character: char) -> Self {
        if !self.reserved_characters.contains(&character) {
            self.reserved_characters.push(character);
        }
        self
    }

    pub fn reserved_characters(&self) -> &[char] {
        &self.reserved_characters
    }

    /// Validates a dotted path string without building a [`FieldPath`].
    pub fn check(&self, path: &str) -> Result<(), FieldPathViolation> {
        Self::check_shape(path)?;
        if let Some(character) = path.chars().find(|c| self.reserved_characters.contains(c)) {
            return Err(FieldPathViolation::ReservedCharacter {
                path: path.to_string(),
                character,
                reserved: self.reserved_characters.clone(),
            });
        }
        Ok(())
    }

    /// The checks that hold under every policy: the path is not empty, does not start or
    /// end with `.`, and does not contain `..`.
    pub fn check_shape(path: &str) -> Result<(), FieldPathViolation> {
        if path.is_empty() || path.starts_with('.') || path.ends_with('.') || path.contains("..") {
            return Err(FieldPathViolation::Malformed {
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

/// Why a dotted field path string was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldPathViolation {
    /// Empty, starts or ends with `.`, or contains `..`.
    Malformed { path: String },
    ReservedCharacter {
        path: String,
        character: char,
        reserved: Vec<char>,
    },
}

impl Display for FieldPathViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldPathViolation::Malformed { path } => write!(
                f,
                "Invalid field path ({path}). Paths must not be empty, begin with '.', end with '.', or contain '..'"
            ),
            FieldPathViolation::ReservedCharacter { path, reserved, .. } => write!(
                f,
                "Invalid field path ({path}). Paths must not contain {}",
                describe_characters(reserved)
            ),
        }
    }
}

impl From<FieldPathViolation> for FirestoreError {
    fn from(violation: FieldPathViolation) -> Self {
        invalid_argument(violation.to_string())
    }
}

fn describe_characters(characters: &[char]) -> String {
    let quoted: Vec<String> = characters.iter().map(|c| format!("'{c}'")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [single] => single.clone(),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    }
}

/// Trait that converts common user inputs into a validated [`FieldPath`].
///
/// Strings are parsed as dotted paths against the supplied [`FieldPathPolicy`].
pub trait IntoFieldPath {
    fn into_field_path_with(self, policy: &FieldPathPolicy) -> FirestoreResult<FieldPath>;

    fn into_field_path(self) -> FirestoreResult<FieldPath>
    where
        Self: Sized,
    {
        self.into_field_path_with(&FieldPathPolicy::default())
    }
}

impl IntoFieldPath for FieldPath {
    fn into_field_path_with(self, _policy: &FieldPathPolicy) -> FirestoreResult<FieldPath> {
        Ok(self)
    }
}

impl<'a> IntoFieldPath for &'a FieldPath {
    fn into_field_path_with(self, _policy: &FieldPathPolicy) -> FirestoreResult<FieldPath> {
        Ok(self.clone())
    }
}

impl IntoFieldPath for String {
    fn into_field_path_with(self, policy: &FieldPathPolicy) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated_with(&self, policy)
    }
}

impl<'a> IntoFieldPath for &'a str {
    fn into_field_path_with(self, policy: &FieldPathPolicy) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated_with(self, policy)
    }
}
