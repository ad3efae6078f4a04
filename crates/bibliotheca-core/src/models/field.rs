use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{BibliothecaError, Result};

use super::BookStatus;

/// Identifier assigned by an owning repository. Starts at 1.
pub type EntityId = u64;

/// The three entity collections a library holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Books,
    Librarians,
    Readers,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Books, Self::Librarians, Self::Readers];

    /// Singular, capitalized name used in notifications ("Book added: ...").
    pub fn singular(self) -> &'static str {
        match self {
            Self::Books => "Book",
            Self::Librarians => "Librarian",
            Self::Readers => "Reader",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Books => write!(f, "books"),
            Self::Librarians => write!(f, "librarians"),
            Self::Readers => write!(f, "readers"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = BibliothecaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "books" | "book" => Ok(Self::Books),
            "librarians" | "librarian" => Ok(Self::Librarians),
            "readers" | "reader" => Ok(Self::Readers),
            _ => Err(BibliothecaError::UnknownEntityKind(s.to_string())),
        }
    }
}

/// Shape of the values a field holds, used to parse filter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    OptionalInteger,
    Text,
    IdList,
}

/// A closed set of filterable attributes for one entity kind.
pub trait FieldName: Copy + Eq + fmt::Debug + 'static {
    /// Every field, in record order.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn value_kind(self) -> ValueKind;

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// A record stored in a repository.
///
/// The repository owns the canonical copy; callers mutate a clone and hand
/// it back through an explicit update.
pub trait Entity: Clone + fmt::Debug {
    type Field: FieldName;

    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Value of a single attribute, used for equality filtering and export.
    fn field(&self, field: Self::Field) -> FieldValue;

    /// Human-readable identifying field (title or name).
    fn label(&self) -> &str;

    fn record(&self) -> Record {
        Record::new(
            Self::Field::ALL
                .iter()
                .map(|f| (f.name().to_string(), self.field(*f)))
                .collect(),
        )
    }
}

/// A dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
    IdList(Vec<EntityId>),
}

impl FieldValue {
    /// Parse user-supplied text as a value of the given kind.
    ///
    /// Returns `None` when the text cannot be a value of that kind.
    pub fn parse(kind: ValueKind, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match kind {
            ValueKind::Text => Some(Self::Text(raw.to_string())),
            ValueKind::Integer => raw.parse::<i64>().ok().map(Self::Integer),
            ValueKind::OptionalInteger if raw.is_empty() || raw == "null" => Some(Self::Null),
            ValueKind::OptionalInteger => raw.parse::<i64>().ok().map(Self::Integer),
            ValueKind::IdList => {
                let inner = raw.trim_start_matches('[').trim_end_matches(']');
                if inner.trim().is_empty() {
                    return Some(Self::IdList(Vec::new()));
                }
                inner
                    .split(',')
                    .map(|part| part.trim().parse::<EntityId>().ok())
                    .collect::<Option<Vec<_>>>()
                    .map(Self::IdList)
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Text(s) => serde_json::Value::from(s.as_str()),
            Self::IdList(ids) => serde_json::Value::from(ids.clone()),
        }
    }
}

/// Flat text rendering, as written into tabular exports.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::IdList(ids) => {
                let items: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                write!(f, "[{}]", items.join(","))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<EntityId> for FieldValue {
    fn from(value: EntityId) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Integer)
    }
}

impl From<Option<EntityId>> for FieldValue {
    fn from(value: Option<EntityId>) -> Self {
        value.map_or(Self::Null, Self::from)
    }
}

impl From<Vec<EntityId>> for FieldValue {
    fn from(value: Vec<EntityId>) -> Self {
        Self::IdList(value)
    }
}

impl From<BookStatus> for FieldValue {
    fn from(value: BookStatus) -> Self {
        Self::Text(value.to_string())
    }
}

/// Ordered field-name/value pairs describing one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(fields: Vec<(String, FieldValue)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Borrowing view that serializes as a plain object, in field order.
    pub fn as_object(&self) -> ObjectView<'_> {
        ObjectView(self)
    }
}

pub struct ObjectView<'a>(&'a Record);

impl Serialize for ObjectView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.fields.len()))?;
        for (name, value) in &self.0.fields {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}
