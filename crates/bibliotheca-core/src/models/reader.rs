use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityKind, FieldName, FieldValue, ValueKind};

/// A library patron.
///
/// `books_borrowed` mirrors the `borrower_id` of every listed book. It is
/// maintained by the facade's borrow and return operations only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub books_borrowed: Vec<EntityId>,
}

impl Reader {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            books_borrowed: Vec::new(),
        }
    }

    pub fn has_borrowed(&self, book_id: EntityId) -> bool {
        self.books_borrowed.contains(&book_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderField {
    Id,
    Name,
    Email,
    Phone,
    BooksBorrowed,
}

impl FieldName for ReaderField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::BooksBorrowed,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::BooksBorrowed => "books_borrowed",
        }
    }

    fn value_kind(self) -> ValueKind {
        match self {
            Self::Id => ValueKind::Integer,
            Self::Name | Self::Email | Self::Phone => ValueKind::Text,
            Self::BooksBorrowed => ValueKind::IdList,
        }
    }
}

impl Entity for Reader {
    type Field = ReaderField;

    const KIND: EntityKind = EntityKind::Readers;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn field(&self, field: ReaderField) -> FieldValue {
        match field {
            ReaderField::Id => self.id.into(),
            ReaderField::Name => self.name.as_str().into(),
            ReaderField::Email => self.email.as_str().into(),
            ReaderField::Phone => self.phone.as_str().into(),
            ReaderField::BooksBorrowed => self.books_borrowed.clone().into(),
        }
    }

    fn label(&self) -> &str {
        &self.name
    }
}
