use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityKind, FieldName, FieldValue, ValueKind};

/// A staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Librarian {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
}

impl Librarian {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            position: position.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarianField {
    Id,
    Name,
    Email,
    Phone,
    Position,
}

impl FieldName for LibrarianField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Position,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Position => "position",
        }
    }

    fn value_kind(self) -> ValueKind {
        match self {
            Self::Id => ValueKind::Integer,
            Self::Name | Self::Email | Self::Phone | Self::Position => ValueKind::Text,
        }
    }
}

impl Entity for Librarian {
    type Field = LibrarianField;

    const KIND: EntityKind = EntityKind::Librarians;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn field(&self, field: LibrarianField) -> FieldValue {
        match field {
            LibrarianField::Id => self.id.into(),
            LibrarianField::Name => self.name.as_str().into(),
            LibrarianField::Email => self.email.as_str().into(),
            LibrarianField::Phone => self.phone.as_str().into(),
            LibrarianField::Position => self.position.as_str().into(),
        }
    }

    fn label(&self) -> &str {
        &self.name
    }
}
