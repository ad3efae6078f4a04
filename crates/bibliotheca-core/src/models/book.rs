use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityKind, FieldName, FieldValue, ValueKind};
use crate::error::BibliothecaError;

/// Circulation state of a book.
///
/// `Reserved` is declared for completeness of the document format; no
/// library operation moves a book into or out of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Available,
    Borrowed,
    Reserved,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Borrowed => write!(f, "borrowed"),
            Self::Reserved => write!(f, "reserved"),
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = BibliothecaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "borrowed" => Ok(Self::Borrowed),
            "reserved" => Ok(Self::Reserved),
            _ => Err(BibliothecaError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: EntityId,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub isbn: String,
    pub status: BookStatus,
    pub borrower_id: Option<EntityId>,
}

impl Book {
    /// A fresh, available book. The id is assigned on insertion.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            author: author.into(),
            year,
            isbn: isbn.into(),
            status: BookStatus::Available,
            borrower_id: None,
        }
    }

    /// `status == Borrowed` exactly when a borrower is recorded.
    pub fn is_consistent(&self) -> bool {
        (self.status == BookStatus::Borrowed) == self.borrower_id.is_some()
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Id,
    Title,
    Author,
    Year,
    Isbn,
    Status,
    BorrowerId,
}

impl FieldName for BookField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Title,
        Self::Author,
        Self::Year,
        Self::Isbn,
        Self::Status,
        Self::BorrowerId,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
            Self::Isbn => "isbn",
            Self::Status => "status",
            Self::BorrowerId => "borrower_id",
        }
    }

    fn value_kind(self) -> ValueKind {
        match self {
            Self::Id | Self::Year => ValueKind::Integer,
            Self::Title | Self::Author | Self::Isbn | Self::Status => ValueKind::Text,
            Self::BorrowerId => ValueKind::OptionalInteger,
        }
    }
}

impl Entity for Book {
    type Field = BookField;

    const KIND: EntityKind = EntityKind::Books;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn field(&self, field: BookField) -> FieldValue {
        match field {
            BookField::Id => self.id.into(),
            BookField::Title => self.title.as_str().into(),
            BookField::Author => self.author.as_str().into(),
            BookField::Year => self.year.into(),
            BookField::Isbn => self.isbn.as_str().into(),
            BookField::Status => self.status.into(),
            BookField::BorrowerId => self.borrower_id.into(),
        }
    }

    fn label(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_new_is_available() {
        let book = Book::new("War and Peace", "Tolstoy", 1869, "ISBN1");
        assert_eq!(book.id, 0);
        assert_eq!(book.status, BookStatus::Available);
        assert!(book.borrower_id.is_none());
        assert!(book.is_consistent());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(BookStatus::Borrowed.to_string(), "borrowed");
        assert_eq!("reserved".parse::<BookStatus>().unwrap(), BookStatus::Reserved);
        assert!("lost".parse::<BookStatus>().is_err());
    }

    #[test]
    fn test_book_json_uses_status_label() {
        let mut book = Book::new("Dune", "Herbert", 1965, "ISBN2");
        book.status = BookStatus::Borrowed;
        book.borrower_id = Some(3);

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["status"], "borrowed");
        assert_eq!(json["borrower_id"], 3);

        let restored: Book = serde_json::from_value(json).unwrap();
        assert_eq!(restored, book);
    }

    #[test]
    fn test_inconsistent_book_detected() {
        let mut book = Book::new("Dune", "Herbert", 1965, "ISBN2");
        book.status = BookStatus::Borrowed;
        assert!(!book.is_consistent());
    }

    #[test]
    fn test_book_record_field_order() {
        let book = Book::new("Dune", "Herbert", 1965, "ISBN2");
        let record = book.record();
        let names: Vec<&str> = record.names().collect();
        assert_eq!(
            names,
            ["id", "title", "author", "year", "isbn", "status", "borrower_id"]
        );
        assert_eq!(book.field(BookField::Status), FieldValue::from("available"));
    }
}
