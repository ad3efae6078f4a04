use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BibliothecaError, Result};
use crate::models::{Book, Entity, EntityId, Librarian, Reader};

/// Whole-library document: every collection, each record with its id.
///
/// Id counters are not stored; they are recomputed from the ids on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub librarians: Vec<Librarian>,
    #[serde(default)]
    pub readers: Vec<Reader>,
}

impl LibrarySnapshot {
    /// Check the book/reader cross references.
    ///
    /// A book is borrowed exactly when it names a borrower. When both ends
    /// of a loan are present they must agree. References to deleted records
    /// are tolerated. Every id must leave room for a following insertion.
    pub fn validate(&self) -> Result<()> {
        check_ids(&self.books)?;
        check_ids(&self.librarians)?;
        check_ids(&self.readers)?;

        for book in &self.books {
            if !book.is_consistent() {
                return Err(BibliothecaError::Integrity(format!(
                    "book {} has status '{}' and borrower {:?}",
                    book.id, book.status, book.borrower_id
                )));
            }
            let Some(reader_id) = book.borrower_id else {
                continue;
            };
            if let Some(reader) = self.readers.iter().find(|r| r.id == reader_id)
                && !reader.has_borrowed(book.id)
            {
                return Err(BibliothecaError::Integrity(format!(
                    "book {} is borrowed by reader {reader_id}, who does not list it",
                    book.id
                )));
            }
        }

        for reader in &self.readers {
            for book_id in &reader.books_borrowed {
                if let Some(book) = self.books.iter().find(|b| b.id == *book_id)
                    && book.borrower_id != Some(reader.id)
                {
                    return Err(BibliothecaError::Integrity(format!(
                        "reader {} lists book {book_id}, which is not borrowed by them",
                        reader.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Overlay `books` by id, the way an import applies them.
    pub fn merge_books(&mut self, books: &[Book]) {
        for book in books {
            match self.books.iter_mut().find(|b| b.id == book.id) {
                Some(slot) => *slot = book.clone(),
                None => self.books.push(book.clone()),
            }
        }
    }

    /// Write the snapshot as pretty JSON, replacing any previous file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot. `Ok(None)` when no file exists at `path`.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&contents)?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }
}

fn check_ids<E: Entity>(records: &[E]) -> Result<()> {
    match records.iter().find(|e| e.id() == EntityId::MAX) {
        Some(record) => Err(BibliothecaError::Integrity(format!(
            "{} id {} is out of range",
            E::KIND.singular(),
            record.id()
        ))),
        None => Ok(()),
    }
}
