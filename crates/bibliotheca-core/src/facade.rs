use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::Result;
use crate::export::ExportStrategy;
use crate::models::{
    Book, BookField, BookStatus, Entity, EntityId, EntityKind, Librarian, LibrarianField, Reader,
    ReaderField, Record,
};
use crate::observer::{ConsoleObserver, FileLogObserver, Observer, ObserverSet, TracingObserver};
use crate::storage::repositories::{
    BookRepository, Filters, InMemoryRepository, LibrarianRepository, ReaderRepository, Repository,
};
use crate::storage::snapshot::LibrarySnapshot;

/// Result of [`LibraryFacade::load_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    NoSavedState,
}

/// Domain operations over the book, librarian and reader repositories.
///
/// Every mutation is followed by a notification to the registered
/// observers. Reads are not notified. Loan bookkeeping (a book's status and
/// borrower, a reader's borrowed set) is owned by [`borrow_book`] and
/// [`return_book`]; the `update_*` operations leave it untouched.
///
/// [`borrow_book`]: LibraryFacade::borrow_book
/// [`return_book`]: LibraryFacade::return_book
#[derive(Debug)]
pub struct LibraryFacade {
    books: BookRepository,
    librarians: LibrarianRepository,
    readers: ReaderRepository,
    observers: ObserverSet,
    state_path: PathBuf,
}

impl LibraryFacade {
    /// Empty library with no observers, snapshotting to `state_path`.
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            books: BookRepository::new(),
            librarians: LibrarianRepository::new(),
            readers: ReaderRepository::new(),
            observers: ObserverSet::new(),
            state_path: state_path.into(),
        }
    }

    /// Empty library wired with the observers the config enables.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut facade = Self::new(config.state_path());
        if let Some(path) = config.log_path() {
            facade.subscribe(FileLogObserver::open(path)?);
        }
        if config.logging.tracing_events {
            facade.subscribe(TracingObserver);
        }
        if config.logging.console {
            facade.subscribe(ConsoleObserver);
        }
        Ok(facade)
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.subscribe(observer);
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn books(&self) -> &BookRepository {
        &self.books
    }

    pub fn librarians(&self) -> &LibrarianRepository {
        &self.librarians
    }

    pub fn readers(&self) -> &ReaderRepository {
        &self.readers
    }

    fn notify(&self, message: impl AsRef<str>) {
        self.observers.notify(message.as_ref());
    }

    // ─── Books ─────────────────────────────────────────────

    pub fn add_book(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
        isbn: impl Into<String>,
    ) -> Book {
        let mut book = Book::new(title, author, year, isbn);
        book.id = self.books.add(book.clone());
        self.notify(format!("Book added: {} by {}", book.title, book.author));
        book
    }

    pub fn get_book(&self, id: EntityId) -> Option<&Book> {
        self.books.get(id)
    }

    /// Replace a book's catalogue fields. Its loan state is kept as stored.
    pub fn update_book(&mut self, mut book: Book) -> bool {
        let Some(stored) = self.books.get(book.id) else {
            return false;
        };
        book.status = stored.status;
        book.borrower_id = stored.borrower_id;
        update_entity(&mut self.books, &self.observers, book)
    }

    /// Remove a book. A borrowed book is first dropped from its borrower's set.
    pub fn delete_book(&mut self, id: EntityId) -> bool {
        if let Some(reader_id) = self.books.get(id).and_then(|b| b.borrower_id)
            && let Some(mut reader) = self.readers.get(reader_id).cloned()
            && reader.has_borrowed(id)
        {
            reader.books_borrowed.retain(|book_id| *book_id != id);
            self.readers.update(reader);
        }
        delete_entity(&mut self.books, &self.observers, id)
    }

    pub fn search_books(&self, filters: &Filters<BookField>) -> Vec<Book> {
        self.books.search(filters)
    }

    // ─── Librarians ────────────────────────────────────────

    pub fn add_librarian(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        position: impl Into<String>,
    ) -> Librarian {
        let mut librarian = Librarian::new(name, email, phone, position);
        librarian.id = self.librarians.add(librarian.clone());
        self.notify(format!("Librarian added: {}", librarian.name));
        librarian
    }

    pub fn get_librarian(&self, id: EntityId) -> Option<&Librarian> {
        self.librarians.get(id)
    }

    pub fn update_librarian(&mut self, librarian: Librarian) -> bool {
        update_entity(&mut self.librarians, &self.observers, librarian)
    }

    pub fn delete_librarian(&mut self, id: EntityId) -> bool {
        delete_entity(&mut self.librarians, &self.observers, id)
    }

    pub fn search_librarians(&self, filters: &Filters<LibrarianField>) -> Vec<Librarian> {
        self.librarians.search(filters)
    }

    // ─── Readers ───────────────────────────────────────────

    pub fn add_reader(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Reader {
        let mut reader = Reader::new(name, email, phone);
        reader.id = self.readers.add(reader.clone());
        self.notify(format!("Reader added: {}", reader.name));
        reader
    }

    pub fn get_reader(&self, id: EntityId) -> Option<&Reader> {
        self.readers.get(id)
    }

    /// Replace a reader's contact fields. The borrowed set is kept as stored.
    pub fn update_reader(&mut self, mut reader: Reader) -> bool {
        let Some(stored) = self.readers.get(reader.id) else {
            return false;
        };
        reader.books_borrowed = stored.books_borrowed.clone();
        update_entity(&mut self.readers, &self.observers, reader)
    }

    /// Remove a reader. Books they still hold become available again.
    pub fn delete_reader(&mut self, id: EntityId) -> bool {
        if !self.readers.contains(id) {
            return false;
        }
        let held: Vec<Book> = self
            .books
            .iter()
            .filter(|b| b.borrower_id == Some(id))
            .cloned()
            .collect();
        for mut book in held {
            book.status = BookStatus::Available;
            book.borrower_id = None;
            self.books.update(book);
        }
        delete_entity(&mut self.readers, &self.observers, id)
    }

    pub fn search_readers(&self, filters: &Filters<ReaderField>) -> Vec<Reader> {
        self.readers.search(filters)
    }

    // ─── Loans ─────────────────────────────────────────────

    /// Lend an available book to a reader.
    ///
    /// Returns `false` without touching anything when either id is unknown
    /// or the book is not available. Both records are prepared before
    /// either is written.
    pub fn borrow_book(&mut self, reader_id: EntityId, book_id: EntityId) -> bool {
        let (Some(mut reader), Some(mut book)) = (
            self.readers.get(reader_id).cloned(),
            self.books.get(book_id).cloned(),
        ) else {
            return false;
        };
        if !book.is_available() {
            return false;
        }

        book.status = BookStatus::Borrowed;
        book.borrower_id = Some(reader_id);
        if !reader.has_borrowed(book_id) {
            reader.books_borrowed.push(book_id);
        }

        let message = format!("Book '{}' borrowed by {}", book.title, reader.name);
        self.books.update(book);
        self.readers.update(reader);
        self.notify(message);
        true
    }

    /// Take back a borrowed book.
    ///
    /// If the borrower has since been deleted only the book is updated.
    pub fn return_book(&mut self, book_id: EntityId) -> bool {
        let Some(mut book) = self.books.get(book_id).cloned() else {
            return false;
        };
        if book.status != BookStatus::Borrowed {
            return false;
        }

        if let Some(reader_id) = book.borrower_id
            && let Some(mut reader) = self.readers.get(reader_id).cloned()
            && reader.has_borrowed(book_id)
        {
            reader.books_borrowed.retain(|id| *id != book_id);
            self.readers.update(reader);
        }

        book.status = BookStatus::Available;
        book.borrower_id = None;
        let message = format!("Book '{}' returned", book.title);
        self.books.update(book);
        self.notify(message);
        true
    }

    // ─── Export / import ───────────────────────────────────

    /// Every record of one kind, in insertion order.
    pub fn records(&self, kind: EntityKind) -> Vec<Record> {
        match kind {
            EntityKind::Books => self.books.iter().map(Entity::record).collect(),
            EntityKind::Librarians => self.librarians.iter().map(Entity::record).collect(),
            EntityKind::Readers => self.readers.iter().map(Entity::record).collect(),
        }
    }

    /// Serialize one collection through `strategy` into `target`.
    pub fn export(&self, strategy: &dyn ExportStrategy, target: &Path, kind: EntityKind) -> Result<()> {
        let written = strategy
            .serialize(&self.records(kind))
            .and_then(|bytes| write_file(target, &bytes));

        match written {
            Ok(()) => {
                self.notify(format!("Exported {kind} to {}", target.display()));
                Ok(())
            }
            Err(e) => {
                self.notify(format!("Error exporting {kind}: {e}"));
                Err(e)
            }
        }
    }

    /// Merge books from a JSON export, keeping their ids.
    ///
    /// The file is fully parsed and the merged library is validated before
    /// any record is applied, so an import cannot break a current loan.
    pub fn import_books(&mut self, path: &Path) -> Result<usize> {
        let checked = read_books(path).and_then(|books| {
            let mut merged = self.snapshot();
            merged.merge_books(&books);
            merged.validate()?;
            Ok(books)
        });
        match checked {
            Ok(books) => {
                let count = books.len();
                for book in books {
                    self.books.restore(book);
                }
                self.notify(format!("Imported books from {}", path.display()));
                Ok(count)
            }
            Err(e) => {
                self.notify(format!("Error importing books: {e}"));
                Err(e)
            }
        }
    }

    // ─── Snapshot ──────────────────────────────────────────

    pub fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            books: self.books.get_all(),
            librarians: self.librarians.get_all(),
            readers: self.readers.get_all(),
        }
    }

    /// Replace every repository with the snapshot's contents.
    pub fn restore_snapshot(&mut self, snapshot: LibrarySnapshot) {
        self.books.replace_all(snapshot.books);
        self.librarians.replace_all(snapshot.librarians);
        self.readers.replace_all(snapshot.readers);
        tracing::debug!(
            books = self.books.len(),
            librarians = self.librarians.len(),
            readers = self.readers.len(),
            "library state restored"
        );
    }

    pub fn save_state(&self) -> Result<()> {
        match self.snapshot().save_to(&self.state_path) {
            Ok(()) => {
                self.notify("Library state saved");
                Ok(())
            }
            Err(e) => {
                self.notify(format!("Error saving state: {e}"));
                Err(e)
            }
        }
    }

    /// Replace the in-memory library with the saved snapshot.
    ///
    /// A missing snapshot leaves the library unchanged. A snapshot that
    /// cannot be read or fails validation leaves it unchanged too, and the
    /// error is returned after being reported to the observers.
    pub fn load_state(&mut self) -> Result<LoadOutcome> {
        match LibrarySnapshot::load_from(&self.state_path) {
            Ok(Some(snapshot)) => {
                self.restore_snapshot(snapshot);
                self.notify("Library state loaded");
                Ok(LoadOutcome::Loaded)
            }
            Ok(None) => {
                self.notify("No saved state found");
                Ok(LoadOutcome::NoSavedState)
            }
            Err(e) => {
                self.notify(format!("Error loading state: {e}"));
                Err(e)
            }
        }
    }
}

fn update_entity<E: Entity>(repo: &mut InMemoryRepository<E>, observers: &ObserverSet, entity: E) -> bool {
    let message = format!("{} updated: {}", E::KIND.singular(), entity.label());
    let updated = repo.update(entity);
    if updated {
        observers.notify(&message);
    }
    updated
}

fn delete_entity<E: Entity>(repo: &mut InMemoryRepository<E>, observers: &ObserverSet, id: EntityId) -> bool {
    match repo.delete(id) {
        Some(removed) => {
            observers.notify(&format!("{} deleted: {}", E::KIND.singular(), removed.label()));
            true
        }
        None => false,
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

fn read_books(path: &Path) -> Result<Vec<Book>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BibliothecaError;
    use crate::export::{BinaryExport, CsvExport, JsonExport};
    use crate::observer::MemoryObserver;
    use tempfile::TempDir;

    fn facade(dir: &TempDir) -> (LibraryFacade, MemoryObserver) {
        let log = MemoryObserver::new();
        let mut facade = LibraryFacade::new(dir.path().join("library_state.json"));
        facade.subscribe(log.clone());
        (facade, log)
    }

    #[test]
    fn test_borrow_and_return_scenario() {
        let dir = TempDir::new().unwrap();
        let (mut lib, _) = facade(&dir);

        let book = lib.add_book("War and Peace", "Tolstoy", 1869, "ISBN1");
        let reader = lib.add_reader("Ivan", "i@x.com", "+1");
        assert_eq!(book.id, 1);
        assert_eq!(reader.id, 1);

        assert!(lib.borrow_book(1, 1));
        assert_eq!(lib.get_book(1).unwrap().status, BookStatus::Borrowed);
        assert_eq!(lib.get_book(1).unwrap().borrower_id, Some(1));
        assert_eq!(lib.get_reader(1).unwrap().books_borrowed, vec![1]);

        assert!(lib.return_book(1));
        assert_eq!(lib.get_book(1).unwrap().status, BookStatus::Available);
        assert!(lib.get_book(1).unwrap().borrower_id.is_none());
        assert!(lib.get_reader(1).unwrap().books_borrowed.is_empty());
    }

    #[test]
    fn test_borrow_then_return_restores_state() {
        let dir = TempDir::new().unwrap();
        let (mut lib, _) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_reader("Petr", "p@x.com", "+2");
        let before = lib.snapshot();

        assert!(lib.borrow_book(1, 1));
        assert!(lib.return_book(1));
        assert_eq!(lib.snapshot(), before);
    }

    #[test]
    fn test_borrow_unavailable_book_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_reader("Ivan", "i@x.com", "+1");
        lib.add_reader("Petr", "p@x.com", "+2");
        assert!(lib.borrow_book(1, 1));

        let before = lib.snapshot();
        let notified = log.messages().len();
        assert!(!lib.borrow_book(2, 1));
        assert!(!lib.borrow_book(1, 1));
        assert_eq!(lib.snapshot(), before);
        assert_eq!(log.messages().len(), notified);
    }

    #[test]
    fn test_borrow_unknown_ids_fails() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_reader("Ivan", "i@x.com", "+1");
        log.clear();

        assert!(!lib.borrow_book(9, 1));
        assert!(!lib.borrow_book(1, 9));
        assert_eq!(lib.get_book(1).unwrap().status, BookStatus::Available);
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_return_requires_borrowed_book() {
        let dir = TempDir::new().unwrap();
        let (mut lib, _) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        assert!(!lib.return_book(1));
        assert!(!lib.return_book(42));
    }

    #[test]
    fn test_return_with_missing_borrower() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        let mut book = Book::new("Dune", "Herbert", 1965, "ISBN2");
        book.id = 1;
        book.status = BookStatus::Borrowed;
        book.borrower_id = Some(7);
        lib.restore_snapshot(LibrarySnapshot {
            books: vec![book],
            ..LibrarySnapshot::default()
        });

        assert!(lib.return_book(1));
        assert!(lib.get_book(1).unwrap().is_available());
        assert_eq!(log.last().as_deref(), Some("Book 'Dune' returned"));
    }

    #[test]
    fn test_notifications_for_mutations() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);

        lib.add_book("War and Peace", "Tolstoy", 1869, "ISBN1");
        lib.add_librarian("Anna", "anna@library.org", "+7", "Head librarian");
        lib.add_reader("Ivan", "i@x.com", "+1");
        lib.borrow_book(1, 1);
        lib.search_books(&Filters::new());
        lib.return_book(1);
        lib.delete_librarian(1);

        assert_eq!(
            log.messages(),
            [
                "Book added: War and Peace by Tolstoy",
                "Librarian added: Anna",
                "Reader added: Ivan",
                "Book 'War and Peace' borrowed by Ivan",
                "Book 'War and Peace' returned",
                "Librarian deleted: Anna",
            ]
        );
    }

    #[test]
    fn test_delete_unknown_is_silent() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        assert!(!lib.delete_book(3));
        assert!(!lib.delete_reader(3));
        assert!(!lib.delete_librarian(3));
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_update_book_keeps_loan_state() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_reader("Ivan", "i@x.com", "+1");
        lib.borrow_book(1, 1);

        let mut edited = lib.get_book(1).cloned().unwrap();
        edited.title = "Dune Messiah".to_string();
        edited.status = BookStatus::Available;
        edited.borrower_id = None;
        assert!(lib.update_book(edited));

        let stored = lib.get_book(1).unwrap();
        assert_eq!(stored.title, "Dune Messiah");
        assert_eq!(stored.status, BookStatus::Borrowed);
        assert_eq!(stored.borrower_id, Some(1));
        assert_eq!(log.last().as_deref(), Some("Book updated: Dune Messiah"));
    }

    #[test]
    fn test_update_reader_keeps_borrowed_set() {
        let dir = TempDir::new().unwrap();
        let (mut lib, _) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_reader("Ivan", "i@x.com", "+1");
        lib.borrow_book(1, 1);

        let mut edited = lib.get_reader(1).cloned().unwrap();
        edited.email = "ivan@new.org".to_string();
        edited.books_borrowed.clear();
        assert!(lib.update_reader(edited));

        let stored = lib.get_reader(1).unwrap();
        assert_eq!(stored.email, "ivan@new.org");
        assert_eq!(stored.books_borrowed, vec![1]);
    }

    #[test]
    fn test_update_unknown_is_silent() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        let mut ghost = Librarian::new("Ghost", "g@x.com", "-", "none");
        ghost.id = 5;
        assert!(!lib.update_librarian(ghost));
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_search_books_by_author() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("War and Peace", "Tolstoy", 1869, "ISBN1");
        lib.add_book("Crime and Punishment", "Dostoevsky", 1866, "ISBN2");
        lib.add_book("Anna Karenina", "Tolstoy", 1878, "ISBN3");
        let notified = log.messages().len();

        let found = lib.search_books(&Filters::from_pairs([("author", "Tolstoy")]));
        let ids: Vec<EntityId> = found.iter().map(|b| b.id).collect();
        assert_eq!(ids, [1, 3]);
        assert_eq!(log.messages().len(), notified);

        let readers = lib.search_readers(&Filters::from_pairs([("nickname", "x")]));
        assert!(readers.is_empty());
    }

    #[test]
    fn test_save_and_load_state_roundtrip() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("War and Peace", "Tolstoy", 1869, "ISBN1");
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_book("Solaris", "Lem", 1961, "ISBN3");
        lib.delete_book(3);
        lib.add_librarian("Anna", "anna@library.org", "+7", "Head librarian");
        lib.add_reader("Ivan", "i@x.com", "+1");
        lib.borrow_book(1, 2);
        lib.save_state().unwrap();
        assert_eq!(log.last().as_deref(), Some("Library state saved"));
        let saved = lib.snapshot();

        let (mut restored, restored_log) = facade(&dir);
        assert_eq!(restored.load_state().unwrap(), LoadOutcome::Loaded);
        assert_eq!(restored.snapshot(), saved);
        assert_eq!(restored_log.last().as_deref(), Some("Library state loaded"));

        let next = restored.add_book("Hyperion", "Simmons", 1989, "ISBN4");
        assert_eq!(next.id, 3);
        assert_eq!(restored.add_reader("Petr", "p@x.com", "+2").id, 2);
    }

    #[test]
    fn test_load_replaces_rather_than_merges() {
        let dir = TempDir::new().unwrap();
        let (mut lib, _) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.save_state().unwrap();

        lib.add_book("Extra", "Someone", 2000, "ISBN9");
        lib.add_reader("Ivan", "i@x.com", "+1");
        lib.load_state().unwrap();

        assert_eq!(lib.books().len(), 1);
        assert!(lib.readers().is_empty());
        assert_eq!(lib.books().next_id(), 2);
    }

    #[test]
    fn test_load_missing_state() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");

        assert_eq!(lib.load_state().unwrap(), LoadOutcome::NoSavedState);
        assert_eq!(lib.books().len(), 1);
        assert_eq!(log.last().as_deref(), Some("No saved state found"));
    }

    #[test]
    fn test_load_corrupt_state_keeps_library() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        fs::write(lib.state_path(), "{ not json").unwrap();

        assert!(lib.load_state().is_err());
        assert_eq!(lib.books().len(), 1);
        assert!(log.last().unwrap().starts_with("Error loading state:"));
    }

    #[test]
    fn test_export_each_format() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("War and Peace", "Tolstoy", 1869, "ISBN1");
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");

        let json_path = dir.path().join("out").join("books.json");
        lib.export(&JsonExport, &json_path, EntityKind::Books).unwrap();
        let books: Vec<Book> = serde_json::from_slice(&fs::read(&json_path).unwrap()).unwrap();
        assert_eq!(books, lib.books().get_all());
        assert_eq!(
            log.last().unwrap(),
            format!("Exported books to {}", json_path.display())
        );

        let csv_path = dir.path().join("books.csv");
        lib.export(&CsvExport, &csv_path, EntityKind::Books).unwrap();
        let csv_text = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv_text.lines().count(), 3);
        assert!(csv_text.starts_with("id,title,author,year,isbn,status,borrower_id"));

        let bin_path = dir.path().join("books.bin");
        lib.export(&BinaryExport, &bin_path, EntityKind::Books).unwrap();
        let decoded = BinaryExport::decode(&fs::read(&bin_path).unwrap()).unwrap();
        assert_eq!(decoded, lib.records(EntityKind::Books));
    }

    #[test]
    fn test_export_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let (lib, log) = facade(&dir);
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let result = lib.export(&JsonExport, &blocker.join("books.json"), EntityKind::Books);
        assert!(result.is_err());
        assert!(log.last().unwrap().starts_with("Error exporting books:"));
    }

    #[test]
    fn test_import_books_keeps_ids() {
        let dir = TempDir::new().unwrap();
        let (mut source, _) = facade(&dir);
        source.add_book("War and Peace", "Tolstoy", 1869, "ISBN1");
        source.add_book("Dune", "Herbert", 1965, "ISBN2");
        source.delete_book(1);
        let path = dir.path().join("books.json");
        source.export(&JsonExport, &path, EntityKind::Books).unwrap();

        let (mut target, log) = facade(&dir);
        assert_eq!(target.import_books(&path).unwrap(), 1);
        assert_eq!(target.get_book(2).unwrap().title, "Dune");
        assert_eq!(target.add_book("Solaris", "Lem", 1961, "ISBN3").id, 3);
        assert!(log.messages().iter().any(|m| m.starts_with("Imported books from")));
    }

    #[test]
    fn test_import_malformed_status_applies_nothing() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        let path = dir.path().join("books.json");
        fs::write(
            &path,
            r#"[
                {"id":1,"title":"A","author":"X","year":1,"isbn":"I1","status":"available","borrower_id":null},
                {"id":2,"title":"B","author":"Y","year":2,"isbn":"I2","status":"misplaced","borrower_id":null}
            ]"#,
        )
        .unwrap();

        assert!(lib.import_books(&path).is_err());
        assert!(lib.books().is_empty());
        assert!(log.last().unwrap().starts_with("Error importing books:"));
    }

    #[test]
    fn test_from_config_wires_file_log() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.set_state_path(dir.path().join("state.json"));
        config.logging.console = false;
        config.logging.log_file = Some(dir.path().join("library.log").to_string_lossy().to_string());

        let mut lib = LibraryFacade::from_config(&config).unwrap();
        lib.add_reader("Ivan", "i@x.com", "+1");

        let contents = fs::read_to_string(dir.path().join("library.log")).unwrap();
        assert!(contents.trim_end().ends_with("Reader added: Ivan"));
        assert_eq!(lib.state_path(), dir.path().join("state.json"));
    }

    #[test]
    fn test_delete_borrowed_book_unwinds_loan() {
        let dir = TempDir::new().unwrap();
        let (mut lib, _) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_reader("Ivan", "i@x.com", "+1");
        assert!(lib.borrow_book(1, 1));
        assert!(lib.delete_book(1));
        assert!(lib.get_reader(1).unwrap().books_borrowed.is_empty());

        lib.save_state().unwrap();
        lib.load_state().unwrap();
        let reused = lib.add_book("Solaris", "Lem", 1961, "ISBN3");
        assert_eq!(reused.id, 1);
        lib.save_state().unwrap();

        assert_eq!(lib.load_state().unwrap(), LoadOutcome::Loaded);
        assert!(lib.get_book(1).unwrap().is_available());
        assert!(lib.get_reader(1).unwrap().books_borrowed.is_empty());
    }

    #[test]
    fn test_delete_reader_releases_their_books() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_book("Solaris", "Lem", 1961, "ISBN3");
        lib.add_reader("Ivan", "i@x.com", "+1");
        lib.borrow_book(1, 1);
        lib.borrow_book(1, 2);

        assert!(lib.delete_reader(1));
        assert!(lib.books().iter().all(Book::is_available));
        assert_eq!(log.last().as_deref(), Some("Reader deleted: Ivan"));

        lib.save_state().unwrap();
        lib.load_state().unwrap();
        assert_eq!(lib.add_reader("Petr", "p@x.com", "+2").id, 1);
        lib.save_state().unwrap();
        assert_eq!(lib.load_state().unwrap(), LoadOutcome::Loaded);
    }

    #[test]
    fn test_import_over_current_loan_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_book("Dune", "Herbert", 1965, "ISBN2");
        lib.add_reader("Ivan", "i@x.com", "+1");
        lib.borrow_book(1, 1);
        let path = dir.path().join("books.json");
        fs::write(
            &path,
            r#"[{"id":1,"title":"Dune","author":"Herbert","year":1965,"isbn":"ISBN2","status":"available","borrower_id":null}]"#,
        )
        .unwrap();

        assert!(matches!(lib.import_books(&path), Err(BibliothecaError::Integrity(_))));
        assert_eq!(lib.get_book(1).unwrap().status, BookStatus::Borrowed);
        assert_eq!(lib.get_reader(1).unwrap().books_borrowed, vec![1]);
        assert!(log.last().unwrap().starts_with("Error importing books:"));
    }

    #[test]
    fn test_import_borrowed_by_unaware_reader_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        lib.add_reader("Ivan", "i@x.com", "+1");
        let path = dir.path().join("books.json");
        fs::write(
            &path,
            r#"[{"id":4,"title":"Dune","author":"Herbert","year":1965,"isbn":"ISBN2","status":"borrowed","borrower_id":1}]"#,
        )
        .unwrap();

        assert!(lib.import_books(&path).is_err());
        assert!(lib.books().is_empty());
        assert!(log.last().unwrap().starts_with("Error importing books:"));
    }

    #[test]
    fn test_import_maximum_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (mut lib, log) = facade(&dir);
        let path = dir.path().join("books.json");
        fs::write(
            &path,
            r#"[{"id":18446744073709551615,"title":"T","author":"A","year":1,"isbn":"I","status":"available","borrower_id":null}]"#,
        )
        .unwrap();

        assert!(matches!(lib.import_books(&path), Err(BibliothecaError::Integrity(_))));
        assert!(lib.books().is_empty());
        assert_eq!(lib.books().next_id(), 1);
        assert!(log.last().unwrap().starts_with("Error importing books:"));
    }
}
