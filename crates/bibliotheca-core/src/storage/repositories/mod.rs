mod filters;
mod in_memory;

pub use filters::Filters;
pub use in_memory::InMemoryRepository;

use crate::models::{Book, Entity, EntityId, Librarian, Reader};

pub type BookRepository = InMemoryRepository<Book>;
pub type LibrarianRepository = InMemoryRepository<Librarian>;
pub type ReaderRepository = InMemoryRepository<Reader>;

/// Keyed storage for one entity kind.
///
/// Unknown ids are never errors: lookups return `None`, mutations report
/// whether anything changed.
pub trait Repository {
    type Entity: Entity;

    /// Store `entity` under a freshly assigned id, ignoring its current id.
    fn add(&mut self, entity: Self::Entity) -> EntityId;
    fn get(&self, id: EntityId) -> Option<&Self::Entity>;
    /// Owned snapshot in insertion order.
    fn get_all(&self) -> Vec<Self::Entity>;
    /// Replace the stored record with the same id. `false` if the id is unknown.
    fn update(&mut self, entity: Self::Entity) -> bool;
    fn delete(&mut self, id: EntityId) -> Option<Self::Entity>;
    fn search(&self, filters: &Filters<<Self::Entity as Entity>::Field>) -> Vec<Self::Entity>;
}
