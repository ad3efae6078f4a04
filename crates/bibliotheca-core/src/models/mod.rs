pub mod book;
pub mod field;
pub mod librarian;
pub mod reader;

pub use book::*;
pub use field::*;
pub use librarian::*;
pub use reader::*;
