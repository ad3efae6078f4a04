pub mod builder;
pub mod command;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod facade;
pub mod models;
pub mod observer;
pub mod prototype;
pub mod storage;

pub use config::{AppConfig, LoggingConfig, StorageConfig};
pub use error::{BibliothecaError, ExitCode, Result};
pub use models::*;

pub use facade::{LibraryFacade, LoadOutcome};
pub use observer::{
    ConsoleObserver, FileLogObserver, MemoryObserver, Observer, ObserverSet, TracingObserver,
};
pub use export::{BinaryExport, CsvExport, ExportFormat, ExportStrategy, JsonExport};

pub use storage::repositories::{
    BookRepository, Filters, InMemoryRepository, LibrarianRepository, ReaderRepository,
    Repository,
};
pub use storage::snapshot::LibrarySnapshot;

pub use command::{
    AddBookCommand, BorrowBookCommand, Command, CommandHistory, Light, RemoteControl,
    ReturnBookCommand, TurnOffLightCommand, TurnOnLightCommand,
};
pub use dataset::{
    FileNumberSource, LoggingNumberSource, NumberService, NumberSource, NumberStats,
    open_logged_source,
};
pub use builder::{Computer, ComputerBuilder};
pub use prototype::{Employee, Person, PersonOverrides, Prototype, PrototypeRegistry};
