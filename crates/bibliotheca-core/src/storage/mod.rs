pub mod repositories;
pub mod snapshot;
