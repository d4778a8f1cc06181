//! Repository traits for catalog operations.

pub mod repositories;
pub mod tags;

pub use repositories::RepositoryRepo;
pub use tags::TagRepo;
