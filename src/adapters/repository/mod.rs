//! Content repository abstraction layer
//!
//! Strata reads a hierarchical content tree through the
//! [`ContentRepository`]/[`RepositorySession`] traits. The in-memory
//! implementation loads JSON fixtures and is what the CLI and the tests run
//! against.

pub mod factory;
pub mod fixture;
pub mod memory;
pub mod query;
pub mod traits;

pub use factory::create_repository;
pub use fixture::{load_fixture_file, load_fixture_str};
pub use memory::{MemoryRepository, MemoryRepositoryBuilder};
pub use query::{NodeQuery, Predicate};
pub use traits::{ContentRepository, RepositorySession, Resolution};
