//! External system integrations for Strata.
//!
//! - [`repository`] - Content repository abstraction, the in-memory store and
//!   JSON fixtures
//!
//! # Design Pattern
//!
//! Adapters isolate the content store behind the
//! [`repository::ContentRepository`] and [`repository::RepositorySession`]
//! traits so the serialization engine and the export stages never depend on
//! a concrete backend.
//!
//! ```rust
//! use strata::adapters::repository::{load_fixture_str, ContentRepository};
//! use strata::domain::NodePath;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = load_fixture_str(
//!     r#"{ "children": [ { "name": "Subjects", "type": "cards:SubjectsHomepage" } ] }"#,
//! )?;
//! let session = repository.open_session()?;
//! assert!(session.node(&NodePath::new("/Subjects")?)?.is_some());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod repository;
