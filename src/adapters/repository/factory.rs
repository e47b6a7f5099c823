//! Content repository factory
//!
//! Creates the repository described by the `[repository]` configuration
//! section.

use super::fixture::load_fixture_file;
use super::traits::ContentRepository;
use crate::config::schema::RepositoryConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create a content repository based on the configuration
///
/// # Errors
///
/// Returns an error if the content fixture cannot be loaded
pub fn create_repository(config: &RepositoryConfig) -> Result<Arc<dyn ContentRepository>> {
    tracing::info!(fixture = %config.fixture, "Creating in-memory content repository");
    let repository = load_fixture_file(&config.fixture)?;
    Ok(Arc::new(repository) as Arc<dyn ContentRepository>)
}
