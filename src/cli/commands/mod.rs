//! CLI command implementations

pub mod export;
pub mod init;
pub mod processors;
pub mod serialize;
pub mod validate;

use crate::adapters::repository::{create_repository, ContentRepository};
use crate::config::StrataConfig;
use crate::core::export::StageRegistry;
use crate::core::serialize::{builtin_registry, SerializationEngine};
use crate::domain::Result;
use std::sync::Arc;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const RESOURCE_FAILURES: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    pub const RETRIEVAL: i32 = 3;
    pub const FATAL: i32 = 5;
}

/// Repository and stages wired from a configuration
pub(crate) struct Runtime {
    pub repository: Arc<dyn ContentRepository>,
    pub engine: Arc<SerializationEngine>,
    pub stages: Arc<StageRegistry>,
}

impl Runtime {
    pub(crate) fn from_config(config: &StrataConfig) -> Result<Self> {
        let repository = create_repository(&config.repository)?;
        let engine = Arc::new(SerializationEngine::new(Arc::new(builtin_registry()?)));
        let stages = Arc::new(StageRegistry::with_builtin(engine.clone())?);
        Ok(Self {
            repository,
            engine,
            stages,
        })
    }
}
