//! Built-in JSON processors
//!
//! | name        | priority | default |
//! |-------------|----------|---------|
//! | properties  | 0        | yes     |
//! | deep        | 0        | no      |
//! | links       | 5        | no      |
//! | dereference | 10       | yes     |
//! | identify    | 10       | yes     |
//! | progeny     | 11       | no      |
//! | bare        | 90       | no      |
//! | data        | 90       | no      |
//! | nolinks     | 100      | no      |

pub mod bare;
pub mod data;
pub mod deep;
pub mod dereference;
pub mod identify;
pub mod links;
pub mod progeny;
pub mod properties;

pub use bare::BareProcessor;
pub use data::DataProcessor;
pub use deep::DeepProcessor;
pub use dereference::DereferenceProcessor;
pub use identify::IdentifyProcessor;
pub use links::{LinksProcessor, NoLinksProcessor};
pub use progeny::{ProgenyProcessor, SeenSet};
pub use properties::PropertiesProcessor;

use super::registry::ProcessorRegistry;
use crate::domain::Result;
use std::sync::Arc;

/// Builds the registry of built-in processors
///
/// # Errors
///
/// Returns a configuration error if two built-ins share a name.
pub fn builtin_registry() -> Result<ProcessorRegistry> {
    let mut registry = ProcessorRegistry::new();
    registry.register(Arc::new(PropertiesProcessor))?;
    registry.register(Arc::new(DeepProcessor))?;
    registry.register(Arc::new(LinksProcessor))?;
    registry.register(Arc::new(DereferenceProcessor))?;
    registry.register(Arc::new(IdentifyProcessor))?;
    registry.register(Arc::new(ProgenyProcessor::default()))?;
    registry.register(Arc::new(BareProcessor))?;
    registry.register(Arc::new(DataProcessor))?;
    registry.register(Arc::new(NoLinksProcessor))?;
    Ok(registry)
}
