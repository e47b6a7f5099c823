//! JSON serialization of content nodes
//!
//! - [`registry`] - processor table and selector resolution
//! - [`engine`] - depth-first serialization driven by the active processors
//! - [`processors`] - the built-in processors
//! - [`accumulator`] - ordered JSON object builder used by processors

pub mod accumulator;
pub mod engine;
pub mod processor;
pub mod processors;
pub mod registry;

pub use accumulator::JsonAccumulator;
pub use engine::{SerializationContext, SerializationEngine};
pub use processor::JsonProcessor;
pub use processors::builtin_registry;
pub use registry::{ProcessorRegistry, ProcessorSelection};
