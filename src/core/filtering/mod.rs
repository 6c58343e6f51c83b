// Core filtering module - automatic message filters and their enforcement.
// Following the same layout as the other core modules: models, ports, service.

pub mod collaborators;
pub mod example_generator;
pub mod filter_cache;
pub mod filter_models;
pub mod filter_service;
pub mod filter_store;
pub mod matcher;

pub use collaborators::*;
pub use example_generator::{ExampleGenerator, ExamplePreview};
pub use filter_cache::{FilterCache, FilterSnapshot};
pub use filter_models::*;
pub use filter_service::*;
pub use filter_store::*;
