// src/storage/mod.rs

//! Storage abstractions for blueprint persistence.
//!
//! The crawl core only produces the `Blueprint` value; writing it
//! somewhere durable is a pluggable backend concern.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Blueprint;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for blueprint storage backends.
#[async_trait]
pub trait BlueprintStorage: Send + Sync {
    /// Persist a blueprint; returns the location it was written to.
    async fn write_blueprint(&self, blueprint: &Blueprint) -> Result<String>;

    /// Load a previously written blueprint by project name.
    async fn load_blueprint(&self, project_name: &str) -> Result<Option<Blueprint>>;
}
