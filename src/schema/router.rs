//! Schema router: picks the adapter for a document's schema version
//!
//! Adapters are matched on major version only; any minor or patch
//! revision of a supported major is read the same way.

use super::traits::SchemaAdapter;
use super::v2::V2Adapter;
use super::v3::V3Adapter;
use crate::document::SchemaVersion;
use crate::error::{TranslateError, TranslateResult};
use std::sync::Arc;

/// Dispatches a schema version to the adapter registered for its major.
pub struct SchemaRouter {
    adapters: Vec<Arc<dyn SchemaAdapter>>,
}

impl SchemaRouter {
    /// An empty router. Use [`SchemaRouter::default`] for the built-in
    /// 2.x and 3.x adapters.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Register an adapter. A later registration for the same major
    /// version shadows the earlier one.
    pub fn register(&mut self, adapter: Arc<dyn SchemaAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn SchemaAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn adapter_for(&self, version: &SchemaVersion) -> TranslateResult<Arc<dyn SchemaAdapter>> {
        self.adapters
            .iter()
            .rev()
            .find(|a| a.major_version() == version.major)
            .cloned()
            .ok_or_else(|| TranslateError::UnsupportedSchemaVersion(version.to_string()))
    }

    pub fn adapter_ids(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.id()).collect()
    }
}

impl Default for SchemaRouter {
    fn default() -> Self {
        Self::new()
            .with_adapter(Arc::new(V2Adapter))
            .with_adapter(Arc::new(V3Adapter))
    }
}
