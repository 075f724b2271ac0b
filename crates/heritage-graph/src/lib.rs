//! heritage-graph
//!
//! Graph Store Adapter implementations: Neo4j over Bolt (`neo4j`) and an
//! in-memory store built from the introductions corpus (`memory`).
use std::sync::Arc;

use heritage_core::config::{expand_path, GraphBackend, GraphSettings};
use heritage_core::error::{Error, Result};
use heritage_core::traits::GraphStore;

pub mod cypher;
pub mod memory;
pub mod neo4j;

pub use memory::InMemoryGraphStore;
pub use neo4j::Neo4jGraphStore;

/// Result caps per lookup; they bound response size and prompt length.
pub const NAME_LIMIT: usize = 10;
pub const CATEGORY_LIMIT: usize = 20;
pub const REGION_LIMIT: usize = 20;

/// Open the store selected by `settings.backend`.
///
/// A Neo4j store that cannot connect is still returned, in its disconnected
/// state. The memory backend fails only if its corpus cannot be read.
pub async fn open_store(settings: &GraphSettings) -> Result<Arc<dyn GraphStore>> {
    match settings.backend {
        GraphBackend::Neo4j => Ok(Arc::new(Neo4jGraphStore::connect(settings).await)),
        GraphBackend::Memory => {
            let file = settings
                .data_file
                .as_deref()
                .ok_or_else(|| Error::InvalidConfig("graph.data_file is not set".into()))?;
            let store = InMemoryGraphStore::from_corpus(&expand_path(file))?;
            tracing::info!(items = store.len(), "serving graph from memory");
            Ok(Arc::new(store))
        }
    }
}
