use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CategoryCount, CategoryMember, GraphStatistics, ItemRecord, RegionMember};

/// Text → fixed-dimension vector. Identical input must give identical output.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Read-only access to the heritage knowledge graph.
///
/// Callers check `is_available` before issuing queries; an unavailable store
/// answers every query with `Error::StoreUnavailable`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    fn is_available(&self) -> bool;
    async fn find_by_name(&self, name: &str) -> Result<Vec<ItemRecord>>;
    async fn find_by_category(&self, category: &str) -> Result<Vec<CategoryMember>>;
    async fn find_by_region(&self, region: &str) -> Result<Vec<RegionMember>>;
    async fn statistics(&self) -> Result<GraphStatistics>;
    async fn category_distribution(&self) -> Result<Vec<CategoryCount>>;
}

/// Prompt → text. May fail for network, auth or quota reasons.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
