//! Domain types shared by the graph store, the similarity index and the
//! retrieval pipeline.

use serde::{Deserialize, Serialize};

/// A heritage project as stored in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeritageItem {
    pub name: String,
    pub category: String,
    pub region: String,
    pub organization: String,
}

/// Projection returned by a lookup on item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    pub category: Option<String>,
    pub region: Option<String>,
    pub organization: Option<String>,
}

/// Projection returned by an exact lookup on category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMember {
    pub name: String,
    pub region: Option<String>,
}

/// Projection returned by a lookup on declaring region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMember {
    pub name: String,
    pub category: Option<String>,
    pub region: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub item_count: i64,
    pub category_count: i64,
    pub region_count: i64,
    pub organization_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// The HeritageItem-shaped record carried through fusion and composition.
///
/// Fields the originating query did not project are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeritageRecord {
    pub name: String,
    pub category: Option<String>,
    pub region: Option<String>,
    pub organization: Option<String>,
}

impl From<ItemRecord> for HeritageRecord {
    fn from(r: ItemRecord) -> Self {
        Self {
            name: r.name,
            category: r.category,
            region: r.region,
            organization: r.organization,
        }
    }
}

impl From<RegionMember> for HeritageRecord {
    fn from(r: RegionMember) -> Self {
        Self {
            name: r.name,
            category: r.category,
            region: Some(r.region),
            organization: None,
        }
    }
}

impl CategoryMember {
    /// Members come from an exact category match, so the category is known.
    pub fn into_record(self, category: &str) -> HeritageRecord {
        HeritageRecord {
            name: self.name,
            category: Some(category.to_string()),
            region: self.region,
            organization: None,
        }
    }
}

/// Metadata attached to every indexed document.
///
/// Field names on disk follow the introductions corpus (`名称`, `类别`, `地区`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(rename = "名称", alias = "name", default)]
    pub name: String,
    #[serde(rename = "类别", alias = "category", default)]
    pub category: String,
    #[serde(rename = "地区", alias = "region", default)]
    pub region: String,
}

/// A retrievable text unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Text fed to the embedder for this document.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// A document hit with its similarity score. Higher is better, range [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Retrieval strategy inferred for a free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "keyword")]
pub enum QueryIntent {
    #[serde(rename = "name")]
    ByName(String),
    #[serde(rename = "category")]
    ByCategory(String),
    #[serde(rename = "region")]
    ByRegion(String),
}

impl QueryIntent {
    pub fn keyword(&self) -> &str {
        match self {
            Self::ByName(k) | Self::ByCategory(k) | Self::ByRegion(k) => k,
        }
    }
}

/// Everything gathered for a single query before answer composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    pub intent: QueryIntent,
    pub graph_results: Vec<HeritageRecord>,
    pub vector_results: Vec<ScoredDocument>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.graph_results.is_empty() && self.vector_results.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
}
