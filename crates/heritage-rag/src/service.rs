use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use heritage_core::config::{expand_path, Settings};
use heritage_core::error::{Error, Result};
use heritage_core::traits::{GraphStore, Generator};
use heritage_core::types::{CategoryCount, GraphStatistics, HeritageRecord, QueryIntent};
use heritage_vector::SimilarityIndex;

use crate::compose::{compose, generate_within, GENERATION_APOLOGY};
use crate::fusion::RetrievalEngine;

/// How many records after the first one a project lookup returns.
const RELATED_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Name,
    Category,
    Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Ready,
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub knowledge_graph: GraphStatus,
    pub similarity_index: IndexStatus,
    pub indexed_documents: usize,
    pub generator: bool,
}

/// Reply to a question. `intent` is `None` when the graph was bypassed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub sources: Vec<String>,
    pub intent: Option<QueryIntent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub kind: SearchKind,
    pub count: usize,
    pub results: Vec<HeritageRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    pub found: bool,
    pub project: Option<HeritageRecord>,
    pub related: Vec<HeritageRecord>,
}

/// Serving context: graph store, similarity index and optional generator,
/// each probed once at construction.
pub struct HeritageService {
    graph: Arc<dyn GraphStore>,
    index: Arc<SimilarityIndex>,
    generator: Option<Arc<dyn Generator>>,
    engine: RetrievalEngine,
    generation_timeout: Duration,
}

impl HeritageService {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        index: Arc<SimilarityIndex>,
        generator: Option<Arc<dyn Generator>>,
        generation_timeout: Duration,
    ) -> Self {
        let engine = RetrievalEngine::new(Arc::clone(&graph), Arc::clone(&index));
        Self { graph, index, generator, engine, generation_timeout }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.engine = self.engine.with_top_k(top_k);
        self
    }

    /// Wire every component from `settings`.
    ///
    /// An unreachable graph or a missing index directory degrades the
    /// service; an index that fails verification is an error.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        let graph = heritage_graph::open_store(&settings.graph).await?;
        let embedder = heritage_embed::embedder_from_settings(&settings.embed)
            .context("loading embedder")?;
        let index_dir = expand_path(&settings.index.dir);
        let index = SimilarityIndex::open(embedder, &index_dir)
            .with_context(|| format!("opening similarity index at {}", index_dir.display()))?;
        let generator = heritage_llm::generator_from_settings(settings)?;
        let timeout = Duration::from_secs(settings.answer.generation_timeout_secs);
        let service = Self::new(graph, Arc::new(index), generator, timeout)
            .with_top_k(settings.index.top_k);
        info!(health = ?service.health(), "heritage service ready");
        Ok(service)
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok",
            knowledge_graph: if self.graph.is_available() {
                GraphStatus::Connected
            } else {
                GraphStatus::Disconnected
            },
            similarity_index: if self.index.is_ready() {
                IndexStatus::Ready
            } else {
                IndexStatus::NotReady
            },
            indexed_documents: self.index.len(),
            generator: self.generator.is_some(),
        }
    }

    /// Answer `message`, with the generator when `use_ai` and one is configured.
    ///
    /// With the graph offline the question goes straight to the generator;
    /// without one that is `Error::StoreUnavailable`.
    pub async fn chat(&self, message: &str, use_ai: bool) -> Result<ChatReply> {
        let generator = self.generator.as_deref().filter(|_| use_ai);
        if !self.graph.is_available() {
            let Some(generator) = generator else { return Err(Error::StoreUnavailable) };
            warn!("knowledge graph offline; asking the generator directly");
            let prompt = format!("作为非遗专家，请回答：{}", message);
            let answer = generate_within(generator, &prompt, self.generation_timeout)
                .await
                .unwrap_or_else(|| GENERATION_APOLOGY.to_string());
            return Ok(ChatReply { answer, sources: Vec::new(), intent: None });
        }

        let retrieval = self.engine.retrieve(message).await?;
        let answer = compose(&retrieval, generator, self.generation_timeout).await;
        Ok(ChatReply {
            answer: answer.answer,
            sources: answer.sources,
            intent: Some(retrieval.intent),
        })
    }

    pub async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Operation("search keyword is empty".into()));
        }
        let results: Vec<HeritageRecord> = match kind {
            SearchKind::Name => {
                self.graph.find_by_name(query).await?.into_iter().map(Into::into).collect()
            }
            SearchKind::Category => self
                .graph
                .find_by_category(query)
                .await?
                .into_iter()
                .map(|m| m.into_record(query))
                .collect(),
            SearchKind::Region => {
                self.graph.find_by_region(query).await?.into_iter().map(Into::into).collect()
            }
        };
        Ok(SearchResults { query: query.to_string(), kind, count: results.len(), results })
    }

    /// First name match plus up to four related matches.
    pub async fn project(&self, name: &str) -> Result<ProjectDetail> {
        let mut records =
            self.graph.find_by_name(name).await?.into_iter().map(HeritageRecord::from);
        let project = records.next();
        let related = records.take(RELATED_LIMIT).collect();
        Ok(ProjectDetail { found: project.is_some(), project, related })
    }

    pub async fn statistics(&self) -> Result<GraphStatistics> {
        self.graph.statistics().await
    }

    pub async fn categories(&self) -> Result<Vec<CategoryCount>> {
        self.graph.category_distribution().await
    }
}
