use std::sync::Arc;

use tracing::{debug, error, warn};

use heritage_core::error::{Error, Result};
use heritage_core::traits::GraphStore;
use heritage_core::types::{HeritageRecord, QueryIntent, RetrievalResult, ScoredDocument};
use heritage_vector::SimilarityIndex;

use crate::intent::IntentClassifier;

pub const DEFAULT_TOP_K: usize = 3;

/// Runs the graph lookup chosen by intent alongside a similarity search and
/// packages both.
pub struct RetrievalEngine {
    classifier: IntentClassifier,
    graph: Arc<dyn GraphStore>,
    index: Arc<SimilarityIndex>,
    top_k: usize,
}

impl RetrievalEngine {
    pub fn new(graph: Arc<dyn GraphStore>, index: Arc<SimilarityIndex>) -> Self {
        Self { classifier: IntentClassifier::default(), graph, index, top_k: DEFAULT_TOP_K }
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Only `Error::StoreUnavailable` escapes; other failures on either side
    /// are logged and leave that side empty.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        let intent = self.classifier.classify(query);
        debug!(?intent, "query intent");

        let (graph_results, vector_results) =
            tokio::join!(self.graph_lookup(&intent), self.similar(query));
        let graph_results = match graph_results {
            Ok(records) => records,
            Err(Error::StoreUnavailable) => return Err(Error::StoreUnavailable),
            Err(e) => {
                error!(error = %e, "graph lookup failed");
                Vec::new()
            }
        };

        Ok(RetrievalResult { query: query.to_string(), intent, graph_results, vector_results })
    }

    async fn graph_lookup(&self, intent: &QueryIntent) -> Result<Vec<HeritageRecord>> {
        Ok(match intent {
            QueryIntent::ByCategory(category) => self
                .graph
                .find_by_category(category)
                .await?
                .into_iter()
                .map(|m| m.into_record(category))
                .collect(),
            QueryIntent::ByRegion(region) => {
                self.graph.find_by_region(region).await?.into_iter().map(Into::into).collect()
            }
            QueryIntent::ByName(name) => {
                self.graph.find_by_name(name).await?.into_iter().map(Into::into).collect()
            }
        })
    }

    async fn similar(&self, query: &str) -> Vec<ScoredDocument> {
        if !self.index.is_ready() {
            return Vec::new();
        }
        let index = Arc::clone(&self.index);
        let (query, top_k) = (query.to_string(), self.top_k);
        match tokio::task::spawn_blocking(move || index.search(&query, top_k)).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                warn!(error = %e, "similarity search failed");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "similarity search task aborted");
                Vec::new()
            }
        }
    }
}
