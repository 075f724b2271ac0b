//! heritage-vector
//!
//! Similarity Index: embeds documents with an [`Embedder`], answers top-k
//! inner-product queries, and persists itself as a vectors/manifest pair
//! (see [`store`]).
use std::path::Path;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::RwLock;
use tracing::{info, warn};

use heritage_core::error::{Error, Result};
use heritage_core::traits::Embedder;
use heritage_core::types::{Document, ScoredDocument};

pub mod flat;
pub mod store;

pub use flat::FlatIndex;

const EMBED_BATCH: usize = 32;
const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%)";

/// Shared similarity index.
///
/// Readers take a snapshot of the current [`FlatIndex`]; `build_index` and
/// `load` prepare a complete replacement before swapping it in, so a search
/// never sees a half-built index.
pub struct SimilarityIndex {
    embedder: Arc<dyn Embedder>,
    current: RwLock<Option<Arc<FlatIndex>>>,
    progress: bool,
}

impl SimilarityIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, current: RwLock::new(None), progress: false }
    }

    /// Show a progress bar while embedding in `build_index`.
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    /// Load the index saved in `dir`. A directory with no index files gives
    /// an index that is not ready; incomplete or mismatched files are an error.
    pub fn open(embedder: Arc<dyn Embedder>, dir: &Path) -> Result<Self> {
        let index = Self::new(embedder);
        if store::exists(dir) {
            index.load(dir)?;
        } else {
            warn!(dir = %dir.display(), "no saved similarity index; vector retrieval disabled");
        }
        Ok(index)
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn len(&self) -> usize {
        self.current.read().as_ref().map_or(0, |i| i.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current index, if one is loaded.
    pub fn snapshot(&self) -> Option<Arc<FlatIndex>> {
        self.current.read().clone()
    }

    /// Embed `documents` and replace the current index with them.
    pub fn build_index(&self, documents: Vec<Document>) -> Result<()> {
        if documents.is_empty() {
            return Err(Error::Operation("cannot build an index from an empty corpus".into()));
        }
        let pb = if self.progress {
            ProgressBar::new(documents.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut vectors = Vec::with_capacity(documents.len());
        for chunk in documents.chunks(EMBED_BATCH) {
            let texts: Vec<String> = chunk.iter().map(Document::embedding_text).collect();
            let batch = self
                .embedder
                .embed_batch(&texts)
                .map_err(|e| Error::Embedding(e.to_string()))?;
            vectors.extend(batch);
            pb.inc(chunk.len() as u64);
        }
        pb.finish_and_clear();

        let built = FlatIndex::new(self.embedder.dim(), vectors, documents)?;
        info!(count = built.len(), dim = built.dim(), "built similarity index");
        *self.current.write() = Some(Arc::new(built));
        Ok(())
    }

    /// Top `top_k` documents for `query`, best first; empty when not ready.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredDocument>> {
        let Some(index) = self.snapshot() else { return Ok(Vec::new()) };
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let mut q = self.embedder.embed(query).map_err(|e| Error::Embedding(e.to_string()))?;
        flat::l2_normalize(&mut q);
        let docs = index.documents();
        Ok(index
            .search(&q, top_k)?
            .into_iter()
            .map(|(i, score)| ScoredDocument { document: docs[i].clone(), score })
            .collect())
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let index = self.snapshot().ok_or(Error::IndexNotReady)?;
        store::save(&index, dir)
    }

    /// Replace the current index with the one saved in `dir`.
    ///
    /// The saved dimension must match the embedder's; on any error the
    /// current index is left untouched.
    pub fn load(&self, dir: &Path) -> Result<()> {
        let loaded = store::load(dir)?;
        if loaded.dim() != self.embedder.dim() {
            return Err(Error::IndexMismatch(format!(
                "index dim {} does not match embedder dim {}",
                loaded.dim(),
                self.embedder.dim()
            )));
        }
        info!(dir = %dir.display(), count = loaded.len(), "loaded similarity index");
        *self.current.write() = Some(Arc::new(loaded));
        Ok(())
    }
}
