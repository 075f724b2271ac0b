//! heritage-rag
//!
//! Question answering over the heritage graph and similarity index: intent
//! classification, retrieval fusion, answer composition and the service
//! context tying them together.

pub mod compose;
pub mod fusion;
pub mod intent;
pub mod service;

pub use compose::{build_context, compose, template_answer};
pub use fusion::RetrievalEngine;
pub use intent::IntentClassifier;
pub use service::{
    ChatReply, HealthReport, HeritageService, ProjectDetail, SearchKind, SearchResults,
};
