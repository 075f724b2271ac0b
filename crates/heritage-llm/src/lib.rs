//! heritage-llm
//!
//! Text generation over an OpenAI-compatible chat endpoint, and the batch
//! job that fills in project introductions with it.
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use heritage_core::config::Settings;
use heritage_core::traits::Generator;

pub mod client;
pub mod intro;

pub use client::{ChatClient, EXPERT_SYSTEM_PROMPT, RESEARCHER_SYSTEM_PROMPT};
pub use intro::{BatchSummary, IntroBatch, ListedProject};

/// Build the answer generator, or `None` when no API key is configured.
pub fn generator_from_settings(settings: &Settings) -> Result<Option<Arc<dyn Generator>>> {
    match settings.llm_api_key() {
        Some(key) => {
            let client = ChatClient::new(&settings.llm, key)?;
            info!(model = client.model(), "text generation enabled");
            Ok(Some(Arc::new(client)))
        }
        None => {
            warn!("no LLM API key configured; answers will be template-based");
            Ok(None)
        }
    }
}
