//! heritage-embed
//!
//! Sentence embeddings for the similarity index: a local BERT-family encoder
//! (e.g. paraphrase-multilingual-MiniLM-L12-v2) run with candle, and a
//! deterministic hashing embedder for offline use and tests.
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use heritage_core::config::{expand_path, EmbedSettings};
use heritage_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use device::select_device;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_on_device;

pub struct SentenceEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl SentenceEncoder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading sentence encoder");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e)
        })?;
        let config_raw = std::fs::read_to_string(model_dir.join("config.json"))?;
        let config: BertConfig = serde_json::from_str(&config_raw)?;
        let dim = serde_json::from_str::<serde_json::Value>(&config_raw)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;
        let safetensors = model_dir.join("model.safetensors");
        let vb = if safetensors.exists() {
            // SAFETY: the weights file is not modified while mapped.
            unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, &device)? }
        } else {
            let weights = candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?;
            VarBuilder::from_tensors(weights.into_iter().collect(), DType::F32, &device)
        };
        let model = BertModel::load(vb, &config)?;
        info!(dim, "sentence encoder loaded");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) =
            tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        if start.elapsed().as_millis() > 200 {
            debug!(ms = start.elapsed().as_millis() as u64, "slow embedding");
        }
        Ok(emb)
    }
}

impl Embedder for SentenceEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

/// Feature-hashing embedder over character unigrams and bigrams.
///
/// Works for unsegmented Chinese text; vectors are L2-normalized and stable
/// across runs for the same input.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        use std::hash::Hasher;
        use twox_hash::XxHash64;
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(token.as_bytes());
        let h = hasher.finish();
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        ((h as usize) % self.dim, sign)
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let chars: Vec<char> = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        let mut v = vec![0f32; self.dim];
        let mut buf = [0u8; 8];
        for (i, c) in chars.iter().enumerate() {
            let (idx, sign) = self.bucket(c.encode_utf8(&mut buf));
            v[idx] += sign;
            if let Some(next) = chars.get(i + 1) {
                let (idx, sign) = self.bucket(&format!("{c}{next}"));
                v[idx] += 2.0 * sign;
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-6 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Build the embedder described by `settings`.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing embedder regardless of settings.
pub fn embedder_from_settings(settings: &EmbedSettings) -> Result<Arc<dyn Embedder>> {
    let forced = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if forced || settings.use_fake {
        info!(dim = settings.fake_dim, "using hashing embedder");
        return Ok(Arc::new(HashEmbedder::new(settings.fake_dim)));
    }
    let dir = resolve_model_dir(settings.model_dir.as_deref())?;
    Ok(Arc::new(SentenceEncoder::load(&dir, settings.max_len)?))
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = expand_path(dir);
        if p.exists() {
            return Ok(p);
        }
        warn!(dir = %p.display(), "configured model dir does not exist");
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    for candidate in [
        "models/paraphrase-multilingual-MiniLM-L12-v2",
        "../models/paraphrase-multilingual-MiniLM-L12-v2",
    ] {
        let p = Path::new(candidate);
        if p.exists() {
            return Ok(p.to_path_buf());
        }
    }
    Err(anyhow!("Could not locate sentence encoder model directory"))
}
