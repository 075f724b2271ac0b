//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`,
//! the legacy plain variables (`NEO4J_*`, `QWEN_API_KEY`, `DASHSCOPE_API_KEY`)
//! and finally `HERITAGE_*` env vars (`__` separates nested keys).
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let config = Self { figment: Self::figment_for(&env_name) };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    fn figment_for(env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Env::raw().only(&["NEO4J_URI"]).map(|_| "graph.uri".into()))
            .merge(Env::raw().only(&["NEO4J_USER"]).map(|_| "graph.user".into()))
            .merge(Env::raw().only(&["NEO4J_PASSWORD"]).map(|_| "graph.password".into()));
        // Later keys win; a blank one (as left in .env templates) must not
        // shadow an earlier real key.
        for var in ["DASHSCOPE_API_KEY", "QWEN_API_KEY"] {
            if env::var(var).map_or(false, |v| !v.trim().is_empty()) {
                figment = figment.merge(Env::raw().only(&[var]).map(|_| "llm.api_key".into()));
            }
        }
        figment.merge(Env::prefixed("HERITAGE_").split("__"))
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The whole typed configuration tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        match env {
            "prod" | "production" => {
                let backend: GraphBackend = self.get("graph.backend")?;
                if backend != GraphBackend::Neo4j {
                    return Err(Error::InvalidConfig(
                        "production requires graph.backend = \"neo4j\"".into(),
                    )
                    .into());
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphBackend {
    Neo4j,
    /// Serve the graph from the introductions corpus held in memory.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub backend: GraphBackend,
    pub uri: String,
    pub user: String,
    pub password: String,
    pub connect_timeout_secs: u64,
    /// Introductions JSON used by the memory backend.
    pub data_file: Option<String>,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            backend: GraphBackend::Neo4j,
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
            connect_timeout_secs: 5,
            data_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub dir: String,
    pub top_k: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { dir: "vector_index".to_string(), top_k: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedSettings {
    pub model_dir: Option<String>,
    /// Use the deterministic hashing embedder instead of loading a model.
    pub use_fake: bool,
    pub fake_dim: usize,
    pub max_len: usize,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self { model_dir: None, use_fake: false, fake_dim: 384, max_len: 128 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            model: "qwen-max".to_string(),
            timeout_secs: 120,
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    /// Upper bound on a single generation call, enforced by the composer.
    pub generation_timeout_secs: u64,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self { generation_timeout_secs: 90 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub graph: GraphSettings,
    pub index: IndexSettings,
    pub embed: EmbedSettings,
    pub llm: LlmSettings,
    pub answer: AnswerSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.index.top_k == 0 {
            return Err(Error::InvalidConfig("index.top_k must be positive".into()));
        }
        if self.graph.backend == GraphBackend::Memory && self.graph.data_file.is_none() {
            return Err(Error::InvalidConfig(
                "graph.backend = \"memory\" requires graph.data_file".into(),
            ));
        }
        if self.embed.use_fake && self.embed.fake_dim == 0 {
            return Err(Error::InvalidConfig("embed.fake_dim must be positive".into()));
        }
        Ok(())
    }

    /// The configured API key, treating blank values as absent.
    pub fn llm_api_key(&self) -> Option<&str> {
        self.llm.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
