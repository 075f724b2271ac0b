#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use heritage_core::traits::Generator;
use heritage_core::types::{Document, DocumentMetadata, HeritageItem};
use heritage_embed::HashEmbedder;
use heritage_graph::InMemoryGraphStore;
use heritage_vector::SimilarityIndex;

pub fn item(name: &str, category: &str, region: &str, organization: &str) -> HeritageItem {
    HeritageItem {
        name: name.into(),
        category: category.into(),
        region: region.into(),
        organization: organization.into(),
    }
}

pub fn items() -> Vec<HeritageItem> {
    vec![
        item("苗族古歌", "民间文学", "贵州省台江县", "台江县文化馆"),
        item("昆曲", "传统戏剧", "江苏省苏州市", "苏州昆剧院"),
        item("北昆", "传统戏剧", "北京市", "北方昆曲剧院"),
        item("蔚县剪纸", "传统美术", "河北省蔚县", "蔚县剪纸艺术研究所"),
        item("扬州剪纸", "传统美术", "江苏省扬州市", "扬州市非遗中心"),
        item("傣族剪纸", "传统美术", "云南省潞西市", "潞西市文化馆"),
        item("傣族孔雀舞", "传统舞蹈", "云南省瑞丽市", "瑞丽市文化馆"),
    ]
}

pub fn graph() -> Arc<InMemoryGraphStore> {
    Arc::new(InMemoryGraphStore::from_items(items()))
}

pub fn documents() -> Vec<Document> {
    items()
        .into_iter()
        .map(|i| Document {
            title: format!("{} - {}", i.name, i.category),
            content: format!(
                "类别：{}\n申报地区：{}\n保护单位：{}\n\n{}是国家级非物质文化遗产。",
                i.category, i.region, i.organization, i.name
            ),
            metadata: DocumentMetadata { name: i.name, category: i.category, region: i.region },
        })
        .collect()
}

pub fn ready_index() -> Arc<SimilarityIndex> {
    let index = SimilarityIndex::new(Arc::new(HashEmbedder::new(512)));
    index.build_index(documents()).expect("build index");
    Arc::new(index)
}

pub fn empty_index() -> Arc<SimilarityIndex> {
    Arc::new(SimilarityIndex::new(Arc::new(HashEmbedder::new(512))))
}

/// Generator with a canned reply that records every prompt it receives.
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<String>>,
    reply: Option<String>,
    delay: Duration,
}

impl RecordingGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            reply: Some(text.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self { prompts: Mutex::new(Vec::new()), reply: None, delay: Duration::ZERO }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { prompts: Mutex::new(Vec::new()), reply: Some("太迟了".into()), delay }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone().ok_or_else(|| anyhow::anyhow!("service overloaded"))
    }
}
