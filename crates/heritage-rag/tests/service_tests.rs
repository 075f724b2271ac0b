mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use common::RecordingGenerator;
use heritage_core::config::{GraphBackend, Settings};
use heritage_core::error::Error;
use heritage_core::traits::Generator;
use heritage_core::types::QueryIntent;
use heritage_graph::Neo4jGraphStore;
use heritage_rag::service::{GraphStatus, IndexStatus};
use heritage_rag::{HeritageService, SearchKind};

const TIMEOUT: Duration = Duration::from_secs(5);

fn online_service(generator: Option<Arc<dyn Generator>>) -> HeritageService {
    HeritageService::new(common::graph(), common::ready_index(), generator, TIMEOUT)
}

fn offline_service(generator: Option<Arc<dyn Generator>>) -> HeritageService {
    let store = Arc::new(Neo4jGraphStore::disconnected());
    HeritageService::new(store, common::empty_index(), generator, TIMEOUT)
}

#[tokio::test]
async fn health_reports_each_capability() {
    let service = HeritageService::new(common::graph(), common::ready_index(), None, TIMEOUT);
    let health = service.health();
    assert_eq!(health.knowledge_graph, GraphStatus::Connected);
    assert_eq!(health.similarity_index, IndexStatus::Ready);
    assert_eq!(health.indexed_documents, 7);
    assert!(!health.generator);

    let offline = offline_service(None).health();
    assert_eq!(offline.knowledge_graph, GraphStatus::Disconnected);
    assert_eq!(offline.similarity_index, IndexStatus::NotReady);
    assert_eq!(serde_json::to_value(&offline).unwrap()["knowledge_graph"], "disconnected");
}

#[tokio::test]
async fn chat_without_ai_uses_template() {
    let generator = Arc::new(RecordingGenerator::replying("不该出现"));
    let service = online_service(Some(generator.clone()));
    let reply = service.chat("云南有哪些非遗", false).await.unwrap();

    assert!(reply.answer.starts_with("找到 2 个相关非遗项目："));
    assert_eq!(reply.sources, ["傣族剪纸", "傣族孔雀舞"]);
    assert_eq!(reply.intent, Some(QueryIntent::ByRegion("云南".into())));
    assert!(generator.last_prompt().is_none());
}

#[tokio::test]
async fn chat_with_ai_goes_through_generator() {
    let generator = Arc::new(RecordingGenerator::replying("昆曲发源于江苏昆山。"));
    let service = online_service(Some(generator.clone()));
    let reply = service.chat("昆曲起源于哪里", true).await.unwrap();

    assert_eq!(reply.answer, "昆曲发源于江苏昆山。");
    assert_eq!(reply.sources, ["昆曲", "北昆"]);
    assert!(generator.last_prompt().unwrap().contains("【知识图谱信息】"));
}

#[tokio::test]
async fn offline_graph_falls_back_to_direct_generation() {
    let generator = Arc::new(RecordingGenerator::replying("苗族古歌是苗族的史诗。"));
    let service = offline_service(Some(generator.clone()));
    let reply = service.chat("苗族古歌讲了什么", true).await.unwrap();

    assert_eq!(reply.answer, "苗族古歌是苗族的史诗。");
    assert!(reply.sources.is_empty());
    assert_eq!(reply.intent, None);
    assert_eq!(generator.last_prompt().unwrap(), "作为非遗专家，请回答：苗族古歌讲了什么");
}

#[tokio::test]
async fn offline_graph_without_ai_is_unavailable() {
    let service = offline_service(Some(Arc::new(RecordingGenerator::replying("x"))));
    assert!(matches!(service.chat("昆曲", false).await, Err(Error::StoreUnavailable)));
    assert!(matches!(offline_service(None).chat("昆曲", true).await, Err(Error::StoreUnavailable)));
}

#[tokio::test]
async fn offline_lookups_are_unavailable() {
    let service = offline_service(None);
    assert!(service.statistics().await.unwrap_err().is_unavailable());
    assert!(service.categories().await.unwrap_err().is_unavailable());
    assert!(service.search("昆曲", SearchKind::Name).await.unwrap_err().is_unavailable());
    assert!(service.project("昆曲").await.unwrap_err().is_unavailable());
}

#[tokio::test]
async fn search_by_each_kind() {
    let service = HeritageService::new(common::graph(), common::empty_index(), None, TIMEOUT);

    let by_name = service.search("剪纸", SearchKind::Name).await.unwrap();
    assert_eq!(by_name.count, 3);

    let by_category = service.search("传统戏剧", SearchKind::Category).await.unwrap();
    assert_eq!(by_category.count, 2);
    assert!(by_category.results.iter().all(|r| r.category.as_deref() == Some("传统戏剧")));

    let by_region = service.search("江苏", SearchKind::Region).await.unwrap();
    let names: Vec<_> = by_region.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["昆曲", "扬州剪纸"]);

    assert!(service.search("  ", SearchKind::Name).await.is_err());
}

#[tokio::test]
async fn project_detail_splits_first_and_related() {
    let service = HeritageService::new(common::graph(), common::empty_index(), None, TIMEOUT);
    let detail = service.project("剪纸").await.unwrap();
    assert!(detail.found);
    assert_eq!(detail.project.unwrap().name, "蔚县剪纸");
    assert_eq!(detail.related.len(), 2);

    let missing = service.project("不存在").await.unwrap();
    assert!(!missing.found);
    assert!(missing.project.is_none());
    assert!(missing.related.is_empty());
}

#[tokio::test]
async fn statistics_and_categories() {
    let service = HeritageService::new(common::graph(), common::empty_index(), None, TIMEOUT);
    let stats = service.statistics().await.unwrap();
    assert_eq!(stats.item_count, 7);
    assert_eq!(stats.category_count, 4);
    let categories = service.categories().await.unwrap();
    assert_eq!(categories[0].category, "传统美术");
    assert_eq!(categories[0].count, 3);
}

#[tokio::test]
async fn builds_from_settings_offline() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus = tmp.path().join("intros.json");
    fs::write(&corpus, serde_json::json!([
        {"项目名称": "昆曲", "类别": "传统戏剧", "申报地区": "江苏省苏州市", "保护单位": "苏州昆剧院", "详细介绍": "昆曲是中国最古老的剧种之一。"}
    ]).to_string()).unwrap();

    let mut settings = Settings::default();
    settings.graph.backend = GraphBackend::Memory;
    settings.graph.data_file = Some(corpus.to_string_lossy().to_string());
    settings.embed.use_fake = true;
    settings.index.dir = tmp.path().join("no_index").to_string_lossy().to_string();

    let service = HeritageService::from_settings(&settings).await.unwrap();
    let health = service.health();
    assert_eq!(health.knowledge_graph, GraphStatus::Connected);
    assert_eq!(health.similarity_index, IndexStatus::NotReady);
    assert!(!health.generator);

    let reply = service.chat("昆曲", true).await.unwrap();
    assert!(reply.answer.contains("**昆曲** (传统戏剧)"));
}
