use std::fs;

use heritage_core::config::{GraphBackend, GraphSettings};
use heritage_core::error::Error;
use heritage_core::traits::GraphStore;
use heritage_core::types::HeritageItem;
use heritage_graph::{open_store, InMemoryGraphStore, Neo4jGraphStore, CATEGORY_LIMIT, NAME_LIMIT};

fn item(name: &str, category: &str, region: &str, organization: &str) -> HeritageItem {
    HeritageItem {
        name: name.into(),
        category: category.into(),
        region: region.into(),
        organization: organization.into(),
    }
}

fn sample_store() -> InMemoryGraphStore {
    InMemoryGraphStore::from_items(vec![
        item("苗族古歌", "民间文学", "贵州省台江县", "台江县文化馆"),
        item("昆曲", "传统戏剧", "江苏省苏州市", "苏州昆剧院"),
        item("蔚县剪纸", "传统美术", "河北省蔚县", ""),
        item("扬州剪纸", "传统美术", "江苏省扬州市", "扬州市非遗中心"),
        item("傣族剪纸", "传统美术", "云南省潞西市", "潞西市文化馆"),
        item("傣族孔雀舞", "传统舞蹈", "云南省瑞丽市", "瑞丽市文化馆"),
    ])
}

#[tokio::test]
async fn name_lookup_is_substring_and_projects_all_fields() {
    let store = sample_store();
    let hits = store.find_by_name("剪纸").await.unwrap();
    let names: Vec<_> = hits.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["蔚县剪纸", "扬州剪纸", "傣族剪纸"], "store order is preserved");
    assert_eq!(hits[0].category.as_deref(), Some("传统美术"));
    assert_eq!(hits[0].organization, None, "blank organization projects as null");
}

#[tokio::test]
async fn category_lookup_is_exact() {
    let store = sample_store();
    assert_eq!(store.find_by_category("传统美术").await.unwrap().len(), 3);
    assert!(store.find_by_category("美术").await.unwrap().is_empty());
}

#[tokio::test]
async fn region_lookup_is_substring_on_region() {
    let store = sample_store();
    let hits = store.find_by_region("云南").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.region.starts_with("云南省")));
    assert_eq!(hits[1].category.as_deref(), Some("传统舞蹈"));
}

#[tokio::test]
async fn lookups_are_capped() {
    let items = (0..30).map(|i| item(&format!("年画{i}"), "传统美术", "天津市", "")).collect();
    let store = InMemoryGraphStore::from_items(items);
    assert_eq!(store.find_by_name("年画").await.unwrap().len(), NAME_LIMIT);
    assert_eq!(store.find_by_category("传统美术").await.unwrap().len(), CATEGORY_LIMIT);
    assert_eq!(store.find_by_region("天津").await.unwrap().len(), 20);
}

#[tokio::test]
async fn statistics_and_distribution() {
    let store = sample_store();
    let stats = store.statistics().await.unwrap();
    assert_eq!(stats.item_count, 6);
    assert_eq!(stats.category_count, 4);
    assert_eq!(stats.region_count, 6);
    assert_eq!(stats.organization_count, 5);

    let dist = store.category_distribution().await.unwrap();
    assert_eq!(dist[0].category, "传统美术");
    assert_eq!(dist[0].count, 3);
    assert!(dist.windows(2).all(|w| w[0].count >= w[1].count), "sorted descending by count");
    assert_eq!(dist.len(), 4);
}

#[tokio::test]
async fn disconnected_neo4j_reports_unavailable() {
    let store = Neo4jGraphStore::disconnected();
    assert!(!store.is_available());
    assert!(matches!(store.find_by_name("昆曲").await, Err(Error::StoreUnavailable)));
    assert!(matches!(store.find_by_category("曲艺").await, Err(Error::StoreUnavailable)));
    assert!(matches!(store.find_by_region("北京").await, Err(Error::StoreUnavailable)));
    assert!(matches!(store.statistics().await, Err(Error::StoreUnavailable)));
    assert!(matches!(store.category_distribution().await, Err(Error::StoreUnavailable)));
}

#[tokio::test]
async fn unreachable_server_degrades_to_disconnected() {
    let settings = GraphSettings {
        uri: "bolt://127.0.0.1:1".into(),
        connect_timeout_secs: 1,
        ..GraphSettings::default()
    };
    let store = Neo4jGraphStore::connect(&settings).await;
    assert!(!store.is_available());
    assert!(store.statistics().await.unwrap_err().is_unavailable());
}

#[tokio::test]
async fn memory_backend_opens_from_corpus() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ich.json");
    let corpus = serde_json::json!([
        {"项目名称": "昆曲", "类别": "传统戏剧", "申报地区": "江苏省苏州市", "保护单位": "苏州昆剧院", "详细介绍": "…"}
    ]);
    fs::write(&path, corpus.to_string()).unwrap();
    let settings = GraphSettings {
        backend: GraphBackend::Memory,
        data_file: Some(path.to_string_lossy().to_string()),
        ..GraphSettings::default()
    };
    let store = open_store(&settings).await.unwrap();
    assert!(store.is_available());
    assert_eq!(store.find_by_name("昆").await.unwrap()[0].region.as_deref(), Some("江苏省苏州市"));
}
