use heritage_core::types::QueryIntent;
use heritage_rag::IntentClassifier;

fn classify(q: &str) -> QueryIntent {
    IntentClassifier::new().classify(q)
}

#[test]
fn category_keywords_map_to_their_category() {
    assert_eq!(classify("昆曲的历史"), QueryIntent::ByCategory("传统戏剧".into()));
    assert_eq!(classify("有哪些民俗活动"), QueryIntent::ByCategory("民俗".into()));
    assert_eq!(classify("针灸是怎么传承的"), QueryIntent::ByCategory("传统医药".into()));
}

#[test]
fn category_wins_over_region() {
    assert_eq!(classify("北京的剪纸技艺"), QueryIntent::ByCategory("传统美术".into()));
}

#[test]
fn earlier_rows_win_shared_keywords() {
    // 曲艺 is also a keyword of 传统音乐, which comes first.
    assert_eq!(classify("曲艺表演"), QueryIntent::ByCategory("传统音乐".into()));
}

#[test]
fn provinces_are_matched_in_order() {
    assert_eq!(classify("云南有哪些非遗"), QueryIntent::ByRegion("云南".into()));
    assert_eq!(classify("内蒙古长调"), QueryIntent::ByRegion("内蒙古".into()));
}

#[test]
fn unmatched_queries_fall_back_to_name() {
    assert_eq!(classify("苗族古歌"), QueryIntent::ByName("苗族古歌".into()));
    assert_eq!(
        classify(" 苗族古歌 "),
        QueryIntent::ByName(" 苗族古歌 ".into()),
        "keyword is the raw query"
    );
}

#[test]
fn tables_can_be_replaced() {
    let classifier = IntentClassifier::with_tables(
        vec![("茶艺".to_string(), vec!["功夫茶".to_string()])],
        vec!["潮州".to_string()],
    );
    assert_eq!(classifier.classify("潮州功夫茶"), QueryIntent::ByCategory("茶艺".into()));
    assert_eq!(classifier.classify("潮州木雕"), QueryIntent::ByRegion("潮州".into()));
    assert_eq!(classifier.classify("剪纸"), QueryIntent::ByName("剪纸".into()));
}

#[test]
fn intent_serializes_with_type_and_keyword() {
    let json = serde_json::to_value(classify("云南")).unwrap();
    assert_eq!(json, serde_json::json!({"type": "region", "keyword": "云南"}));
}
