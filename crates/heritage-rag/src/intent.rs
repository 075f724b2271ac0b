use heritage_core::types::QueryIntent;

/// Categories of the national list, in match order, with the words that
/// point to each.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("民间文学", &["传说", "故事", "歌谣", "史诗", "神话", "谚语", "童谣"]),
    ("传统音乐", &["音乐", "民歌", "号子", "曲艺", "器乐", "古琴", "唢呐"]),
    ("传统舞蹈", &["舞蹈", "龙舞", "狮舞", "秧歌", "傩舞", "花鼓"]),
    ("传统戏剧", &["戏剧", "京剧", "昆曲", "越剧", "皮影戏", "木偶"]),
    ("曲艺", &["曲艺", "相声", "评书", "大鼓", "快板"]),
    ("传统美术", &["美术", "剪纸", "年画", "刺绣", "雕刻", "泥塑"]),
    ("传统技艺", &["技艺", "织造", "酿造", "制茶", "制瓷", "铸造"]),
    ("传统医药", &["医药", "中医", "针灸", "推拿", "药物"]),
    ("民俗", &["民俗", "节日", "习俗", "祭祀", "婚俗"]),
];

/// Provincial-level divisions, in match order.
pub const PROVINCES: &[&str] = &[
    "北京", "天津", "河北", "山西", "内蒙古", "辽宁", "吉林", "黑龙江",
    "上海", "江苏", "浙江", "安徽", "福建", "江西", "山东", "河南",
    "湖北", "湖南", "广东", "广西", "海南", "重庆", "四川", "贵州",
    "云南", "西藏", "陕西", "甘肃", "青海", "宁夏", "新疆",
];

/// Keyword classifier deciding how a query hits the graph.
///
/// Categories are tried before regions, so "北京的剪纸" is a category query.
/// Anything unmatched is a name query on the raw text.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    categories: Vec<(String, Vec<String>)>,
    regions: Vec<String>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        let categories = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, keywords)| {
                (category.to_string(), keywords.iter().map(|k| k.to_string()).collect())
            })
            .collect();
        let regions = PROVINCES.iter().map(|p| p.to_string()).collect();
        Self::with_tables(categories, regions)
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(categories: Vec<(String, Vec<String>)>, regions: Vec<String>) -> Self {
        Self { categories, regions }
    }

    pub fn classify(&self, query: &str) -> QueryIntent {
        for (category, keywords) in &self.categories {
            if query.contains(category.as_str())
                || keywords.iter().any(|k| query.contains(k.as_str()))
            {
                return QueryIntent::ByCategory(category.clone());
            }
        }
        if let Some(region) = self.regions.iter().find(|r| query.contains(r.as_str())) {
            return QueryIntent::ByRegion(region.clone());
        }
        QueryIntent::ByName(query.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_keep_their_sizes() {
        assert_eq!(CATEGORY_KEYWORDS.len(), 9);
        assert_eq!(PROVINCES.len(), 31);
    }

    #[test]
    fn empty_query_is_a_name_query() {
        assert_eq!(IntentClassifier::new().classify(""), QueryIntent::ByName(String::new()));
    }
}
