use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use async_trait::async_trait;

use heritage_core::data_processor::DataProcessor;
use heritage_core::error::Result;
use heritage_core::traits::GraphStore;
use heritage_core::types::{
    CategoryCount, CategoryMember, GraphStatistics, HeritageItem, ItemRecord, RegionMember,
};

use crate::{CATEGORY_LIMIT, NAME_LIMIT, REGION_LIMIT};

/// Graph store over items held in memory, with the same projections and caps
/// as the Neo4j store. Always available.
pub struct InMemoryGraphStore {
    items: Vec<HeritageItem>,
}

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

impl InMemoryGraphStore {
    pub fn from_items(items: Vec<HeritageItem>) -> Self {
        Self { items }
    }

    /// Load items from an introductions corpus file.
    pub fn from_corpus(path: &Path) -> Result<Self> {
        let processor = DataProcessor::new();
        let projects = processor.load_projects(path)?;
        Ok(Self::from_items(processor.items_from_projects(&projects)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn distinct<'a>(&'a self, pick: impl Fn(&'a HeritageItem) -> &'a str) -> i64 {
        self.items
            .iter()
            .map(pick)
            .filter(|s| !s.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .len() as i64
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    fn is_available(&self) -> bool {
        true
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<ItemRecord>> {
        Ok(self
            .items
            .iter()
            .filter(|i| i.name.contains(name))
            .take(NAME_LIMIT)
            .map(|i| ItemRecord {
                name: i.name.clone(),
                category: non_empty(&i.category),
                region: non_empty(&i.region),
                organization: non_empty(&i.organization),
            })
            .collect())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<CategoryMember>> {
        Ok(self
            .items
            .iter()
            .filter(|i| i.category == category)
            .take(CATEGORY_LIMIT)
            .map(|i| CategoryMember { name: i.name.clone(), region: non_empty(&i.region) })
            .collect())
    }

    async fn find_by_region(&self, region: &str) -> Result<Vec<RegionMember>> {
        Ok(self
            .items
            .iter()
            .filter(|i| !i.region.trim().is_empty() && i.region.contains(region))
            .take(REGION_LIMIT)
            .map(|i| RegionMember {
                name: i.name.clone(),
                category: non_empty(&i.category),
                region: i.region.clone(),
            })
            .collect())
    }

    async fn statistics(&self) -> Result<GraphStatistics> {
        Ok(GraphStatistics {
            item_count: self.items.len() as i64,
            category_count: self.distinct(|i| i.category.as_str()),
            region_count: self.distinct(|i| i.region.as_str()),
            organization_count: self.distinct(|i| i.organization.as_str()),
        })
    }

    async fn category_distribution(&self) -> Result<Vec<CategoryCount>> {
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for item in self.items.iter().filter(|i| !i.category.trim().is_empty()) {
            *counts.entry(item.category.as_str()).or_default() += 1;
        }
        let mut out: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category: category.to_string(), count })
            .collect();
        // BTreeMap order makes ties fall back to category name.
        out.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(out)
    }
}
