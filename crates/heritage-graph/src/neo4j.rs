use std::time::Duration;

use async_trait::async_trait;
use neo4rs::{query, Graph, Query, Row};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{error, info, warn};

use heritage_core::config::GraphSettings;
use heritage_core::error::{Error, Result};
use heritage_core::traits::GraphStore;
use heritage_core::types::{
    CategoryCount, CategoryMember, GraphStatistics, ItemRecord, RegionMember,
};

use crate::cypher;
use crate::{CATEGORY_LIMIT, NAME_LIMIT, REGION_LIMIT};

/// Graph store backed by a Neo4j server over Bolt.
///
/// Construction never fails: an unreachable server leaves the store
/// disconnected and every query answers `Error::StoreUnavailable`.
pub struct Neo4jGraphStore {
    graph: Option<Graph>,
}

impl Neo4jGraphStore {
    pub async fn connect(settings: &GraphSettings) -> Self {
        let timeout = Duration::from_secs(settings.connect_timeout_secs.max(1));
        let attempt = async {
            let graph = Graph::new(
                settings.uri.as_str(),
                settings.user.as_str(),
                settings.password.as_str(),
            )
            .await?;
            graph.run(query(cypher::PROBE)).await?;
            Ok::<_, neo4rs::Error>(graph)
        };
        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(graph)) => {
                info!(uri = %settings.uri, "connected to Neo4j");
                Self { graph: Some(graph) }
            }
            Ok(Err(e)) => {
                error!(uri = %settings.uri, error = %e, "Neo4j connection failed");
                Self::disconnected()
            }
            Err(_) => {
                error!(uri = %settings.uri, secs = timeout.as_secs(), "Neo4j connection timed out");
                Self::disconnected()
            }
        }
    }

    pub fn disconnected() -> Self {
        Self { graph: None }
    }

    fn graph(&self) -> Result<&Graph> {
        self.graph.as_ref().ok_or(Error::StoreUnavailable)
    }

    async fn rows(&self, q: Query) -> Result<Vec<Row>> {
        let graph = self.graph()?;
        let mut stream = graph.execute(q).await.map_err(graph_err)?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(graph_err)? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Decode every row into `R` and keep those that map to a record.
    async fn records<R, T>(&self, q: Query, what: &str) -> Result<Vec<T>>
    where
        R: DeserializeOwned + IntoRecord<T>,
    {
        let rows = self.rows(q).await?;
        let total = rows.len();
        let mut records = Vec::with_capacity(total);
        for row in &rows {
            let raw: R = row.to().map_err(|e| Error::Graph(format!("{} row: {}", what, e)))?;
            records.extend(raw.into_record());
        }
        if records.len() < total {
            warn!(query = what, skipped = total - records.len(), "dropped rows without a name");
        }
        Ok(records)
    }

    async fn count(&self, cypher: &str) -> Result<i64> {
        let rows = self.rows(query(cypher)).await?;
        match rows.first() {
            Some(row) => row
                .get::<i64>("count")
                .map_err(|e| Error::Graph(format!("column 'count': {}", e))),
            None => Ok(0),
        }
    }
}

fn graph_err(e: neo4rs::Error) -> Error {
    Error::Graph(e.to_string())
}

/// Row shape as returned by the driver; any column may be null.
pub(crate) trait IntoRecord<T> {
    fn into_record(self) -> Option<T>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemRow {
    name: Option<String>,
    category: Option<String>,
    region: Option<String>,
    organization: Option<String>,
}

impl IntoRecord<ItemRecord> for ItemRow {
    fn into_record(self) -> Option<ItemRecord> {
        Some(ItemRecord {
            name: self.name?,
            category: self.category,
            region: self.region,
            organization: self.organization,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryMemberRow {
    name: Option<String>,
    region: Option<String>,
}

impl IntoRecord<CategoryMember> for CategoryMemberRow {
    fn into_record(self) -> Option<CategoryMember> {
        Some(CategoryMember { name: self.name?, region: self.region })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegionMemberRow {
    name: Option<String>,
    category: Option<String>,
    region: Option<String>,
}

impl IntoRecord<RegionMember> for RegionMemberRow {
    fn into_record(self) -> Option<RegionMember> {
        Some(RegionMember { name: self.name?, category: self.category, region: self.region? })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryCountRow {
    category: Option<String>,
    count: i64,
}

impl IntoRecord<CategoryCount> for CategoryCountRow {
    fn into_record(self) -> Option<CategoryCount> {
        Some(CategoryCount { category: self.category?, count: self.count })
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    fn is_available(&self) -> bool {
        self.graph.is_some()
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<ItemRecord>> {
        let q = query(cypher::BY_NAME)
            .param("name", name)
            .param("limit", NAME_LIMIT as i64);
        self.records::<ItemRow, _>(q, "by_name").await
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<CategoryMember>> {
        let q = query(cypher::BY_CATEGORY)
            .param("category", category)
            .param("limit", CATEGORY_LIMIT as i64);
        self.records::<CategoryMemberRow, _>(q, "by_category").await
    }

    async fn find_by_region(&self, region: &str) -> Result<Vec<RegionMember>> {
        let q = query(cypher::BY_REGION)
            .param("region", region)
            .param("limit", REGION_LIMIT as i64);
        self.records::<RegionMemberRow, _>(q, "by_region").await
    }

    async fn statistics(&self) -> Result<GraphStatistics> {
        Ok(GraphStatistics {
            item_count: self.count(cypher::COUNT_ITEMS).await?,
            category_count: self.count(cypher::COUNT_CATEGORIES).await?,
            region_count: self.count(cypher::COUNT_REGIONS).await?,
            organization_count: self.count(cypher::COUNT_ORGANIZATIONS).await?,
        })
    }

    async fn category_distribution(&self) -> Result<Vec<CategoryCount>> {
        let q = query(cypher::CATEGORY_DISTRIBUTION);
        self.records::<CategoryCountRow, _>(q, "category_distribution").await
    }
}
