//! Cypher used against the heritage graph.
//!
//! Schema: `(:Item)-[:属于]->(:Category)`, `(:Item)-[:申报于]->(:Region)`,
//! `(:Item)-[:由保护单位]->(:Organization)`; every node carries `name`.

pub const PROBE: &str = "RETURN 1";

pub const BY_NAME: &str = "
MATCH (item:Item)
WHERE item.name CONTAINS $name OR item.名称 CONTAINS $name
OPTIONAL MATCH (item)-[:属于]->(category:Category)
OPTIONAL MATCH (item)-[:申报于]->(region:Region)
OPTIONAL MATCH (item)-[:由保护单位]->(org:Organization)
RETURN coalesce(item.name, item.名称) AS name, category.name AS category,
       region.name AS region, org.name AS organization
LIMIT $limit";

pub const BY_CATEGORY: &str = "
MATCH (c:Category {name: $category})<-[:属于]-(item:Item)
OPTIONAL MATCH (item)-[:申报于]->(region:Region)
RETURN coalesce(item.name, item.名称) AS name, region.name AS region
LIMIT $limit";

pub const BY_REGION: &str = "
MATCH (r:Region)
WHERE r.name CONTAINS $region
MATCH (r)<-[:申报于]-(item:Item)
OPTIONAL MATCH (item)-[:属于]->(category:Category)
RETURN coalesce(item.name, item.名称) AS name, category.name AS category, r.name AS region
LIMIT $limit";

pub const COUNT_ITEMS: &str = "MATCH (i:Item) RETURN count(i) AS count";
pub const COUNT_CATEGORIES: &str = "MATCH (c:Category) RETURN count(c) AS count";
pub const COUNT_REGIONS: &str = "MATCH (r:Region) RETURN count(r) AS count";
pub const COUNT_ORGANIZATIONS: &str = "MATCH (o:Organization) RETURN count(o) AS count";

pub const CATEGORY_DISTRIBUTION: &str = "
MATCH (c:Category)<-[:属于]-(item:Item)
RETURN c.name AS category, count(item) AS count
ORDER BY count DESC";
