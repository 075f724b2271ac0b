use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::types::{Document, DocumentMetadata, HeritageItem};

/// One entry of the generated introductions corpus.
///
/// Field names mirror the JSON the corpus is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIntro {
    #[serde(rename = "项目名称")]
    pub name: String,
    #[serde(rename = "类别", default)]
    pub category: String,
    #[serde(rename = "申报地区", default)]
    pub region: String,
    #[serde(rename = "保护单位", default)]
    pub organization: String,
    #[serde(rename = "详细介绍", default)]
    pub introduction: String,
    #[serde(rename = "生成方式", default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
}

impl ProjectIntro {
    pub fn to_document(&self) -> Document {
        Document {
            title: format!("{} - {}", self.name, self.category),
            content: format!(
                "类别：{}\n申报地区：{}\n保护单位：{}\n\n{}",
                self.category, self.region, self.organization, self.introduction
            ),
            metadata: DocumentMetadata {
                name: self.name.clone(),
                category: self.category.clone(),
                region: self.region.clone(),
            },
        }
    }

    pub fn to_item(&self) -> HeritageItem {
        HeritageItem {
            name: self.name.clone(),
            category: self.category.clone(),
            region: self.region.clone(),
            organization: self.organization.clone(),
        }
    }
}

/// Turns the introductions corpus into indexable documents and graph items.
#[derive(Default)]
pub struct DataProcessor;

impl DataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn load_projects(&self, path: &Path) -> Result<Vec<ProjectIntro>> {
        let raw = self.read_file_content(path)?;
        let projects: Vec<ProjectIntro> = serde_json::from_str(&raw)?;
        info!(count = projects.len(), path = %path.display(), "loaded heritage projects");
        Ok(projects)
    }

    /// One document per project, in corpus order.
    pub fn documents_from_projects(&self, projects: &[ProjectIntro]) -> Vec<Document> {
        projects.iter().map(ProjectIntro::to_document).collect()
    }

    /// Graph items, skipping rows without a name.
    pub fn items_from_projects(&self, projects: &[ProjectIntro]) -> Vec<HeritageItem> {
        projects
            .iter()
            .filter(|p| !p.name.trim().is_empty())
            .map(ProjectIntro::to_item)
            .collect()
    }

    pub fn process_file(&self, path: &Path) -> Result<Vec<Document>> {
        let projects = self.load_projects(path)?;
        Ok(self.documents_from_projects(&projects))
    }

    fn read_file_content(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        // The corpus is sometimes written with a UTF-8 BOM.
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}
