//! Batch generation of project introductions from the national list CSV.
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use heritage_core::data_processor::{DataProcessor, ProjectIntro};
use heritage_core::traits::Generator;

const SAVE_EVERY: usize = 10;

/// One row of the national list CSV. Only these columns are read.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedProject {
    #[serde(rename = "名称", default)]
    pub name: String,
    #[serde(rename = "类别", default)]
    pub category: String,
    #[serde(rename = "申报地区", default)]
    pub region: String,
    #[serde(rename = "保护单位", default)]
    pub organization: String,
}

impl ListedProject {
    pub fn prompt(&self) -> String {
        format!(
            "请为以下国家级非物质文化遗产项目撰写一段详细介绍（约300-500字）：\n\n\
             项目名称：{}\n类别：{}\n申报地区：{}\n保护单位：{}\n\n\
             请从以下几个方面进行介绍：\n\
             1. 历史渊源：项目的起源、发展历程\n\
             2. 技艺特点：主要表现形式、核心技艺\n\
             3. 文化价值：承载的文化内涵、历史意义\n\
             4. 传承现状：保护与传承情况\n\
             5. 代表性特征：与其他同类项目的区别\n\n\
             要求：\n- 语言准确、专业\n- 突出地域特色\n- 体现文化自信\n- 内容真实可信",
            self.name, self.category, self.region, self.organization
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Projects attempted in this run.
    pub attempted: usize,
    pub generated: usize,
    pub failed: usize,
    /// Records in the output file after the run.
    pub total: usize,
}

/// Generates introductions for listed projects that the output file lacks.
pub struct IntroBatch<'a> {
    generator: &'a dyn Generator,
    label: String,
    limit: Option<usize>,
    delay: Duration,
}

impl<'a> IntroBatch<'a> {
    /// `label` names the model and is recorded in each record's 生成方式.
    pub fn new(generator: &'a dyn Generator, label: impl Into<String>) -> Self {
        Self {
            generator,
            label: label.into(),
            limit: None,
            delay: Duration::from_millis(1000),
        }
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Read projects from `csv_path`, skipping blank and repeated names and
    /// names already present in `existing`.
    pub fn pending(csv_path: &Path, existing: &HashSet<String>) -> Result<Vec<ListedProject>> {
        let mut reader = csv::Reader::from_path(csv_path)
            .with_context(|| format!("open {}", csv_path.display()))?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in reader.deserialize::<ListedProject>() {
            let project = row.with_context(|| format!("parse {}", csv_path.display()))?;
            if project.name.is_empty()
                || existing.contains(&project.name)
                || !seen.insert(project.name.clone())
            {
                continue;
            }
            out.push(project);
        }
        Ok(out)
    }

    pub async fn run(&self, csv_path: &Path, output_path: &Path) -> Result<BatchSummary> {
        let mut results = load_existing(output_path)?;
        let existing: HashSet<String> = results.iter().map(|r| r.name.clone()).collect();
        let mut projects = Self::pending(csv_path, &existing)?;
        if let Some(limit) = self.limit {
            projects.truncate(limit);
        }
        info!(pending = projects.len(), existing = results.len(), "generating introductions");

        let mut summary = BatchSummary { attempted: projects.len(), ..BatchSummary::default() };
        for (i, project) in projects.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, projects.len(), project.name);
            match self.generator.generate(&project.prompt()).await {
                Ok(intro) if !intro.trim().is_empty() => {
                    info!(chars = intro.chars().count(), "generated");
                    results.push(ProjectIntro {
                        name: project.name.clone(),
                        category: project.category.clone(),
                        region: project.region.clone(),
                        organization: project.organization.clone(),
                        introduction: intro,
                        generated_by: Some(format!("AI生成 ({})", self.label)),
                    });
                    summary.generated += 1;
                    if results.len() % SAVE_EVERY == 0 {
                        save(output_path, &results)?;
                    }
                }
                Ok(_) => {
                    warn!(name = %project.name, "generator returned empty text");
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!(name = %project.name, error = %e, "generation failed");
                    summary.failed += 1;
                }
            }
            if i + 1 < projects.len() && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        save(output_path, &results)?;
        summary.total = results.len();
        info!(
            total = summary.total,
            generated = summary.generated,
            failed = summary.failed,
            "introductions saved"
        );
        Ok(summary)
    }
}

/// Previously generated introductions. An unreadable file is moved aside to
/// `<name>.bak` so the first save cannot overwrite it.
fn load_existing(path: &Path) -> Result<Vec<ProjectIntro>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    match DataProcessor::new().load_projects(path) {
        Ok(records) => Ok(records),
        Err(e) => {
            let mut backup = path.as_os_str().to_owned();
            backup.push(".bak");
            let backup = PathBuf::from(backup);
            fs::rename(path, &backup)
                .with_context(|| format!("move unreadable {} aside", path.display()))?;
            warn!(
                path = %path.display(),
                backup = %backup.display(),
                error = %e,
                "existing output unreadable; kept as backup, starting fresh"
            );
            Ok(Vec::new())
        }
    }
}

fn save(path: &Path, records: &[ProjectIntro]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(records)?)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
